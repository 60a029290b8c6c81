// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `jobgate`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jobgate",
    version,
    about = "Launch and stop computation tasks identified by a business timestamp.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `jobgate.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "jobgate.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `JOBGATE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate the config, print it, and exit without serving.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["jobgate"]).unwrap();
        assert_eq!(args.config, "jobgate.toml");
        assert_eq!(args.log_level, None);
        assert!(!args.dry_run);
    }

    #[test]
    fn flags() {
        let args = CliArgs::try_parse_from([
            "jobgate",
            "--config",
            "/etc/jobgate.toml",
            "--log-level",
            "debug",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.config, "/etc/jobgate.toml");
        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert!(args.dry_run);
    }
}
