// src/logging.rs

//! Logging setup for `jobgate` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `JOBGATE_LOG` environment variable, any `EnvFilter` directive
//!    (e.g. "info", "warn,jobgate::events=info")
//! 3. default to `info`
//!
//! Logs go to stderr. Business events use the `jobgate::events` target and can
//! be routed on their own with a directive.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "JOBGATE_LOG";

/// Initialise global logging subscriber.
///
/// Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let directive = filter_directive(cli_level, std::env::var(LOG_ENV).ok());
    let filter = EnvFilter::try_new(&directive)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow!("invalid log filter '{directive}': {e}"))?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| anyhow!("logging already initialised: {e}"))
}

fn filter_directive(cli_level: Option<LogLevel>, env: Option<String>) -> String {
    match cli_level {
        Some(lvl) => lvl.as_str().to_string(),
        None => env
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "info".to_string()),
    }
}

/// Make an externally supplied string safe to log on a single line.
pub fn sanitize(raw: &str) -> String {
    raw.replace(['\r', '\n'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_wins_over_env() {
        let d = filter_directive(Some(LogLevel::Warn), Some("trace".into()));
        assert_eq!(d, "warn");
    }

    #[test]
    fn env_is_used_when_no_flag() {
        let d = filter_directive(None, Some(" debug,jobgate::events=info ".into()));
        assert_eq!(d, "debug,jobgate::events=info");
    }

    #[test]
    fn defaults_to_info() {
        assert_eq!(filter_directive(None, None), "info");
        assert_eq!(filter_directive(None, Some("  ".into())), "info");
    }

    #[test]
    fn sanitize_replaces_line_breaks() {
        assert_eq!(sanitize("2024\r\nINFO forged"), "2024__INFO forged");
        assert_eq!(sanitize("plain"), "plain");
    }
}
