// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::model::JobgateConfig;
use crate::config::validate::validate_config;

/// Load a configuration file from a given path and return the raw `JobgateConfig`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for the
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<JobgateConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: JobgateConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// This is the entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Runs [`validate_config`].
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<JobgateConfig> {
    let path = path.as_ref();
    let config = load_from_path(path)?;
    validate_config(&config).with_context(|| format!("validating config from {:?}", path))?;
    Ok(config)
}
