// src/config/mod.rs

//! Configuration loading and validation for jobgate.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate values and URLs up front (`validate.rs`), so that a bad config
//!   fails at startup instead of at the first request.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    AutoSection, BusSection, JobgateConfig, RetrySection, SchedulerSection, ServerSection,
    UpstreamSection,
};
pub use validate::{ConfigError, validate_config};
