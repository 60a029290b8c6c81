// src/config/validate.rs

use std::net::SocketAddr;
use std::str::FromStr;

use chrono_tz::Tz;
use thiserror::Error;

use jobgate_http::Endpoint;

use crate::config::model::JobgateConfig;

/// A value in the config file that cannot work at runtime.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("[server].listen '{0}' is not a socket address such as 0.0.0.0:8080")]
    Listen(String),

    #[error("[{section}].{field}: {reason}")]
    Url {
        section: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("[retry].max_attempts must be >= 1 (got 0)")]
    NoAttempts,

    #[error("[retry].multiplier must be a finite number >= 1.0 (got {0})")]
    Multiplier(f64),

    #[error("[scheduler].frequency_in_minutes must be >= 1 (got 0)")]
    NoFrequency,

    #[error("[scheduler] needs start_hour <= end_hour <= 23 (got {start}..{end})")]
    HourWindow { start: u32, end: u32 },

    #[error("[scheduler].timezone '{0}' is not an IANA zone name such as Europe/Paris")]
    Timezone(String),

    #[error("[scheduler].days_to_add must be within -366..=366 (got {0})")]
    DaysToAdd(i64),
}

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - `[server].listen` parses as a socket address
/// - every upstream and bus URL parses
/// - `max_attempts >= 1` and `multiplier` finite and `>= 1.0`
/// - `frequency_in_minutes >= 1`, `start_hour <= end_hour <= 23`
/// - `timezone` is a known IANA zone and `days_to_add` stays within a year
///
/// Disabled sections (`[scheduler]` with `enabled = false`) are checked too.
pub fn validate_config(cfg: &JobgateConfig) -> Result<(), ConfigError> {
    SocketAddr::from_str(&cfg.server.listen)
        .map_err(|_| ConfigError::Listen(cfg.server.listen.clone()))?;

    check_url("upstream", "task_timestamp_url", &cfg.upstream.task_timestamp_url)?;
    check_url("upstream", "task_business_date_url", &cfg.upstream.task_business_date_url)?;
    check_url("upstream", "interrupt_run_url", &cfg.upstream.interrupt_run_url)?;
    check_url("bus", "publish_url", &cfg.bus.publish_url)?;

    validate_retry(cfg)?;
    validate_scheduler(cfg)?;
    Ok(())
}

fn check_url(section: &'static str, field: &'static str, url: &str) -> Result<(), ConfigError> {
    Endpoint::parse(field, url)
        .map(|_| ())
        .map_err(|e| ConfigError::Url {
            section,
            field,
            reason: e.to_string(),
        })
}

fn validate_retry(cfg: &JobgateConfig) -> Result<(), ConfigError> {
    if cfg.retry.max_attempts == 0 {
        return Err(ConfigError::NoAttempts);
    }
    let multiplier = cfg.retry.multiplier;
    if !multiplier.is_finite() || multiplier < 1.0 {
        return Err(ConfigError::Multiplier(multiplier));
    }
    Ok(())
}

fn validate_scheduler(cfg: &JobgateConfig) -> Result<(), ConfigError> {
    let s = &cfg.scheduler;
    if s.frequency_in_minutes == 0 {
        return Err(ConfigError::NoFrequency);
    }
    if s.start_hour > s.end_hour || s.end_hour > 23 {
        return Err(ConfigError::HourWindow {
            start: s.start_hour,
            end: s.end_hour,
        });
    }
    parse_timezone(&s.timezone)?;
    if s.days_to_add.abs() > 366 {
        return Err(ConfigError::DaysToAdd(s.days_to_add));
    }
    Ok(())
}

/// An IANA zone name such as `Europe/Paris` or `UTC`.
pub(crate) fn parse_timezone(raw: &str) -> Result<Tz, ConfigError> {
    Tz::from_str(raw.trim()).map_err(|_| ConfigError::Timezone(raw.to_string()))
}
