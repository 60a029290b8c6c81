// src/config/model.rs

use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use jobgate_core::app::{AutoTriggerFilter, ScheduleSettings};
use jobgate_core::client::RetryPolicy;

use super::validate::{ConfigError, parse_timezone};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [server]
/// listen = "0.0.0.0:8080"
///
/// [upstream]
/// task_timestamp_url = "http://task-manager/tasks/"
/// task_business_date_url = "http://task-manager/tasks/businessdate/"
/// interrupt_run_url = "http://interruption-server/interrupt/"
///
/// [bus]
/// publish_url = "http://bus-bridge/publish/"
///
/// [auto]
/// enabled = true
/// trigger_file_types = ["RAOREQUEST", "CRAC"]
///
/// [scheduler]
/// enabled = true
/// frequency_in_minutes = 10
/// start_hour = 6
/// end_hour = 20
/// timezone = "Europe/Paris"
/// days_to_add = 1
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobgateConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub retry: RetrySection,

    #[serde(default)]
    pub bus: BusSection,

    #[serde(default)]
    pub auto: AutoSection,

    #[serde(default)]
    pub scheduler: SchedulerSection,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    /// Socket address the HTTP API binds to.
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// `[upstream]` section: where the task-manager and interruption-server live.
///
/// Each URL is a prefix; the resource (timestamp, date, task id) is appended
/// to it as is, so keep the trailing slash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamSection {
    #[serde(default = "default_task_timestamp_url")]
    pub task_timestamp_url: String,

    #[serde(default = "default_task_business_date_url")]
    pub task_business_date_url: String,

    #[serde(default = "default_interrupt_run_url")]
    pub interrupt_run_url: String,

    /// Timeout of one HTTP attempt, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_task_timestamp_url() -> String {
    "http://localhost:8081/tasks/".to_string()
}

fn default_task_business_date_url() -> String {
    "http://localhost:8081/tasks/businessdate/".to_string()
}

fn default_interrupt_run_url() -> String {
    "http://localhost:8082/interrupt/".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            task_timestamp_url: default_task_timestamp_url(),
            task_business_date_url: default_task_business_date_url(),
            interrupt_run_url: default_interrupt_run_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// `[retry]` section, applied to every upstream call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySection {
    /// Attempts per call, first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait before the second attempt, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Growth factor of the wait between attempts.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

/// `[bus]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusSection {
    /// Prefix of the publish endpoint; the binding name is appended.
    #[serde(default = "default_publish_url")]
    pub publish_url: String,
}

fn default_publish_url() -> String {
    "http://localhost:8083/publish/".to_string()
}

impl Default for BusSection {
    fn default() -> Self {
        Self {
            publish_url: default_publish_url(),
        }
    }
}

/// `[auto]` section: launch on task-update events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoSection {
    #[serde(default)]
    pub enabled: bool,

    /// Input file types whose arrival triggers a launch. Empty: every READY update.
    #[serde(default)]
    pub trigger_file_types: Vec<String>,
}

/// `[scheduler]` section: periodic launch of a business date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_frequency_in_minutes")]
    pub frequency_in_minutes: u32,

    #[serde(default)]
    pub start_hour: u32,

    #[serde(default = "default_end_hour")]
    pub end_hour: u32,

    /// IANA zone name used for the business date and the firing window.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub days_to_add: i64,
}

fn default_frequency_in_minutes() -> u32 {
    5
}

fn default_end_hour() -> u32 {
    23
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency_in_minutes: default_frequency_in_minutes(),
            start_hour: 0,
            end_hour: default_end_hour(),
            timezone: default_timezone(),
            days_to_add: 0,
        }
    }
}

impl JobgateConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.delay_ms),
            self.retry.multiplier,
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.request_timeout_secs)
    }

    pub fn auto_filter(&self) -> AutoTriggerFilter {
        AutoTriggerFilter::new(self.auto.trigger_file_types.iter().cloned())
    }

    pub fn schedule_settings(&self) -> Result<ScheduleSettings, ConfigError> {
        let s = &self.scheduler;
        let timezone: Tz = parse_timezone(&s.timezone)?;
        Ok(ScheduleSettings {
            frequency_in_minutes: s.frequency_in_minutes,
            start_hour: s.start_hour,
            end_hour: s.end_hour,
            timezone,
            days_to_add: s.days_to_add,
        })
    }
}
