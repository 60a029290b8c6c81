//! Timestamp - タスクを一意に識別する業務時刻
//!
//! task-manager は `2024-09-13T09:30Z` のようなオフセット付き日時でタスクを
//! 識別します。同じ瞬間を別オフセットで書いた文字列（`10:30+01:00` など）は
//! 同じタスクを指すため、ロックのキーは UTC に正規化した値を使います。

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Business-time key of one task instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp(DateTime<FixedOffset>);

/// Error returned when a path segment is not an RFC 3339 date-time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp '{0}': expected an RFC 3339 date-time such as 2024-09-13T09:30Z")]
pub struct TimestampParseError(pub String);

impl Timestamp {
    pub fn new(value: DateTime<FixedOffset>) -> Self {
        Self(value)
    }

    pub fn as_datetime(&self) -> DateTime<FixedOffset> {
        self.0
    }

    /// Offset-independent key; equal instants share one launch lock.
    pub fn lock_key(&self) -> String {
        self.0
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        DateTime::parse_from_rfc3339(trimmed)
            // task-manager omits seconds ("2024-09-13T09:30Z"), which RFC 3339 requires
            .or_else(|_| DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M%#z"))
            .map(Self)
            .map_err(|_| TimestampParseError(s.to_string()))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
