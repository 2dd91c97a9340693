//! Configuration system
//!
//! Handles TOML config file parsing, CLI/environment merging and the one-time
//! validation that turns raw values into immutable [`Settings`].

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::alerts::AlertPolicy;
use crate::error::ConfigError;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw configuration as read from defaults, file, environment and flags
///
/// Numeric fields are signed so that out-of-range input reaches validation
/// instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name that identifies this server in notifications
    pub server_name: Option<String>,
    /// Incoming webhook URL
    pub webhook_url: Option<String>,
    /// Seconds between sampling cycles
    pub interval: i64,
    /// Utilization percentage at or below which the GPU counts as idle
    pub utilization_threshold: i64,
    /// Seconds of sustained low utilization before the danger alert
    pub time_threshold: i64,
    /// Path or name of the `nvidia-smi` executable
    pub smi_path: String,
    /// Seconds to wait for `nvidia-smi`
    pub command_timeout: i64,
    /// Seconds to wait for a webhook response
    pub request_timeout: i64,
    /// Delivery attempts per notification
    pub max_attempts: i64,
    /// UTC offset in hours used when rendering timestamps
    pub utc_offset_hours: i32,
    /// Send an info notification when monitoring starts
    pub notify_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_name: None,
            webhook_url: None,
            interval: 60,
            utilization_threshold: 40,
            time_threshold: 3600,
            smi_path: crate::telemetry::smi::DEFAULT_PROGRAM.to_string(),
            command_timeout: 10,
            request_timeout: 10,
            max_attempts: i64::from(crate::alerts::DEFAULT_MAX_ATTEMPTS),
            utc_offset_hours: 0,
            notify_on_start: true,
        }
    }
}

impl Config {
    /// Validate and convert into immutable settings
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let server_name = required("server_name", &self.server_name)?;
        let webhook_url = required("webhook_url", &self.webhook_url)?;
        validate_url(&webhook_url)?;

        if self.interval <= 0 {
            return Err(ConfigError::invalid(
                "interval",
                format!("must be a positive number of seconds (got {})", self.interval),
            ));
        }
        if self.interval > self.time_threshold {
            return Err(ConfigError::invalid(
                "time_threshold",
                format!(
                    "must not be less than interval ({} < {})",
                    self.time_threshold, self.interval
                ),
            ));
        }
        if !(0..=100).contains(&self.utilization_threshold) {
            return Err(ConfigError::invalid(
                "utilization_threshold",
                format!("must be between 0 and 100 (got {})", self.utilization_threshold),
            ));
        }

        let command_timeout = positive_secs("command_timeout", self.command_timeout)?;
        let request_timeout = positive_secs("request_timeout", self.request_timeout)?;

        if self.max_attempts < 1 {
            return Err(ConfigError::invalid(
                "max_attempts",
                format!("must be at least 1 (got {})", self.max_attempts),
            ));
        }
        let max_attempts = u32::try_from(self.max_attempts)
            .map_err(|_| ConfigError::invalid("max_attempts", "value too large"))?;

        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(ConfigError::invalid(
                "utc_offset_hours",
                format!("must be between -12 and 14 (got {})", self.utc_offset_hours),
            ));
        }
        let utc_offset = FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .ok_or_else(|| ConfigError::invalid("utc_offset_hours", "out of range"))?;

        if self.smi_path.trim().is_empty() {
            return Err(ConfigError::invalid("smi_path", "must not be empty"));
        }

        Ok(Settings {
            server_name,
            webhook_url,
            interval: Duration::from_secs(self.interval as u64),
            utilization_threshold: self.utilization_threshold as f64,
            time_threshold: Duration::from_secs(self.time_threshold as u64),
            smi_path: self.smi_path.clone(),
            command_timeout,
            request_timeout,
            max_attempts,
            utc_offset,
            notify_on_start: self.notify_on_start,
        })
    }
}

/// Validated, immutable runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_name: String,
    pub webhook_url: String,
    pub interval: Duration,
    pub utilization_threshold: f64,
    pub time_threshold: Duration,
    pub smi_path: String,
    pub command_timeout: Duration,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub utc_offset: FixedOffset,
    pub notify_on_start: bool,
}

impl Settings {
    /// Alert thresholds derived from these settings
    pub fn policy(&self) -> AlertPolicy {
        AlertPolicy::new(
            self.server_name.clone(),
            self.utilization_threshold,
            self.time_threshold,
        )
    }
}

fn required(key: &str, value: &Option<String>) -> Result<String, ConfigError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingField(key.to_string())),
    }
}

fn positive_secs(key: &str, secs: i64) -> Result<Duration, ConfigError> {
    if secs <= 0 {
        return Err(ConfigError::invalid(
            key,
            format!("must be a positive number of seconds (got {})", secs),
        ));
    }
    Ok(Duration::from_secs(secs as u64))
}

fn validate_url(url: &str) -> Result<(), ConfigError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| ConfigError::invalid("webhook_url", e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::invalid(
            "webhook_url",
            format!("unsupported scheme '{}'", other),
        )),
    }
}
