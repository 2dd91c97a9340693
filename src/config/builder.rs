//! Configuration builder
//!
//! Merges configuration from files and CLI arguments. Later layers win:
//! defaults, then the config file, then environment variables and flags.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must exist; without one the default locations are
    /// searched and may all be absent.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default()?,
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override the server name
    pub fn with_server_name(mut self, name: Option<String>) -> Self {
        if let Some(n) = name {
            self.config.server_name = Some(n);
        }
        self
    }

    /// Override the webhook URL
    pub fn with_webhook_url(mut self, url: Option<String>) -> Self {
        if let Some(u) = url {
            self.config.webhook_url = Some(u);
        }
        self
    }

    /// Override the sampling interval
    pub fn with_interval(mut self, interval: Option<i64>) -> Self {
        if let Some(i) = interval {
            self.config.interval = i;
        }
        self
    }

    /// Override the utilization threshold
    pub fn with_utilization_threshold(mut self, threshold: Option<i64>) -> Self {
        if let Some(t) = threshold {
            self.config.utilization_threshold = t;
        }
        self
    }

    /// Override the sustained time threshold
    pub fn with_time_threshold(mut self, threshold: Option<i64>) -> Self {
        if let Some(t) = threshold {
            self.config.time_threshold = t;
        }
        self
    }

    /// Override the `nvidia-smi` path
    pub fn with_smi_path(mut self, path: Option<String>) -> Self {
        if let Some(p) = path {
            self.config.smi_path = p;
        }
        self
    }

    /// Override the telemetry command timeout
    pub fn with_command_timeout(mut self, secs: Option<i64>) -> Self {
        if let Some(s) = secs {
            self.config.command_timeout = s;
        }
        self
    }

    /// Override the webhook request timeout
    pub fn with_request_timeout(mut self, secs: Option<i64>) -> Self {
        if let Some(s) = secs {
            self.config.request_timeout = s;
        }
        self
    }

    /// Override the delivery attempt limit
    pub fn with_max_attempts(mut self, attempts: Option<i64>) -> Self {
        if let Some(a) = attempts {
            self.config.max_attempts = a;
        }
        self
    }

    /// Override the timestamp UTC offset
    pub fn with_utc_offset(mut self, hours: Option<i32>) -> Self {
        if let Some(h) = hours {
            self.config.utc_offset_hours = h;
        }
        self
    }

    /// Suppress the startup notification when `true`
    pub fn with_no_start_notice(mut self, disable: bool) -> Self {
        if disable {
            self.config.notify_on_start = false;
        }
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
