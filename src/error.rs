//! Unified error types for gpuwatch
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use std::time::Duration;
use thiserror::Error;

/// Exit status for an invalid configuration
pub const EXIT_INVALID_CONFIG: i32 = 1;

/// Exit status when the telemetry tool is missing at startup
pub const EXIT_TELEMETRY_UNAVAILABLE: i32 = 2;

/// Exit status for any other fatal startup failure
pub const EXIT_FAILURE: i32 = 3;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The telemetry tool could not be run at all during startup
    #[error("Telemetry source unavailable: {0}")]
    TelemetryUnavailable(TelemetryError),

    /// Error from notification delivery setup
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

impl AppError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => EXIT_INVALID_CONFIG,
            Self::TelemetryUnavailable(_) => EXIT_TELEMETRY_UNAVAILABLE,
            Self::Notify(_) => EXIT_FAILURE,
        }
    }
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required config field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Errors from sampling the GPU metrics tool
///
/// The `Display` output of each variant is the human-readable detail carried
/// by error notifications.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// The metrics command is not installed or not on PATH
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// The process could not be started
    #[error("failed to run {command}: {message}")]
    Spawn { command: String, message: String },

    /// The process did not finish within the allowed time
    #[error("{command} did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// The process exited unsuccessfully
    #[error("{command} exited with status {status}: {stderr}")]
    ExitStatus {
        command: String,
        status: String,
        stderr: String,
    },

    /// Output was not valid UTF-8
    #[error("output is not valid UTF-8")]
    Encoding,

    /// A device line did not have the expected shape
    #[error("malformed line {line:?}: {reason}")]
    MalformedLine { line: String, reason: String },

    /// A numeric field could not be parsed
    #[error("invalid {field} value {raw:?} in line {line:?}")]
    InvalidField {
        line: String,
        field: &'static str,
        raw: String,
    },
}

impl TelemetryError {
    /// Whether the tool cannot be run at all, as opposed to a run that failed
    ///
    /// A missing or non-executable command won't fix itself between cycles.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::CommandNotFound(_) | Self::Spawn { .. })
    }
}

/// Errors from a single webhook delivery attempt
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Connection, TLS, or timeout failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Endpoint answered with a status other than 200
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
