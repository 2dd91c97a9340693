//! gpuwatch - GPU utilization watchdog library
//!
//! This library samples GPU utilization through `nvidia-smi`, runs it through
//! a hysteresis alert policy and delivers notifications to a Slack-style
//! webhook.
//!
//! # Modules
//!
//! - [`alerts`]: Alert state machine, events and webhook delivery
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Telemetry readings and aggregation
//! - [`error`]: Error types
//! - [`services`]: Monitoring loop
//! - [`telemetry`]: Telemetry source abstraction

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
