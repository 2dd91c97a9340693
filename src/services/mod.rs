//! Service layer
//!
//! The monitoring loop that ties telemetry, alert evaluation and
//! notification delivery together.

pub mod monitor;

pub use monitor::{CycleReport, Monitor};
