//! Domain models for gpuwatch
//!
//! Telemetry readings and the aggregate utilization figure the alerting
//! policy is evaluated against.

pub mod reading;
pub mod utilization;

pub use reading::{DeviceReading, TelemetrySnapshot};
pub use utilization::{aggregate, AggregateUtilization};
