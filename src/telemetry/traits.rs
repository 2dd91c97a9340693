//! Trait definitions for telemetry sampling

use crate::domain::TelemetrySnapshot;

/// Source of per-device GPU readings
///
/// Implementations must never panic on tool failures: every problem is
/// reported through the `Err` side of the returned snapshot.
pub trait TelemetrySource: Send + Sync {
    /// Take one snapshot of every device on the host
    fn sample(&self) -> TelemetrySnapshot;

    /// Source name for log messages
    fn name(&self) -> &str;
}
