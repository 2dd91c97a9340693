//! Per-device telemetry readings
//!
//! One [`DeviceReading`] per GPU is produced by each sampling cycle.

use crate::error::TelemetryError;
use std::fmt;

/// Point-in-time metrics for a single GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceReading {
    /// GPU index (0-based) as reported by the driver
    pub device_index: u32,
    /// GPU compute utilization (0-100%)
    pub utilization_percent: u8,
    /// Memory bandwidth utilization (0-100%)
    pub memory_utilization_percent: u8,
    /// Total VRAM in MiB
    pub total_memory: u64,
    /// Used VRAM in MiB
    pub used_memory: u64,
    /// Core temperature in Celsius
    pub temperature_celsius: i32,
}

impl DeviceReading {
    /// Create a reading with only the utilization figure set
    pub fn with_utilization(device_index: u32, utilization_percent: u8) -> Self {
        Self {
            device_index,
            utilization_percent: utilization_percent.min(100),
            memory_utilization_percent: 0,
            total_memory: 0,
            used_memory: 0,
            temperature_celsius: 0,
        }
    }

    /// Used memory as a percentage of total (0 when total is unknown)
    pub fn memory_used_percent(&self) -> f64 {
        if self.total_memory == 0 {
            return 0.0;
        }
        (self.used_memory as f64 / self.total_memory as f64) * 100.0
    }
}

impl fmt::Display for DeviceReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GPU {}: {}% util, {}/{} MiB ({:.1}%), {}°C",
            self.device_index,
            self.utilization_percent,
            self.used_memory,
            self.total_memory,
            self.memory_used_percent(),
            self.temperature_celsius
        )
    }
}

/// Outcome of one sampling cycle: every device's reading, or why there are none
pub type TelemetrySnapshot = std::result::Result<Vec<DeviceReading>, TelemetryError>;
