//! Aggregate utilization across all devices on the host

use super::reading::DeviceReading;
use std::fmt;

/// Mean GPU utilization across every device in a snapshot (0-100%)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct AggregateUtilization(f64);

impl AggregateUtilization {
    /// Create from a raw percentage
    pub fn new(percent: f64) -> Self {
        Self(percent.clamp(0.0, 100.0))
    }

    /// Get the value as a percentage
    #[inline]
    pub fn as_percent(&self) -> f64 {
        self.0
    }

    /// Whether this counts as low utilization (inclusive threshold)
    #[inline]
    pub fn is_low(&self, threshold_percent: f64) -> bool {
        self.0 <= threshold_percent
    }
}

impl fmt::Display for AggregateUtilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

/// Unweighted mean of per-device utilization
///
/// Returns `None` for an empty device list: there is no utilization figure
/// for a host that reports zero GPUs.
pub fn aggregate(readings: &[DeviceReading]) -> Option<AggregateUtilization> {
    if readings.is_empty() {
        return None;
    }

    let sum: u32 = readings
        .iter()
        .map(|r| u32::from(r.utilization_percent))
        .sum();
    Some(AggregateUtilization::new(
        f64::from(sum) / readings.len() as f64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(values: &[u8]) -> Vec<DeviceReading> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| DeviceReading::with_utilization(i as u32, v))
            .collect()
    }

    #[test]
    fn test_aggregate_empty_is_none() {
        assert!(aggregate(&[]).is_none());
    }

    #[test]
    fn test_aggregate_single_device() {
        let util = aggregate(&readings(&[65])).unwrap();
        assert_eq!(util.as_percent(), 65.0);
    }

    #[test]
    fn test_aggregate_unweighted_mean() {
        let util = aggregate(&readings(&[65, 52, 0, 100])).unwrap();
        assert_eq!(util.as_percent(), 54.25);
    }

    #[test]
    fn test_is_low_inclusive() {
        assert!(AggregateUtilization::new(40.0).is_low(40.0));
        assert!(AggregateUtilization::new(39.9).is_low(40.0));
        assert!(!AggregateUtilization::new(40.1).is_low(40.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(AggregateUtilization::new(100.0 / 3.0).to_string(), "33.3%");
        assert_eq!(AggregateUtilization::new(150.0).to_string(), "100.0%");
    }
}
