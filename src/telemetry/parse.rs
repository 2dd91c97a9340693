//! `nvidia-smi` CSV output parsing
//!
//! Expects `--format=csv,noheader,nounits` output for the fields in
//! [`QUERY_FIELDS`], one line per device.

use crate::domain::DeviceReading;
use crate::error::TelemetryError;
use std::str::FromStr;

/// Fields requested from `nvidia-smi --query-gpu`, in column order
pub const QUERY_FIELDS: [&str; 6] = [
    "index",
    "utilization.gpu",
    "utilization.memory",
    "memory.total",
    "memory.used",
    "temperature.gpu",
];

/// Parse the full tool output into one reading per device
///
/// Blank lines (including the trailing newline) are ignored. Any malformed
/// line or unparseable field fails the whole snapshot; values such as
/// `[N/A]` are never coerced to zero.
pub fn parse_csv(output: &str) -> Result<Vec<DeviceReading>, TelemetryError> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

/// Parse a single device line
pub fn parse_line(line: &str) -> Result<DeviceReading, TelemetryError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != QUERY_FIELDS.len() {
        return Err(TelemetryError::MalformedLine {
            line: line.to_string(),
            reason: format!(
                "expected {} fields, found {}",
                QUERY_FIELDS.len(),
                fields.len()
            ),
        });
    }

    let reading = DeviceReading {
        device_index: field(line, &fields, 0)?,
        utilization_percent: percent(line, &fields, 1)?,
        memory_utilization_percent: percent(line, &fields, 2)?,
        total_memory: field(line, &fields, 3)?,
        used_memory: field(line, &fields, 4)?,
        temperature_celsius: field(line, &fields, 5)?,
    };

    Ok(reading)
}

fn field<T: FromStr>(line: &str, fields: &[&str], idx: usize) -> Result<T, TelemetryError> {
    fields[idx]
        .parse()
        .map_err(|_| invalid_field(line, fields, idx))
}

fn percent(line: &str, fields: &[&str], idx: usize) -> Result<u8, TelemetryError> {
    let value: u8 = field(line, fields, idx)?;
    if value > 100 {
        return Err(invalid_field(line, fields, idx));
    }
    Ok(value)
}

fn invalid_field(line: &str, fields: &[&str], idx: usize) -> TelemetryError {
    TelemetryError::InvalidField {
        line: line.to_string(),
        field: QUERY_FIELDS[idx],
        raw: fields[idx].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_GPUS: &str = "0, 65, 47, 40537, 19543, 48\n1, 52, 36, 40537, 17080, 46\n";

    #[test]
    fn test_parse_two_devices() {
        let readings = parse_csv(TWO_GPUS).unwrap();
        assert_eq!(readings.len(), 2);

        assert_eq!(readings[0].device_index, 0);
        assert_eq!(readings[0].utilization_percent, 65);
        assert_eq!(readings[0].memory_utilization_percent, 47);
        assert_eq!(readings[0].total_memory, 40537);
        assert_eq!(readings[0].used_memory, 19543);
        assert_eq!(readings[0].temperature_celsius, 48);

        assert_eq!(readings[1].device_index, 1);
        assert_eq!(readings[1].utilization_percent, 52);
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_csv("").unwrap().is_empty());
        assert!(parse_csv("\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_crlf_and_no_spaces() {
        let readings = parse_csv("0,10,5,8192,1024,35\r\n").unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].utilization_percent, 10);
        assert_eq!(readings[0].temperature_celsius, 35);
    }

    #[test]
    fn test_zero_utilization_is_valid() {
        let readings = parse_csv("0, 0, 0, 8192, 0, 30\n").unwrap();
        assert_eq!(readings[0].utilization_percent, 0);
    }

    #[test]
    fn test_not_available_field_is_error() {
        let err = parse_csv("0, [N/A], 47, 40537, 19543, 48\n").unwrap_err();
        match err {
            TelemetryError::InvalidField { field, raw, .. } => {
                assert_eq!(field, "utilization.gpu");
                assert_eq!(raw, "[N/A]");
            }
            other => panic!("Expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_one_bad_device_fails_snapshot() {
        let output = "0, 65, 47, 40537, 19543, 48\n1, 52, 36, 40537, 17080, [Not Supported]\n";
        let err = parse_csv(output).unwrap_err();
        assert!(matches!(
            err,
            TelemetryError::InvalidField {
                field: "temperature.gpu",
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_percent_is_error() {
        let err = parse_csv("0, 101, 47, 40537, 19543, 48\n").unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidField { .. }));
    }

    #[test]
    fn test_wrong_field_count() {
        let err = parse_csv("0, 65, 47\n").unwrap_err();
        assert!(matches!(err, TelemetryError::MalformedLine { .. }));
    }

    #[test]
    fn test_negative_temperature_parses() {
        let readings = parse_csv("0, 0, 0, 8192, 0, -5\n").unwrap();
        assert_eq!(readings[0].temperature_celsius, -5);
    }
}
