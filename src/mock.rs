//! Mock implementations for testing
//!
//! Provides scripted telemetry sources and notifiers for unit testing without
//! real hardware or a webhook endpoint.

use crate::alerts::{NotificationEvent, Notifier};
use crate::domain::{DeviceReading, TelemetrySnapshot};
use crate::error::{NotifyError, TelemetryError};
use crate::telemetry::TelemetrySource;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Telemetry source that replays a fixed sequence of snapshots
///
/// Once the script runs out every further sample is an empty device list.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    snapshots: Arc<Mutex<VecDeque<TelemetrySnapshot>>>,
}

impl ScriptedSource {
    /// Create a source from explicit snapshots
    pub fn new(snapshots: Vec<TelemetrySnapshot>) -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(snapshots.into())),
        }
    }

    /// Create a single-GPU source from a utilization sequence
    pub fn from_utilization(values: &[u8]) -> Self {
        Self::new(values.iter().map(|&v| Self::reading(v)).collect())
    }

    /// A single-GPU snapshot at the given utilization
    pub fn reading(utilization: u8) -> TelemetrySnapshot {
        Ok(vec![DeviceReading::with_utilization(0, utilization)])
    }

    /// A failed snapshot, as from a run that exited unsuccessfully
    pub fn failure(message: &str) -> TelemetrySnapshot {
        Err(TelemetryError::ExitStatus {
            command: "nvidia-smi".to_string(),
            status: "exit status: 9".to_string(),
            stderr: message.to_string(),
        })
    }

    /// Number of snapshots not yet consumed
    pub fn remaining(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }
}

impl TelemetrySource for ScriptedSource {
    fn sample(&self) -> TelemetrySnapshot {
        self.snapshots
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Notifier that records every event and always succeeds
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &NotificationEvent) -> Result<String, NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        Ok("ok".to_string())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Notifier whose attempt outcomes follow a script
///
/// `true` succeeds, `false` fails with HTTP 500. Attempts past the end of
/// the script succeed.
#[derive(Debug, Clone, Default)]
pub struct ScriptedNotifier {
    outcomes: Arc<Mutex<VecDeque<bool>>>,
    attempts: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl ScriptedNotifier {
    /// Create a notifier with the given attempt outcomes
    pub fn new(outcomes: Vec<bool>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            attempts: Arc::default(),
        }
    }

    /// Number of delivery attempts made
    pub fn calls(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    /// Every attempted event, in order (including retries)
    pub fn attempts(&self) -> Vec<NotificationEvent> {
        self.attempts.lock().unwrap().clone()
    }
}

impl Notifier for ScriptedNotifier {
    fn notify(&self, event: &NotificationEvent) -> Result<String, NotifyError> {
        self.attempts.lock().unwrap().push(event.clone());
        let succeed = self.outcomes.lock().unwrap().pop_front().unwrap_or(true);
        if succeed {
            Ok("ok".to_string())
        } else {
            Err(NotifyError::Status {
                status: 500,
                body: "internal error".to_string(),
            })
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
