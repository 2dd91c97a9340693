//! Monitoring loop
//!
//! Owns the alert state and runs sample → evaluate → dispatch cycles at a
//! fixed interval. Cycles are strictly sequential: a slow cycle pushes the
//! next one back instead of overlapping it.

use crate::alerts::{
    AlertPolicy, AlertState, DeliveryResult, Dispatcher, EventKind, NotificationEvent, Timestamp,
};
use crate::domain::aggregate;
use crate::error::TelemetryError;
use crate::telemetry::TelemetrySource;

use chrono::Utc;
use std::thread;
use std::time::{Duration, Instant};

/// What happened during one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// State after the cycle
    pub state: AlertState,
    /// Event produced by the state machine, if any
    pub event: Option<NotificationEvent>,
    /// Delivery outcome for `event`
    pub delivery: Option<DeliveryResult>,
}

/// Low-utilization monitor
pub struct Monitor<S: TelemetrySource> {
    source: S,
    dispatcher: Dispatcher,
    policy: AlertPolicy,
    interval: Duration,
    state: AlertState,
}

impl<S: TelemetrySource> Monitor<S> {
    /// Create a monitor starting in the normal state
    pub fn new(source: S, dispatcher: Dispatcher, policy: AlertPolicy, interval: Duration) -> Self {
        Self {
            source,
            dispatcher,
            policy,
            interval,
            state: AlertState::Normal,
        }
    }

    /// Current alert state
    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Sample once to check the telemetry tool is usable
    ///
    /// Only a command that can't be launched is fatal; other failures may be
    /// transient and are logged.
    pub fn probe(&self) -> Result<(), TelemetryError> {
        match self.source.sample() {
            Ok(readings) => {
                log::info!(
                    "{} reports {} GPU(s)",
                    self.source.name(),
                    readings.len()
                );
                for reading in &readings {
                    log::debug!("  {}", reading);
                }
                Ok(())
            }
            Err(e) if e.is_unavailable() => Err(e),
            Err(e) => {
                log::warn!("Initial telemetry sample failed: {}", e);
                Ok(())
            }
        }
    }

    /// Send the "monitoring started" notification
    pub fn announce(&self, now: Timestamp) -> DeliveryResult {
        let event = NotificationEvent::started(&self.policy.server_name, now);
        self.dispatcher.dispatch(&event)
    }

    /// Run one sample → evaluate → dispatch cycle
    pub fn tick(&mut self, now: Timestamp) -> CycleReport {
        let snapshot = self.source.sample();

        match &snapshot {
            Ok(readings) => match aggregate(readings) {
                Some(util) => log::info!(
                    "GPU utilization: {} across {} device(s)",
                    util,
                    readings.len()
                ),
                None => log::warn!("No GPUs reported; skipping evaluation"),
            },
            Err(e) => log::error!("Failed to sample GPU telemetry: {}", e),
        }

        let eval = self.state.evaluate(now, &snapshot, &self.policy);
        if eval.state != self.state {
            log::info!("Alert state: {} -> {}", self.state, eval.state);
        }
        self.state = eval.state;

        let delivery = eval.event.as_ref().map(|event| {
            log::log!(log_level(event.kind), "{}", event);
            self.dispatcher.dispatch(event)
        });

        CycleReport {
            state: self.state,
            event: eval.event,
            delivery,
        }
    }

    /// Run cycles forever
    pub fn run(&mut self) {
        log::info!(
            "Monitoring every {:?} (threshold {}%, sustained {:?})",
            self.interval,
            self.policy.utilization_threshold,
            self.policy.sustained_threshold
        );

        loop {
            let started = Instant::now();
            self.tick(Utc::now());

            let elapsed = started.elapsed();
            match self.interval.checked_sub(elapsed) {
                Some(remaining) => thread::sleep(remaining),
                None => log::warn!(
                    "Cycle took {:?}, longer than the {:?} interval",
                    elapsed,
                    self.interval
                ),
            }
        }
    }
}

fn log_level(kind: EventKind) -> log::Level {
    match kind {
        EventKind::Info | EventKind::Success => log::Level::Info,
        EventKind::Warning => log::Level::Warn,
        EventKind::Danger | EventKind::Error => log::Level::Error,
    }
}
