//! Low-utilization alert state machine
//!
//! [`AlertState::evaluate`] is a pure transition function: given the current
//! state, the time, one telemetry snapshot and the policy, it returns the
//! next state and at most one notification. The caller owns the state and
//! threads it from one cycle to the next.

use super::types::{NotificationEvent, Timestamp};
use crate::domain::{aggregate, TelemetrySnapshot};
use std::fmt;
use std::time::Duration;

/// Thresholds the state machine evaluates against
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPolicy {
    /// Server name attached to every event
    pub server_name: String,
    /// Utilization at or below this percentage counts as low
    pub utilization_threshold: f64,
    /// How long utilization must stay low before the danger alert
    pub sustained_threshold: Duration,
}

impl AlertPolicy {
    /// Create a new policy
    pub fn new(
        server_name: impl Into<String>,
        utilization_threshold: f64,
        sustained_threshold: Duration,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            utilization_threshold,
            sustained_threshold,
        }
    }

    /// Whether `since` is at least the sustained threshold before `now`
    fn sustained(&self, since: Timestamp, now: Timestamp) -> bool {
        now.signed_duration_since(since)
            .to_std()
            .map(|elapsed| elapsed >= self.sustained_threshold)
            .unwrap_or(false)
    }
}

/// Hysteresis state carried between evaluation cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertState {
    /// Utilization above threshold
    #[default]
    Normal,
    /// Utilization low since `since`, no danger alert sent yet
    LowPending { since: Timestamp },
    /// Danger alert sent; waiting for recovery
    LowSustained,
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::LowPending { since } => write!(f, "LOW_PENDING (since {})", since),
            Self::LowSustained => write!(f, "LOW_SUSTAINED"),
        }
    }
}

/// Result of one evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// State to carry into the next cycle
    pub state: AlertState,
    /// Notification to dispatch, if any
    pub event: Option<NotificationEvent>,
}

impl Evaluation {
    fn quiet(state: AlertState) -> Self {
        Self { state, event: None }
    }

    fn notify(state: AlertState, event: NotificationEvent) -> Self {
        Self {
            state,
            event: Some(event),
        }
    }
}

impl AlertState {
    /// Compute the next state and event for one telemetry snapshot
    ///
    /// Telemetry errors produce an error event and leave the state (and its
    /// timer) untouched. An empty device list carries no utilization figure
    /// and is a no-op.
    pub fn evaluate(
        self,
        now: Timestamp,
        telemetry: &TelemetrySnapshot,
        policy: &AlertPolicy,
    ) -> Evaluation {
        let readings = match telemetry {
            Ok(readings) => readings,
            Err(err) => {
                return Evaluation::notify(
                    self,
                    NotificationEvent::error(&policy.server_name, now, err.to_string()),
                );
            }
        };

        let Some(utilization) = aggregate(readings) else {
            return Evaluation::quiet(self);
        };
        let low = utilization.is_low(policy.utilization_threshold);
        let util = utilization.as_percent();
        let server = policy.server_name.as_str();

        match (self, low) {
            (Self::Normal, true) => Evaluation::notify(
                Self::LowPending { since: now },
                NotificationEvent::warning(server, now, util),
            ),
            (Self::Normal, false) => Evaluation::quiet(Self::Normal),

            (Self::LowPending { since }, true) if policy.sustained(since, now) => {
                Evaluation::notify(
                    Self::LowSustained,
                    NotificationEvent::danger(server, since, util),
                )
            }
            (Self::LowPending { since }, true) => Evaluation::quiet(Self::LowPending { since }),
            // Nobody was paged for this episode, so recovery stays silent.
            (Self::LowPending { .. }, false) => Evaluation::quiet(Self::Normal),

            (Self::LowSustained, true) => Evaluation::quiet(Self::LowSustained),
            (Self::LowSustained, false) => Evaluation::notify(
                Self::Normal,
                NotificationEvent::success(server, now, util),
            ),
        }
    }

    /// Whether utilization is currently considered low
    pub fn is_low(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}
