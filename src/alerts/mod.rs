//! Alert and notification system
//!
//! Hysteresis-based low-utilization alerting with webhook delivery.

mod notifier;
mod payload;
mod state;
mod types;

pub use notifier::{
    DeliveryResult, Dispatcher, Notifier, WebhookNotifier, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use payload::{format_time, render, TIME_FORMAT};
pub use state::{AlertPolicy, AlertState, Evaluation};
pub use types::{EventKind, KindStyle, NotificationEvent, Timestamp};
