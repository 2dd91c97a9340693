//! Alert system domain types
//!
//! Defines notification events and the per-kind presentation table used when
//! rendering them.

use chrono::{DateTime, Utc};
use std::fmt;

/// Wall-clock instant used throughout the alerting pipeline
pub type Timestamp = DateTime<Utc>;

/// Kind of notification sent to the webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Monitoring started
    Info,
    /// Utilization dropped to or below the threshold
    Warning,
    /// Utilization has stayed low for the sustained threshold
    Danger,
    /// Utilization recovered after a sustained alert
    Success,
    /// Telemetry could not be read
    Error,
}

/// Presentation attributes for one event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindStyle {
    /// Attachment color (Slack keyword or hex code)
    pub color: &'static str,
    /// Headline shown in the attachment
    pub title: &'static str,
    /// Label for the occurrence time field
    pub time_label: &'static str,
}

const COLOR_INFO: &str = "#439FE0";
const COLOR_SUCCESS: &str = "good";
const COLOR_WARNING: &str = "warning";
const COLOR_DANGER: &str = "danger";

// Indexed by `EventKind` discriminant.
static STYLES: [KindStyle; 5] = [
    KindStyle {
        color: COLOR_INFO,
        title: "GPU monitoring started",
        time_label: "Started at",
    },
    KindStyle {
        color: COLOR_WARNING,
        title: "GPU utilization is low",
        time_label: "First occurrence",
    },
    KindStyle {
        color: COLOR_DANGER,
        title: "GPU utilization has stayed low",
        time_label: "First occurrence",
    },
    KindStyle {
        color: COLOR_SUCCESS,
        title: "GPU utilization is back to normal",
        time_label: "Recovered at",
    },
    KindStyle {
        color: COLOR_DANGER,
        title: "Failed to read GPU telemetry",
        time_label: "Occurred at",
    },
];

impl EventKind {
    /// Color, title and labels for this kind
    pub fn style(self) -> &'static KindStyle {
        &STYLES[self as usize]
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Danger => write!(f, "DANGER"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A single notification produced by the alert state machine
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    /// What happened
    pub kind: EventKind,
    /// Server that produced the event
    pub server_name: String,
    /// When the condition started (or when the event happened)
    pub occurred_at: Option<Timestamp>,
    /// Aggregate utilization at the time of the event
    pub utilization: Option<f64>,
    /// Free-text detail (e.g. a telemetry failure message)
    pub detail: Option<String>,
}

impl NotificationEvent {
    fn new(kind: EventKind, server_name: &str) -> Self {
        Self {
            kind,
            server_name: server_name.to_string(),
            occurred_at: None,
            utilization: None,
            detail: None,
        }
    }

    /// Monitoring has started on this server
    pub fn started(server_name: &str, at: Timestamp) -> Self {
        Self::new(EventKind::Info, server_name).at(at)
    }

    /// Utilization first dropped low at `since`
    pub fn warning(server_name: &str, since: Timestamp, utilization: f64) -> Self {
        Self::new(EventKind::Warning, server_name)
            .at(since)
            .with_utilization(utilization)
    }

    /// Utilization has been low continuously since `since`
    pub fn danger(server_name: &str, since: Timestamp, utilization: f64) -> Self {
        Self::new(EventKind::Danger, server_name)
            .at(since)
            .with_utilization(utilization)
    }

    /// Utilization recovered at `at`
    pub fn success(server_name: &str, at: Timestamp, utilization: f64) -> Self {
        Self::new(EventKind::Success, server_name)
            .at(at)
            .with_utilization(utilization)
    }

    /// Telemetry failed at `at`
    pub fn error(server_name: &str, at: Timestamp, detail: impl Into<String>) -> Self {
        Self::new(EventKind::Error, server_name)
            .at(at)
            .with_detail(detail)
    }

    /// Set the occurrence time
    pub fn at(mut self, at: Timestamp) -> Self {
        self.occurred_at = Some(at);
        self
    }

    /// Set the utilization figure
    pub fn with_utilization(mut self, utilization: f64) -> Self {
        self.utilization = Some(utilization);
        self
    }

    /// Set the detail text
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.kind,
            self.server_name,
            self.kind.style().title
        )?;
        if let Some(util) = self.utilization {
            write!(f, " ({:.1}%)", util)?;
        }
        if let Some(detail) = &self.detail {
            write!(f, " - {}", detail)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ALL_KINDS: [EventKind; 5] = [
        EventKind::Info,
        EventKind::Warning,
        EventKind::Danger,
        EventKind::Success,
        EventKind::Error,
    ];

    #[test]
    fn test_style_table_covers_every_kind() {
        for kind in ALL_KINDS {
            let style = kind.style();
            assert!(!style.color.is_empty());
            assert!(!style.title.is_empty());
        }
    }

    #[test]
    fn test_style_palette() {
        assert_eq!(EventKind::Info.style().color, "#439FE0");
        assert_eq!(EventKind::Warning.style().color, "warning");
        assert_eq!(EventKind::Danger.style().color, "danger");
        assert_eq!(EventKind::Success.style().color, "good");
        assert_eq!(EventKind::Error.style().color, "danger");
    }

    #[test]
    fn test_event_constructors() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let warning = NotificationEvent::warning("gpu-01", t0, 30.0);
        assert_eq!(warning.kind, EventKind::Warning);
        assert_eq!(warning.occurred_at, Some(t0));
        assert_eq!(warning.utilization, Some(30.0));
        assert!(warning.detail.is_none());

        let error = NotificationEvent::error("gpu-01", t0, "command not found");
        assert_eq!(error.kind, EventKind::Error);
        assert!(error.utilization.is_none());
        assert_eq!(error.detail.as_deref(), Some("command not found"));
    }

    #[test]
    fn test_event_display() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let event = NotificationEvent::danger("gpu-01", t0, 12.5);
        assert_eq!(
            event.to_string(),
            "[DANGER] gpu-01: GPU utilization has stayed low (12.5%)"
        );
    }
}
