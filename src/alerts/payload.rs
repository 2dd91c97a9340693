//! Slack-compatible webhook payload rendering

use super::types::{NotificationEvent, Timestamp};
use chrono::FixedOffset;
use serde_json::{json, Value};

/// Timestamp format used in message fields
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

/// Format a timestamp in the given offset
pub fn format_time(at: Timestamp, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format(TIME_FORMAT).to_string()
}

/// Render an event into the webhook JSON body
///
/// The body always carries exactly one attachment. Fields are included only
/// when the event has the corresponding value.
pub fn render(event: &NotificationEvent, offset: FixedOffset) -> Value {
    let style = event.kind.style();
    let mut fields = Vec::new();

    if let Some(at) = event.occurred_at {
        fields.push(field(style.time_label, format_time(at, offset), true));
    }
    if let Some(util) = event.utilization {
        fields.push(field("GPU utilization", format!("{:.1}%", util), true));
    }
    if let Some(detail) = &event.detail {
        fields.push(field("Detail", detail.clone(), false));
    }

    json!({
        "attachments": [{
            "fallback": format!("[{}] {}", event.server_name, style.title),
            "color": style.color,
            "author_name": event.server_name,
            "title": style.title,
            "fields": fields,
        }]
    })
}

fn field(title: &str, value: String, short: bool) -> Value {
    json!({
        "title": title,
        "value": value,
        "short": short,
    })
}
