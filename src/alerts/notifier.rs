//! Alert notification delivery
//!
//! A [`Notifier`] makes exactly one delivery attempt; the [`Dispatcher`]
//! wraps it with a bounded retry loop and reports the outcome.

use super::payload::render;
use super::types::NotificationEvent;
use crate::error::NotifyError;

use chrono::FixedOffset;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

/// Default number of delivery attempts per event
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default timeout for a single webhook request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Notification channel trait
pub trait Notifier: Send + Sync {
    /// Make one delivery attempt, returning the endpoint's response text
    fn notify(&self, event: &NotificationEvent) -> Result<String, NotifyError>;

    /// Channel name for identification
    fn name(&self) -> &str;
}

/// Slack-style incoming webhook notifier
pub struct WebhookNotifier {
    client: Client,
    url: String,
    offset: FixedOffset,
}

impl WebhookNotifier {
    /// Create a notifier posting to `url` with a per-request timeout
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        offset: FixedOffset,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            offset,
        })
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, event: &NotificationEvent) -> Result<String, NotifyError> {
        let payload = render(event, self.offset);

        let response = self.client.post(&self.url).json(&payload).send()?;
        let status = response.status();
        let body = response.text().unwrap_or_default();

        if status == StatusCode::OK {
            Ok(body)
        } else {
            Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

/// Outcome of dispatching one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    /// Whether any attempt succeeded
    pub delivered: bool,
    /// Number of attempts made
    pub attempts: u32,
    /// Response text (or error message) from the last attempt
    pub last_response: String,
}

/// Delivers events through a notifier with bounded retry
///
/// Attempts stop at the first success. Every attempt sends the same payload
/// and no idempotency key, so a success whose response is lost can be
/// delivered twice.
pub struct Dispatcher {
    notifier: Box<dyn Notifier>,
    max_attempts: u32,
}

impl Dispatcher {
    /// Create a dispatcher with the default attempt limit
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self {
            notifier,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set the total number of attempts (at least one)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Get the attempt limit
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Deliver an event, retrying on failure
    pub fn dispatch(&self, event: &NotificationEvent) -> DeliveryResult {
        let mut last_response = String::new();

        for attempt in 1..=self.max_attempts {
            match self.notifier.notify(event) {
                Ok(body) => {
                    log::debug!(
                        "Delivered {} via {} (attempt {}/{})",
                        event.kind,
                        self.notifier.name(),
                        attempt,
                        self.max_attempts
                    );
                    return DeliveryResult {
                        delivered: true,
                        attempts: attempt,
                        last_response: body,
                    };
                }
                Err(e) => {
                    log::warn!(
                        "Failed to deliver {} via {} (attempt {}/{}): {}",
                        event.kind,
                        self.notifier.name(),
                        attempt,
                        self.max_attempts,
                        e
                    );
                    last_response = e.to_string();
                }
            }
        }

        log::error!(
            "Giving up on {} notification after {} attempts: {}",
            event.kind,
            self.max_attempts,
            last_response
        );

        DeliveryResult {
            delivered: false,
            attempts: self.max_attempts,
            last_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{RecordingNotifier, ScriptedNotifier};
    use chrono::{TimeZone, Utc};
    use httpmock::prelude::*;

    fn event() -> NotificationEvent {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        NotificationEvent::warning("gpu-01", t0, 25.0)
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_dispatch_first_attempt_succeeds() {
        let notifier = RecordingNotifier::new();
        let dispatcher = Dispatcher::new(Box::new(notifier.clone()));

        let result = dispatcher.dispatch(&event());
        assert!(result.delivered);
        assert_eq!(result.attempts, 1);
        assert_eq!(result.last_response, "ok");
        assert_eq!(notifier.events().len(), 1);
    }

    #[test]
    fn test_dispatch_retries_until_success() {
        let notifier = ScriptedNotifier::new(vec![false, false, true]);
        let dispatcher = Dispatcher::new(Box::new(notifier.clone()));

        let result = dispatcher.dispatch(&event());
        assert!(result.delivered);
        assert_eq!(result.attempts, 3);
        assert_eq!(notifier.calls(), 3);
    }

    #[test]
    fn test_dispatch_gives_up_after_max_attempts() {
        let notifier = ScriptedNotifier::new(vec![false; 5]);
        let dispatcher = Dispatcher::new(Box::new(notifier.clone()));

        let result = dispatcher.dispatch(&event());
        assert!(!result.delivered);
        assert_eq!(result.attempts, 3);
        assert_eq!(notifier.calls(), 3);
        assert!(result.last_response.contains("500"));
        // Every retry resends the same event
        assert!(notifier.attempts().iter().all(|e| *e == event()));
    }

    #[test]
    fn test_max_attempts_floor_is_one() {
        let dispatcher = Dispatcher::new(Box::new(RecordingNotifier::new())).with_max_attempts(0);
        assert_eq!(dispatcher.max_attempts(), 1);
    }

    #[test]
    fn test_webhook_posts_attachment() {
        let server = MockServer::start();
        let hook = server.mock(|when, then| {
            when.method(POST)
                .path("/hook")
                .header("content-type", "application/json")
                .json_body_partial(
                    r#"{"attachments":[{"color":"warning","author_name":"gpu-01"}]}"#,
                );
            then.status(200).body("ok");
        });

        let notifier =
            WebhookNotifier::new(server.url("/hook"), DEFAULT_REQUEST_TIMEOUT, utc()).unwrap();
        let body = notifier.notify(&event()).unwrap();

        assert_eq!(body, "ok");
        hook.assert();
    }

    #[test]
    fn test_webhook_non_200_is_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/hook");
            then.status(201).body("created");
        });

        let notifier =
            WebhookNotifier::new(server.url("/hook"), DEFAULT_REQUEST_TIMEOUT, utc()).unwrap();
        match notifier.notify(&event()).unwrap_err() {
            NotifyError::Status { status, body } => {
                assert_eq!(status, 201);
                assert_eq!(body, "created");
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[test]
    fn test_webhook_three_failures_three_attempts() {
        let server = MockServer::start();
        let hook = server.mock(|when, then| {
            when.method(POST).path("/hook");
            then.status(500).body("invalid_token");
        });

        let notifier =
            WebhookNotifier::new(server.url("/hook"), DEFAULT_REQUEST_TIMEOUT, utc()).unwrap();
        let result = Dispatcher::new(Box::new(notifier)).dispatch(&event());

        assert!(!result.delivered);
        assert_eq!(result.attempts, 3);
        assert!(result.last_response.contains("invalid_token"));
        hook.assert_hits(3);
    }

    #[test]
    fn test_webhook_timeout_is_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/hook");
            then.status(200).body("ok").delay(Duration::from_secs(3));
        });

        let notifier =
            WebhookNotifier::new(server.url("/hook"), Duration::from_secs(1), utc()).unwrap();
        let err = notifier.notify(&event()).unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));

        let result = Dispatcher::new(Box::new(notifier)).dispatch(&event());
        assert!(!result.delivered);
        assert_eq!(result.attempts, 3);
    }

    #[test]
    fn test_webhook_transport_error() {
        // Nothing listens on the discard port.
        let notifier = WebhookNotifier::new(
            "http://127.0.0.1:9/hook",
            Duration::from_secs(2),
            utc(),
        )
        .unwrap();
        let err = notifier.notify(&event()).unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));
    }
}
