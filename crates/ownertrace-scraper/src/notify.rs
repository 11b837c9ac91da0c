//! Fire-and-forget progress notifications.

use std::time::Duration;

use serde::Serialize;

/// Receives short human-readable progress messages.
///
/// Implementations must return immediately and must never fail the caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Writes notifications to the tracing log. Used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(message, "notification");
    }
}

#[derive(Serialize)]
struct SlackMessage<'a> {
    text: &'a str,
}

/// Posts `{"text": message}` to a Slack incoming webhook on a spawned task.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the HTTP client cannot be constructed.
    pub fn new(webhook_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.to_owned(),
        })
    }

    /// Sends `message` and waits for the webhook to answer.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] on transport failure or a non-2xx status.
    pub async fn send(&self, message: &str) -> Result<(), reqwest::Error> {
        self.client
            .post(&self.webhook_url)
            .json(&SlackMessage { text: message })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl Notifier for SlackNotifier {
    fn notify(&self, message: &str) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(message, "no async runtime; slack notification dropped");
            return;
        };
        let notifier = self.clone();
        let message = message.to_owned();
        handle.spawn(async move {
            if let Err(e) = notifier.send(&message).await {
                tracing::warn!(error = %e, "slack notification failed");
            }
        });
    }
}
