//! Slack-compatible incoming-webhook notifier

use async_trait::async_trait;
use report_notifier_domain::{Notification, Notifier, NotifyError};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

/// Posts each notification as a single mrkdwn section block
pub struct WebhookNotifier {
    client: Client,
    webhook_url: SecretString,
    enabled: bool,
}

impl WebhookNotifier {
    pub fn new(webhook_url: SecretString) -> Self {
        Self::with_timeout(webhook_url, Duration::from_secs(30))
    }

    pub fn with_timeout(webhook_url: SecretString, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            webhook_url,
            enabled: true,
        }
    }

    /// Create a disabled notifier (for dry-run)
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            webhook_url: SecretString::new("".into()),
            enabled: false,
        }
    }
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    blocks: [Block<'a>; 1],
}

#[derive(Serialize)]
struct Block<'a> {
    r#type: &'static str,
    text: BlockText<'a>,
}

#[derive(Serialize)]
struct BlockText<'a> {
    r#type: &'static str,
    text: &'a str,
}

impl<'a> WebhookMessage<'a> {
    fn section(text: &'a str) -> Self {
        Self {
            blocks: [Block {
                r#type: "section",
                text: BlockText {
                    r#type: "mrkdwn",
                    text,
                },
            }],
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if !self.enabled {
            return Err(NotifyError::Disabled);
        }

        let message = WebhookMessage::section(&notification.text);

        let response = self
            .client
            .post(self.webhook_url.expose_secret())
            .json(&message)
            .send()
            .await
            .map_err(|e| NotifyError::Connection(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(post_id = %notification.post_id, "Webhook accepted message");
        Ok(())
    }
}
