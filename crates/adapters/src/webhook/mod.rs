//! Chat webhook notifier adapters

mod send;

pub use send::WebhookNotifier;

use async_trait::async_trait;
use report_notifier_domain::{Notification, Notifier, NotifyError, PostId};

/// Stub notifier for testing
pub struct StubNotifier {
    fail_on: Option<PostId>,
    sent: std::sync::Mutex<Vec<Notification>>,
}

impl StubNotifier {
    pub fn new() -> Self {
        Self {
            fail_on: None,
            sent: std::sync::Mutex::new(vec![]),
        }
    }

    /// Reject the message for `post_id` as a webhook would on HTTP 500
    pub fn failing_on(post_id: impl Into<PostId>) -> Self {
        Self {
            fail_on: Some(post_id.into()),
            ..Self::new()
        }
    }

    /// Get all messages that were sent
    pub fn get_sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for StubNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for StubNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail_on.as_ref() == Some(&notification.post_id) {
            return Err(NotifyError::Rejected {
                status: 500,
                body: "stub failure".to_string(),
            });
        }

        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
