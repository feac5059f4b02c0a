//! Recording webhook notifier for tests and local dry runs.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::job::{
    domain::{CallbackTarget, CompletionNotification},
    ports::{NotificationError, NotificationResult, WebhookNotifier},
};

/// One recorded delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNotification {
    /// Target the notification was addressed to.
    pub target: CallbackTarget,
    /// Payload that would have been posted.
    pub notification: CompletionNotification,
}

/// Webhook notifier that records attempts instead of sending them.
///
/// When configured to reject, attempts are still recorded and then fail with
/// [`NotificationError::Rejected`].
#[derive(Debug, Clone, Default)]
pub struct RecordingWebhookNotifier {
    state: Arc<RwLock<RecordingNotifierState>>,
}

#[derive(Debug, Default)]
struct RecordingNotifierState {
    attempts: Vec<RecordedNotification>,
    rejection_status: Option<u16>,
}

impl RecordingWebhookNotifier {
    /// Creates a notifier that accepts every attempt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent attempts fail with the given HTTP status, or succeed
    /// again when `None`.
    pub fn reject_with(&self, status: Option<u16>) {
        if let Ok(mut state) = self.state.write() {
            state.rejection_status = status;
        }
    }

    /// Returns all recorded attempts in order.
    #[must_use]
    pub fn attempts(&self) -> Vec<RecordedNotification> {
        self.state
            .read()
            .map(|state| state.attempts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl WebhookNotifier for RecordingWebhookNotifier {
    async fn notify(
        &self,
        target: &CallbackTarget,
        notification: &CompletionNotification,
    ) -> NotificationResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| NotificationError::delivery(std::io::Error::other(err.to_string())))?;
        state.attempts.push(RecordedNotification {
            target: target.clone(),
            notification: notification.clone(),
        });
        match state.rejection_status {
            Some(status) => Err(NotificationError::Rejected { status }),
            None => Ok(()),
        }
    }
}
