//! Webhook port used to announce completed jobs.

use crate::job::domain::{CallbackTarget, CompletionNotification};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification delivery.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Single-attempt delivery of completion notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookNotifier: Send + Sync {
    /// Posts `notification` to `target` once.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when the request fails or the receiver
    /// answers with a non-success status.
    async fn notify(
        &self,
        target: &CallbackTarget,
        notification: &CompletionNotification,
    ) -> NotificationResult<()>;
}

/// Errors returned by webhook adapters.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// The receiver answered with a non-success status.
    #[error("webhook receiver answered with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },

    /// The request could not be delivered.
    #[error("webhook delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationError {
    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
