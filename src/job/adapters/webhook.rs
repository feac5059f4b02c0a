//! HTTP webhook notifier backed by `reqwest`.

use async_trait::async_trait;
use std::time::Duration;

use crate::job::{
    domain::{CallbackTarget, CompletionNotification},
    ports::{NotificationError, NotificationResult, WebhookNotifier},
};

/// Default request timeout for webhook deliveries.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts completion notifications as JSON.
#[derive(Debug, Clone)]
pub struct ReqwestWebhookNotifier {
    client: reqwest::Client,
}

impl ReqwestWebhookNotifier {
    /// Creates a notifier whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Delivery`] when the HTTP client cannot be
    /// built.
    pub fn new(timeout: Duration) -> NotificationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(NotificationError::delivery)?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebhookNotifier for ReqwestWebhookNotifier {
    async fn notify(
        &self,
        target: &CallbackTarget,
        notification: &CompletionNotification,
    ) -> NotificationResult<()> {
        let response = self
            .client
            .post(target.as_url().clone())
            .json(notification)
            .send()
            .await
            .map_err(NotificationError::delivery)?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
