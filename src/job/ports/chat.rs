//! Chat transport port used to dispatch tagged prompts.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for chat transport operations.
pub type ChatTransportResult<T> = Result<T, ChatTransportError>;

/// Outbound command posting a tagged prompt into a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPromptCommand {
    /// Destination channel.
    pub channel_id: u64,
    /// Message text with the tagging marker embedded.
    pub tagged_text: String,
}

impl PostPromptCommand {
    /// Creates a post command.
    #[must_use]
    pub fn new(channel_id: u64, tagged_text: impl Into<String>) -> Self {
        Self {
            channel_id,
            tagged_text: tagged_text.into(),
        }
    }
}

/// Outbound half of the chat platform connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Posts the command's text and resolves once the platform accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`ChatTransportError`] when the channel cannot be reached or
    /// the platform rejects the message.
    async fn post_prompt(&self, command: &PostPromptCommand) -> ChatTransportResult<()>;
}

/// Errors returned by chat transport adapters.
#[derive(Debug, Clone, Error)]
pub enum ChatTransportError {
    /// The channel is unknown or not reachable by the bot.
    #[error("chat channel {0} is unavailable")]
    ChannelUnavailable(u64),

    /// Platform or network failure.
    #[error("chat transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl ChatTransportError {
    /// Wraps a platform error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
