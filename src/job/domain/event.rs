//! Inbound chat events delivered by the chat transport.

use serde::{Deserialize, Serialize};

/// Attachment carried by a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// Download location of the attachment.
    pub url: String,
    /// Declared media type, when the platform reports one.
    pub media_type: Option<String>,
}

impl ImageAttachment {
    /// Creates an attachment description.
    #[must_use]
    pub fn new(url: impl Into<String>, media_type: Option<String>) -> Self {
        Self {
            url: url.into(),
            media_type,
        }
    }
}

/// Prior message in the watched channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Platform identifier of the message author.
    pub author_id: u64,
    /// Message text.
    pub text: String,
}

impl ChannelMessage {
    /// Creates a history entry.
    #[must_use]
    pub fn new(author_id: u64, text: impl Into<String>) -> Self {
        Self {
            author_id,
            text: text.into(),
        }
    }
}

/// Message that arrived in the watched channel and may complete a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// Platform identifier of the message author.
    pub author_id: u64,
    /// Channel the message arrived in.
    pub channel_id: u64,
    /// First attachment of the message, if any.
    pub attachment: Option<ImageAttachment>,
    /// Message text.
    pub text: String,
    /// Messages preceding this one, most recent first.
    pub recent_channel_history: Vec<ChannelMessage>,
}

impl CompletionEvent {
    /// Creates an event without attachment or history.
    #[must_use]
    pub fn new(author_id: u64, channel_id: u64, text: impl Into<String>) -> Self {
        Self {
            author_id,
            channel_id,
            attachment: None,
            text: text.into(),
            recent_channel_history: Vec::new(),
        }
    }

    /// Sets the attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: ImageAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Sets the channel history, ordered most recent first.
    #[must_use]
    pub fn with_history(mut self, history: impl IntoIterator<Item = ChannelMessage>) -> Self {
        self.recent_channel_history = history.into_iter().collect();
        self
    }
}
