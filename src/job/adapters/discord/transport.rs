//! Chat transport posting prompts through the Discord REST API.

use async_trait::async_trait;
use serenity::http::{Http, HttpError};
use serenity::model::id::ChannelId;
use std::sync::Arc;
use tracing::debug;

use crate::job::ports::{
    ChatTransport, ChatTransportError, ChatTransportResult, PostPromptCommand,
};

/// Posts tagged prompts as plain channel messages.
#[derive(Clone)]
pub struct SerenityChatTransport {
    http: Arc<Http>,
}

impl SerenityChatTransport {
    /// Creates a transport around a serenity HTTP client.
    #[must_use]
    pub const fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatTransport for SerenityChatTransport {
    async fn post_prompt(&self, command: &PostPromptCommand) -> ChatTransportResult<()> {
        if command.channel_id == 0 {
            return Err(ChatTransportError::ChannelUnavailable(command.channel_id));
        }
        let message = ChannelId::new(command.channel_id)
            .say(&*self.http, command.tagged_text.as_str())
            .await
            .map_err(|err| classify(command.channel_id, err))?;
        debug!(message_id = %message.id, channel_id = command.channel_id, "prompt posted");
        Ok(())
    }
}

/// Maps missing-access and unknown-channel answers to
/// [`ChatTransportError::ChannelUnavailable`].
fn classify(channel_id: u64, err: serenity::Error) -> ChatTransportError {
    let unavailable = match &err {
        serenity::Error::Http(http_err) => is_unreachable_channel(http_err),
        _ => false,
    };
    if unavailable {
        ChatTransportError::ChannelUnavailable(channel_id)
    } else {
        ChatTransportError::transport(err)
    }
}

fn is_unreachable_channel(http_err: &HttpError) -> bool {
    match http_err {
        HttpError::UnsuccessfulRequest(response) => {
            matches!(response.status_code.as_u16(), 403 | 404)
        }
        _ => false,
    }
}
