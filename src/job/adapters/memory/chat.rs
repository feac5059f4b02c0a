//! Recording chat transport for tests and local dry runs.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::job::ports::{
    ChatTransport, ChatTransportError, ChatTransportResult, PostPromptCommand,
};

/// Chat transport that records every accepted command instead of posting it.
///
/// It can be switched into an unavailable mode to model an unreachable
/// channel.
#[derive(Debug, Clone, Default)]
pub struct RecordingChatTransport {
    state: Arc<RwLock<RecordingChatState>>,
}

#[derive(Debug, Default)]
struct RecordingChatState {
    posted: Vec<PostPromptCommand>,
    unavailable: bool,
}

impl RecordingChatTransport {
    /// Creates an available transport with no recorded posts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent posts fail with
    /// [`ChatTransportError::ChannelUnavailable`] (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state.write() {
            state.unavailable = unavailable;
        }
    }

    /// Returns the accepted commands in posting order.
    #[must_use]
    pub fn posted(&self) -> Vec<PostPromptCommand> {
        self.state
            .read()
            .map(|state| state.posted.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatTransport for RecordingChatTransport {
    async fn post_prompt(&self, command: &PostPromptCommand) -> ChatTransportResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| ChatTransportError::transport(std::io::Error::other(err.to_string())))?;
        if state.unavailable {
            return Err(ChatTransportError::ChannelUnavailable(command.channel_id));
        }
        state.posted.push(command.clone());
        Ok(())
    }
}
