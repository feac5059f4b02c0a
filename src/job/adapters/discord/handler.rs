//! Serenity event handler feeding channel messages into the lifecycle.

use serenity::async_trait;
use serenity::builder::GetMessages;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::{Context, EventHandler};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::job::{
    domain::{ChannelMessage, CompletionEvent, ImageAttachment},
    ports::{ChatTransport, JobStore, WebhookNotifier},
    services::JobLifecycleService,
};
use mockable::Clock;

/// Discord caps a single history fetch at 100 messages.
const MAX_HISTORY_FETCH: u8 = 100;

/// Watches one channel and forwards its messages to the lifecycle service.
pub struct CompletionEventHandler<S, T, N, C>
where
    S: JobStore,
    T: ChatTransport,
    N: WebhookNotifier,
    C: Clock + Send + Sync,
{
    service: Arc<JobLifecycleService<S, T, N, C>>,
    watched_channel: u64,
}

impl<S, T, N, C> CompletionEventHandler<S, T, N, C>
where
    S: JobStore,
    T: ChatTransport,
    N: WebhookNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a handler watching the service's dispatch channel.
    #[must_use]
    pub fn new(service: Arc<JobLifecycleService<S, T, N, C>>) -> Self {
        let watched_channel = service.config().channel_id();
        Self {
            service,
            watched_channel,
        }
    }

    async fn fetch_history(&self, ctx: &Context, msg: &Message) -> Vec<ChannelMessage> {
        let window = self.service.matcher().config().history_window();
        let limit = u8::try_from(window).map_or(MAX_HISTORY_FETCH, |limit| limit.min(MAX_HISTORY_FETCH));
        if limit == 0 {
            return Vec::new();
        }
        match msg
            .channel_id
            .messages(ctx, GetMessages::new().before(msg.id).limit(limit))
            .await
        {
            Ok(history) => history.iter().map(channel_message).collect(),
            Err(err) => {
                warn!(message_id = %msg.id, error = %err, "failed to fetch channel history");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl<S, T, N, C> EventHandler for CompletionEventHandler<S, T, N, C>
where
    S: JobStore + 'static,
    T: ChatTransport + 'static,
    N: WebhookNotifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, channel_id = self.watched_channel, "chat gateway connected");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.channel_id.get() != self.watched_channel {
            return;
        }

        // History is only fetched for messages that could complete a job.
        let candidate = completion_event(&msg);
        if let Err(reason) = self.service.matcher().qualify(&candidate) {
            debug!(message_id = %msg.id, ?reason, "ignoring channel message");
            return;
        }

        let history = self.fetch_history(&ctx, &msg).await;
        let event = candidate.with_history(history);
        let outcome = self.service.on_completion_event(&event).await;
        debug!(message_id = %msg.id, ?outcome, "processed result message");
    }
}

fn completion_event(msg: &Message) -> CompletionEvent {
    let event = CompletionEvent::new(msg.author.id.get(), msg.channel_id.get(), msg.content.clone());
    match msg.attachments.first() {
        Some(attachment) => event.with_attachment(ImageAttachment::new(
            attachment.url.clone(),
            attachment.content_type.clone(),
        )),
        None => event,
    }
}

fn channel_message(msg: &Message) -> ChannelMessage {
    ChannelMessage::new(msg.author.id.get(), msg.content.clone())
}
