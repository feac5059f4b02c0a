//! Shared relay wiring for in-memory integration tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use imagine_relay::job::{
    adapters::memory::{
        InMemoryJobStore, ManualClock, RecordingChatTransport, RecordingWebhookNotifier,
    },
    domain::{CompletionEvent, ImageAttachment, JobId},
    services::{
        DEFAULT_GENERATION_AUTHOR_ID, JobLifecycleService, LifecycleConfig, SubmitJobRequest,
    },
};
use rstest::fixture;

/// Channel the relay posts prompts to.
pub const CHANNEL: u64 = 1_100_000_000_000_000_001;

/// Identity of the relay's own account.
pub const RELAY_ACCOUNT: u64 = 1_100_000_000_000_000_002;

/// Identity of the image generation service.
pub const GENERATOR: u64 = DEFAULT_GENERATION_AUTHOR_ID;

/// Callback target used by most tests.
pub const CALLBACK: &str = "https://hooks.example/x";

/// Service type wired with in-memory adapters.
pub type RelayService = JobLifecycleService<
    InMemoryJobStore,
    RecordingChatTransport,
    RecordingWebhookNotifier,
    ManualClock,
>;

/// In-memory relay with handles on every adapter.
pub struct Relay {
    pub service: Arc<RelayService>,
    pub transport: Arc<RecordingChatTransport>,
    pub notifier: Arc<RecordingWebhookNotifier>,
    pub clock: ManualClock,
}

impl Relay {
    /// Wires a relay with the given lifecycle settings.
    #[must_use]
    pub fn with_config(config: LifecycleConfig) -> Self {
        let transport = Arc::new(RecordingChatTransport::new());
        let notifier = Arc::new(RecordingWebhookNotifier::new());
        let clock = ManualClock::new(epoch());
        let service = Arc::new(JobLifecycleService::new(
            Arc::new(InMemoryJobStore::new()),
            Arc::clone(&transport),
            Arc::clone(&notifier),
            Arc::new(clock.clone()),
            config,
        ));
        Self {
            service,
            transport,
            notifier,
            clock,
        }
    }

    /// Submits `prompt` with the shared callback target.
    ///
    /// # Errors
    ///
    /// Returns an error when submission fails.
    pub async fn submit(&self, prompt: &str) -> Result<JobId, eyre::Report> {
        let submitted = self
            .service
            .submit(SubmitJobRequest::new(prompt).with_callback_target(CALLBACK))
            .await?;
        Ok(submitted.job_id)
    }

    /// Returns the text of the most recently posted prompt.
    ///
    /// # Errors
    ///
    /// Returns an error when nothing was posted.
    pub fn last_posted(&self) -> Result<String, eyre::Report> {
        self.transport
            .posted()
            .last()
            .map(|command| command.tagged_text.clone())
            .ok_or_else(|| eyre::eyre!("no prompt was posted"))
    }
}

/// Start instant of every test clock.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_767_225_600, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Builds the generator's final result message echoing a posted prompt.
#[must_use]
pub fn final_render(posted: &str, image_url: &str) -> CompletionEvent {
    let echoed = posted.trim_start_matches("/imagine prompt:");
    CompletionEvent::new(
        GENERATOR,
        CHANNEL,
        format!("**{echoed}** - <@{RELAY_ACCOUNT}> (fast)"),
    )
    .with_attachment(ImageAttachment::new(
        image_url,
        Some("image/png".to_owned()),
    ))
}

/// Provides a relay with default lifecycle settings.
#[fixture]
pub fn relay() -> Relay {
    Relay::with_config(LifecycleConfig::new(CHANNEL))
}
