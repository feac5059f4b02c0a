//! Shared world state for job lifecycle BDD scenarios.

use std::sync::Arc;

use chrono::DateTime;
use imagine_relay::job::{
    adapters::memory::{
        InMemoryJobStore, ManualClock, RecordingChatTransport, RecordingWebhookNotifier,
    },
    domain::JobId,
    services::{JobLifecycleError, JobLifecycleService, LifecycleConfig, SubmittedJob},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type RelayService = JobLifecycleService<
    InMemoryJobStore,
    RecordingChatTransport,
    RecordingWebhookNotifier,
    ManualClock,
>;

/// Scenario world for job lifecycle behaviour tests.
pub struct JobLifecycleWorld {
    pub service: Option<Arc<RelayService>>,
    pub transport: Arc<RecordingChatTransport>,
    pub notifier: Arc<RecordingWebhookNotifier>,
    pub clock: ManualClock,
    pub channel_id: u64,
    pub last_submission: Option<Result<SubmittedJob, JobLifecycleError>>,
    pub last_job_id: Option<JobId>,
}

impl JobLifecycleWorld {
    /// Creates a world whose relay is not wired yet.
    #[must_use]
    pub fn new() -> Self {
        let start = DateTime::from_timestamp(1_767_225_600, 0).unwrap_or(DateTime::UNIX_EPOCH);
        Self {
            service: None,
            transport: Arc::new(RecordingChatTransport::new()),
            notifier: Arc::new(RecordingWebhookNotifier::new()),
            clock: ManualClock::new(start),
            channel_id: 0,
            last_submission: None,
            last_job_id: None,
        }
    }

    /// Wires the relay for `channel_id` around the world's adapters.
    pub fn wire(&mut self, channel_id: u64) {
        self.channel_id = channel_id;
        self.service = Some(Arc::new(JobLifecycleService::new(
            Arc::new(InMemoryJobStore::new()),
            Arc::clone(&self.transport),
            Arc::clone(&self.notifier),
            Arc::new(self.clock.clone()),
            LifecycleConfig::new(channel_id),
        )));
    }

    /// Returns the wired service.
    ///
    /// # Errors
    ///
    /// Returns an error when no relay step ran first.
    pub fn service(&self) -> Result<Arc<RelayService>, eyre::Report> {
        self.service
            .clone()
            .ok_or_else(|| eyre::eyre!("relay not wired in scenario world"))
    }

    /// Returns the job submitted last.
    ///
    /// # Errors
    ///
    /// Returns an error when no submission succeeded.
    pub fn job_id(&self) -> Result<JobId, eyre::Report> {
        self.last_job_id
            .ok_or_else(|| eyre::eyre!("no job submitted in scenario world"))
    }
}

impl Default for JobLifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> JobLifecycleWorld {
    JobLifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
