//! Service layer orchestrating submission, completion and expiry of jobs.

use crate::job::{
    domain::{
        CallbackTarget, CompletionEvent, CompletionNotification, Job, JobDomainError, JobId,
        Prompt, ReclaimPolicy, ReclaimReason, ResultReference, TaggedPrompt,
    },
    ports::{
        ChatTransport, ChatTransportError, JobStore, JobStoreError, PostPromptCommand,
        WebhookNotifier,
    },
    services::correlation::{CandidateRejection, CorrelationMatcher, MatcherConfig},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Default message returned to callers once a prompt is dispatched.
pub const DEFAULT_ACCEPTED_MESSAGE: &str = "Prompt sent to Midjourney";

/// Default completion estimate returned to callers.
pub const DEFAULT_ESTIMATE: &str = "60-120 seconds";

/// Request payload for submitting a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitJobRequest {
    prompt: String,
    callback_target: Option<String>,
}

impl SubmitJobRequest {
    /// Creates a request without an explicit callback target.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            callback_target: None,
        }
    }

    /// Sets the callback target.
    #[must_use]
    pub fn with_callback_target(mut self, callback_target: impl Into<String>) -> Self {
        self.callback_target = Some(callback_target.into());
        self
    }
}

/// Acknowledgement returned after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedJob {
    /// Identifier of the new job.
    pub job_id: JobId,
    /// Human-readable acceptance message.
    pub accepted_message: String,
    /// Human-readable completion estimate.
    pub estimate: String,
}

/// Static settings of the lifecycle service.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    channel_id: u64,
    default_callback_target: Option<CallbackTarget>,
    accepted_message: String,
    estimate: String,
    matcher: MatcherConfig,
    reclaim: ReclaimPolicy,
}

impl LifecycleConfig {
    /// Creates a configuration dispatching prompts to `channel_id`, with
    /// default matcher settings and reclaim policy.
    #[must_use]
    pub fn new(channel_id: u64) -> Self {
        Self {
            channel_id,
            default_callback_target: None,
            accepted_message: DEFAULT_ACCEPTED_MESSAGE.to_owned(),
            estimate: DEFAULT_ESTIMATE.to_owned(),
            matcher: MatcherConfig::default(),
            reclaim: ReclaimPolicy::default(),
        }
    }

    /// Sets the callback target used when a request names none.
    #[must_use]
    pub fn with_default_callback_target(mut self, target: CallbackTarget) -> Self {
        self.default_callback_target = Some(target);
        self
    }

    /// Sets the completion estimate reported to callers.
    #[must_use]
    pub fn with_estimate(mut self, estimate: impl Into<String>) -> Self {
        self.estimate = estimate.into();
        self
    }

    /// Sets the correlation settings.
    #[must_use]
    pub fn with_matcher(mut self, matcher: MatcherConfig) -> Self {
        self.matcher = matcher;
        self
    }

    /// Sets the reclaim policy.
    #[must_use]
    pub const fn with_reclaim_policy(mut self, reclaim: ReclaimPolicy) -> Self {
        self.reclaim = reclaim;
        self
    }

    /// Returns the dispatch channel.
    #[must_use]
    pub const fn channel_id(&self) -> u64 {
        self.channel_id
    }

    /// Returns the correlation settings.
    #[must_use]
    pub const fn matcher(&self) -> &MatcherConfig {
        &self.matcher
    }

    /// Returns the reclaim policy.
    #[must_use]
    pub const fn reclaim_policy(&self) -> &ReclaimPolicy {
        &self.reclaim
    }
}

/// Service-level errors surfaced to submitting and querying callers.
#[derive(Debug, Error)]
pub enum JobLifecycleError {
    /// Caller input failed validation.
    #[error(transparent)]
    Validation(#[from] JobDomainError),
    /// No job exists with the given identifier.
    #[error("job {0} not found")]
    NotFound(JobId),
    /// The prompt could not be dispatched.
    #[error("prompt dispatch failed: {0}")]
    TransportUnavailable(#[source] ChatTransportError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] JobStoreError),
}

/// Result type for lifecycle service operations.
pub type JobLifecycleResult<T> = Result<T, JobLifecycleError>;

/// Result of delivering the completion notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The receiver acknowledged the webhook.
    Delivered,
    /// Delivery failed; it is not retried.
    Failed,
    /// The job has no callback target.
    Skipped,
}

/// What handling a chat event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The event is not a completion candidate.
    Ignored(CandidateRejection),
    /// No pending job could be attributed to the event.
    Unmatched,
    /// The event completed a job.
    Completed {
        /// Completed job.
        job_id: JobId,
        /// Result of the notification attempt.
        notification: NotificationOutcome,
    },
    /// The store failed; the event was dropped.
    StoreFailure,
}

/// Jobs removed by one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Pending jobs past the staleness threshold.
    pub stale: Vec<JobId>,
    /// Completed jobs past the grace period.
    pub expired: Vec<JobId>,
}

impl SweepReport {
    /// Returns the total number of removed jobs.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.stale.len() + self.expired.len()
    }
}

/// Job lifecycle orchestration service.
///
/// Owns the job store and mediates every side effect: prompt dispatch,
/// completion notification and reclamation.
pub struct JobLifecycleService<S, T, N, C>
where
    S: JobStore,
    T: ChatTransport,
    N: WebhookNotifier,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    transport: Arc<T>,
    notifier: Arc<N>,
    clock: Arc<C>,
    matcher: CorrelationMatcher,
    config: LifecycleConfig,
}

impl<S, T, N, C> Clone for JobLifecycleService<S, T, N, C>
where
    S: JobStore,
    T: ChatTransport,
    N: WebhookNotifier,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            transport: Arc::clone(&self.transport),
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
            matcher: self.matcher.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S, T, N, C> JobLifecycleService<S, T, N, C>
where
    S: JobStore,
    T: ChatTransport,
    N: WebhookNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a new lifecycle service.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        transport: Arc<T>,
        notifier: Arc<N>,
        clock: Arc<C>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            transport,
            notifier,
            clock,
            matcher: CorrelationMatcher::new(config.matcher.clone()),
            config,
        }
    }

    /// Returns the service configuration.
    #[must_use]
    pub const fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Returns the correlation matcher.
    #[must_use]
    pub const fn matcher(&self) -> &CorrelationMatcher {
        &self.matcher
    }

    /// Returns the clock used for all lifecycle timestamps.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Creates a pending job and posts its tagged prompt.
    ///
    /// The record is stored before dispatch so that an early result can be
    /// correlated, and removed again when dispatch fails.
    ///
    /// # Errors
    ///
    /// Returns [`JobLifecycleError::Validation`] for a blank prompt or a
    /// malformed callback target, [`JobLifecycleError::TransportUnavailable`]
    /// when the prompt cannot be posted, and [`JobLifecycleError::Store`]
    /// when the store rejects the record.
    pub async fn submit(&self, request: SubmitJobRequest) -> JobLifecycleResult<SubmittedJob> {
        let prompt = Prompt::new(request.prompt)?;
        let callback_target = match request
            .callback_target
            .filter(|target| !target.trim().is_empty())
        {
            Some(target) => Some(CallbackTarget::new(target)?),
            None => self.config.default_callback_target.clone(),
        };

        let job = Job::new(prompt, callback_target, &*self.clock);
        let job_id = job.id();
        if let Err(err) = self.store.put(&job).await {
            if matches!(err, JobStoreError::DuplicateKey(_)) {
                error!(job_id = %job_id, "job identifier collision");
            }
            return Err(err.into());
        }

        let command = PostPromptCommand::new(
            self.config.channel_id,
            TaggedPrompt::new(job_id, job.prompt()).to_string(),
        );
        if let Err(err) = self.transport.post_prompt(&command).await {
            warn!(job_id = %job_id, error = %err, "prompt dispatch failed, discarding job");
            if let Err(rollback_err) = self.store.delete(job_id).await {
                error!(job_id = %job_id, error = %rollback_err, "failed to discard undispatched job");
            }
            return Err(JobLifecycleError::TransportUnavailable(err));
        }

        info!(job_id = %job_id, prompt = %job.prompt(), "job submitted");
        Ok(SubmittedJob {
            job_id,
            accepted_message: self.config.accepted_message.clone(),
            estimate: self.config.estimate.clone(),
        })
    }

    /// Returns the current snapshot of a job, or `None` when unknown or
    /// already reclaimed.
    ///
    /// # Errors
    ///
    /// Returns [`JobLifecycleError::Store`] when the lookup fails.
    pub async fn query(&self, job_id: JobId) -> JobLifecycleResult<Option<Job>> {
        Ok(self.store.get(job_id).await?)
    }

    /// Returns the number of jobs currently tracked.
    ///
    /// # Errors
    ///
    /// Returns [`JobLifecycleError::Store`] when the store fails.
    pub async fn tracked_jobs(&self) -> JobLifecycleResult<usize> {
        Ok(self.store.count().await?)
    }

    /// Handles a message from the watched channel.
    ///
    /// Never fails: every problem is logged and reflected in the returned
    /// outcome so that the chat event stream keeps flowing. A job completes
    /// at most once. An event that loses a race for a job moves on to the
    /// next tagged pending job, and a job nobody claims sends nothing.
    pub async fn on_completion_event(&self, event: &CompletionEvent) -> CompletionOutcome {
        let attachment = match self.matcher.qualify(event) {
            Ok(attachment) => attachment,
            Err(reason) => {
                debug!(?reason, author_id = event.author_id, "ignoring channel message");
                return CompletionOutcome::Ignored(reason);
            }
        };

        let result_reference = match ResultReference::new(attachment.url.clone()) {
            Ok(reference) => reference,
            Err(err) => {
                warn!(error = %err, "result attachment has no location");
                return CompletionOutcome::Unmatched;
            }
        };

        let claimed = self
            .matcher
            .claim(event, &*self.store, &result_reference, &*self.clock)
            .await;
        let job = match claimed {
            Ok(Some(job)) => job,
            Ok(None) => {
                info!(image_url = %attachment.url, "no matching job found for image");
                return CompletionOutcome::Unmatched;
            }
            Err(err) => {
                error!(error = %err, "failed to record job completion");
                return CompletionOutcome::StoreFailure;
            }
        };

        let job_id = job.id();
        info!(job_id = %job_id, image_url = %attachment.url, "job completed");
        let notification = self.notify_completion(&job).await;
        CompletionOutcome::Completed {
            job_id,
            notification,
        }
    }

    /// Removes stale pending jobs and grace-expired completed jobs as of
    /// `now`.
    ///
    /// Store failures are logged; the affected half of the report is empty.
    pub async fn run_sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let report = SweepReport {
            stale: self.sweep_for(now, ReclaimReason::Stale).await,
            expired: self.sweep_for(now, ReclaimReason::GraceExpired).await,
        };
        for job_id in &report.stale {
            info!(job_id = %job_id, "cleaned up stale job");
        }
        for job_id in &report.expired {
            debug!(job_id = %job_id, "removed completed job after grace period");
        }
        report
    }

    /// Runs [`Self::run_sweep`] at the clock's current time.
    pub async fn run_sweep_now(&self) -> SweepReport {
        self.run_sweep(self.clock.utc()).await
    }

    async fn sweep_for(&self, now: DateTime<Utc>, reason: ReclaimReason) -> Vec<JobId> {
        let policy = self.config.reclaim;
        self.store
            .sweep(now, move |job, at| policy.reclaim_reason(job, at) == Some(reason))
            .await
            .unwrap_or_else(|err| {
                error!(?reason, error = %err, "job sweep failed");
                Vec::new()
            })
    }

    async fn notify_completion(&self, job: &Job) -> NotificationOutcome {
        let Some(target) = job.callback_target() else {
            return NotificationOutcome::Skipped;
        };
        let Some(notification) = CompletionNotification::for_job(job, self.clock.utc()) else {
            return NotificationOutcome::Skipped;
        };
        match self.notifier.notify(target, &notification).await {
            Ok(()) => {
                info!(job_id = %job.id(), "webhook sent");
                NotificationOutcome::Delivered
            }
            Err(err) => {
                warn!(job_id = %job.id(), target = %target, error = %err, "webhook delivery failed");
                NotificationOutcome::Failed
            }
        }
    }
}
