//! Correlation of result images back to the jobs that requested them.
//!
//! The generation service posts its results into the shared channel without
//! any correlation field. A result is attributed by walking the channel
//! history backwards to the nearest tagged prompt whose job is still pending.
//! This is a heuristic over conversational context, not a protocol guarantee.

use crate::job::{
    domain::{
        ChannelMessage, CompletionEvent, ImageAttachment, Job, JobId, ResultReference,
        extract_job_id,
    },
    ports::{JobStore, JobStoreError, JobStoreResult},
};
use mockable::Clock;
use tracing::debug;

/// Platform identity of the Midjourney bot.
pub const DEFAULT_GENERATION_AUTHOR_ID: u64 = 936_929_561_302_675_456;

/// Default number of prior channel messages examined per event.
pub const DEFAULT_HISTORY_WINDOW: usize = 50;

/// Tunables for completion candidate qualification and history scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherConfig {
    generation_author_id: u64,
    accepted_media_types: Vec<String>,
    accepted_extensions: Vec<String>,
    in_progress_markers: Vec<String>,
    history_window: usize,
}

impl MatcherConfig {
    /// Creates a configuration for the given generation-service identity
    /// with default image formats, progress markers and window.
    #[must_use]
    pub fn new(generation_author_id: u64) -> Self {
        Self {
            generation_author_id,
            accepted_media_types: ["image/png", "image/jpeg", "image/webp"]
                .map(str::to_owned)
                .to_vec(),
            accepted_extensions: [".png", ".jpg", ".jpeg", ".webp"]
                .map(str::to_owned)
                .to_vec(),
            in_progress_markers: ["(Waiting to start)", "(Stopped)"]
                .map(str::to_owned)
                .to_vec(),
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Replaces the accepted media types (compared case-insensitively).
    #[must_use]
    pub fn with_accepted_media_types(mut self, media_types: impl IntoIterator<Item = String>) -> Self {
        self.accepted_media_types = media_types
            .into_iter()
            .map(|media_type| media_type.to_ascii_lowercase())
            .collect();
        self
    }

    /// Replaces the texts that mark a message as an intermediate render.
    #[must_use]
    pub fn with_in_progress_markers(mut self, markers: impl IntoIterator<Item = String>) -> Self {
        self.in_progress_markers = markers.into_iter().collect();
        self
    }

    /// Sets how many prior messages are scanned.
    #[must_use]
    pub const fn with_history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window;
        self
    }

    /// Returns the generation-service identity.
    #[must_use]
    pub const fn generation_author_id(&self) -> u64 {
        self.generation_author_id
    }

    /// Returns the history scan bound.
    #[must_use]
    pub const fn history_window(&self) -> usize {
        self.history_window
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GENERATION_AUTHOR_ID)
    }
}

/// Why an event was not treated as a completion candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateRejection {
    /// The author is not the generation service.
    ForeignAuthor,
    /// The event carries no attachment.
    MissingAttachment,
    /// The attachment is not an accepted image format.
    UnsupportedMediaType,
    /// The text marks an intermediate render.
    InProgress,
}

/// Matches completion events to pending jobs.
#[derive(Debug, Clone, Default)]
pub struct CorrelationMatcher {
    config: MatcherConfig,
}

impl CorrelationMatcher {
    /// Creates a matcher.
    #[must_use]
    pub const fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Returns the matcher configuration.
    #[must_use]
    pub const fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Checks whether `event` can complete a job and returns its image.
    ///
    /// # Errors
    ///
    /// Returns the first [`CandidateRejection`] that applies.
    pub fn qualify<'a>(
        &self,
        event: &'a CompletionEvent,
    ) -> Result<&'a ImageAttachment, CandidateRejection> {
        if event.author_id != self.config.generation_author_id {
            return Err(CandidateRejection::ForeignAuthor);
        }
        let attachment = event
            .attachment
            .as_ref()
            .ok_or(CandidateRejection::MissingAttachment)?;
        if !self.is_accepted_image(attachment) {
            return Err(CandidateRejection::UnsupportedMediaType);
        }
        if self.is_in_progress(&event.text) {
            return Err(CandidateRejection::InProgress);
        }
        Ok(attachment)
    }

    /// Yields tagged job identifiers in scan order.
    ///
    /// The event's own text comes first (the generation service echoes the
    /// prompt, marker included, in its result message), followed by at most
    /// `history_window` prior messages, most recent first.
    pub fn tagged_job_ids<'a>(
        &'a self,
        event: &'a CompletionEvent,
    ) -> impl Iterator<Item = JobId> + 'a {
        std::iter::once(event.text.as_str())
            .chain(
                event
                    .recent_channel_history
                    .iter()
                    .take(self.config.history_window)
                    .map(|message: &ChannelMessage| message.text.as_str()),
            )
            .filter_map(extract_job_id)
    }

    /// Completes the nearest pending job that `event` answers.
    ///
    /// Each tagged identifier is claimed with a single store update, so the
    /// pending check and the transition happen under the same lock. Tags of
    /// unknown jobs, and of jobs completed by an earlier or concurrent event,
    /// are skipped. Returns the completed snapshot, or `Ok(None)` when the
    /// window is exhausted.
    ///
    /// # Errors
    ///
    /// Propagates store failures other than a missing record.
    pub async fn claim<S, C>(
        &self,
        event: &CompletionEvent,
        store: &S,
        result_reference: &ResultReference,
        clock: &C,
    ) -> JobStoreResult<Option<Job>>
    where
        S: JobStore,
        C: Clock + Sync,
    {
        for job_id in self.tagged_job_ids(event) {
            let reference = result_reference.clone();
            let claimed = store
                .update(job_id, move |job| {
                    job.complete(reference, clock).map(|()| job.clone())
                })
                .await;
            match claimed {
                Ok(Ok(job)) => return Ok(Some(job)),
                Ok(Err(_)) => debug!(job_id = %job_id, "skipping tag of already completed job"),
                Err(JobStoreError::NotFound(_)) => {
                    debug!(job_id = %job_id, "skipping tag of unknown job");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }

    fn is_accepted_image(&self, attachment: &ImageAttachment) -> bool {
        match attachment.media_type.as_deref() {
            Some(media_type) => {
                let essence = media_type
                    .split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase();
                self.config
                    .accepted_media_types
                    .iter()
                    .any(|accepted| *accepted == essence)
            }
            None => {
                let path = attachment
                    .url
                    .split(['?', '#'])
                    .next()
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                self.config
                    .accepted_extensions
                    .iter()
                    .any(|extension| path.ends_with(extension.as_str()))
            }
        }
    }

    fn is_in_progress(&self, text: &str) -> bool {
        self.config
            .in_progress_markers
            .iter()
            .any(|marker| text.contains(marker.as_str()))
            || contains_progress_percentage(text)
    }
}

/// Detects render progress such as `(42%)` in a message.
fn contains_progress_percentage(text: &str) -> bool {
    text.match_indices('(').any(|(index, _)| {
        let Some(rest) = text.get(index + 1..) else {
            return false;
        };
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        digits > 0 && rest.get(digits..).is_some_and(|tail| tail.starts_with("%)"))
    })
}
