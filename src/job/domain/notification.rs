//! Completion notification payload posted to callback targets.

use super::{Job, JobId, JobStatus};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Body of the webhook sent when a job completes.
///
/// Serialises as `{jobId, prompt, imageUrl, status, timestamp}` with a
/// millisecond-precision RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionNotification {
    job_id: JobId,
    prompt: String,
    image_url: String,
    status: JobStatus,
    #[serde(serialize_with = "serialize_millis")]
    timestamp: DateTime<Utc>,
}

impl CompletionNotification {
    /// Builds the payload for a completed job.
    ///
    /// Returns `None` while the job has no result.
    #[must_use]
    pub fn for_job(job: &Job, timestamp: DateTime<Utc>) -> Option<Self> {
        let result = job.result_reference()?;
        Some(Self {
            job_id: job.id(),
            prompt: job.prompt().as_str().to_owned(),
            image_url: result.as_str().to_owned(),
            status: job.status(),
            timestamp,
        })
    }

    /// Returns the completed job identifier.
    #[must_use]
    pub const fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Returns the prompt.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the result image location.
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Returns the reported status.
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        self.status
    }

    /// Returns the notification timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

fn serialize_millis<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
