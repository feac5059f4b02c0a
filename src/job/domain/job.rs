//! Job aggregate root and its lifecycle status.

use super::{CallbackTarget, JobDomainError, JobId, ParseJobStatusError, Prompt, ResultReference};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Job lifecycle status.
///
/// The only permitted transition is `Pending -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// The prompt was dispatched and no result has been correlated yet.
    Pending,
    /// A result was correlated to the job.
    Completed,
}

impl JobStatus {
    /// Returns the canonical textual representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for JobStatus {
    type Error = ParseJobStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseJobStatusError(value.to_owned())),
        }
    }
}

/// Job aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    prompt: Prompt,
    callback_target: Option<CallbackTarget>,
    created_at: DateTime<Utc>,
    status: JobStatus,
    result_reference: Option<ResultReference>,
    completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Creates a pending job with a freshly issued identifier.
    ///
    /// The identifier and `created_at` share one clock reading.
    #[must_use]
    pub fn new(prompt: Prompt, callback_target: Option<CallbackTarget>, clock: &impl Clock) -> Self {
        let created_at = clock.utc();
        Self {
            id: JobId::issued_at(created_at),
            prompt,
            callback_target,
            created_at,
            status: JobStatus::Pending,
            result_reference: None,
            completed_at: None,
        }
    }

    /// Returns the job identifier.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Returns the submitted prompt.
    #[must_use]
    pub const fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    /// Returns the notification target, if any.
    #[must_use]
    pub const fn callback_target(&self) -> Option<&CallbackTarget> {
        self.callback_target.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        self.status
    }

    /// Returns `true` while no result has been correlated.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, JobStatus::Pending)
    }

    /// Returns the correlated result, once completed.
    #[must_use]
    pub const fn result_reference(&self) -> Option<&ResultReference> {
        self.result_reference.as_ref()
    }

    /// Returns the completion timestamp, once completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Marks the job completed with the given result.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::AlreadyCompleted`] when the job was already
    /// completed; the stored result is left untouched.
    pub fn complete(
        &mut self,
        result_reference: ResultReference,
        clock: &impl Clock,
    ) -> Result<(), JobDomainError> {
        if !self.is_pending() {
            return Err(JobDomainError::AlreadyCompleted(self.id));
        }
        self.status = JobStatus::Completed;
        self.result_reference = Some(result_reference);
        self.completed_at = Some(clock.utc());
        Ok(())
    }
}
