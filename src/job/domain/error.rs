//! Error types for job domain validation and parsing.

use super::JobId;
use thiserror::Error;

/// Errors returned while constructing or mutating domain job values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobDomainError {
    /// The prompt is empty after trimming.
    #[error("prompt is required")]
    EmptyPrompt,

    /// The callback target is not an absolute `http` or `https` URL.
    #[error("invalid callback target '{0}', expected an absolute http(s) URL")]
    InvalidCallbackTarget(String),

    /// The value is not a job identifier issued by this service.
    #[error("invalid job identifier '{0}'")]
    InvalidJobId(String),

    /// The result reference is empty after trimming.
    #[error("result reference must not be empty")]
    EmptyResultReference,

    /// The job already reached the completed state.
    #[error("job {0} is already completed")]
    AlreadyCompleted(JobId),

    /// A reclaim threshold cannot be represented as a time delta.
    #[error("reclaim threshold out of range: {0:?}")]
    ReclaimThresholdOutOfRange(std::time::Duration),
}

/// Error returned while parsing job statuses from their textual form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown job status: {0}")]
pub struct ParseJobStatusError(pub String);
