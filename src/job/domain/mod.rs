//! Domain model for prompt jobs.
//!
//! A job is one prompt-submission-to-result lifecycle. The domain covers
//! identifiers, the job record and its single `pending -> completed`
//! transition, the tagging marker used for correlation, the inbound chat
//! event shape, the notification payload and the reclamation policy. No
//! infrastructure concerns live here.

mod error;
mod event;
mod ids;
mod job;
mod marker;
mod notification;
mod policy;

pub use error::{JobDomainError, ParseJobStatusError};
pub use event::{ChannelMessage, CompletionEvent, ImageAttachment};
pub use ids::{CallbackTarget, JobId, Prompt, ResultReference};
pub use job::{Job, JobStatus};
pub use marker::{JOB_TAG_MARKER, TaggedPrompt, extract_job_id};
pub use notification::CompletionNotification;
pub use policy::{DEFAULT_GRACE_PERIOD, DEFAULT_STALE_AFTER, ReclaimPolicy, ReclaimReason};
