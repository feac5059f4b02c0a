//! Tagging marker embedded in dispatched prompt messages.
//!
//! The generation service never echoes a correlation field, so the job
//! identifier travels inside the message text as `--job-id <id>` and is read
//! back out of channel history.

use super::{JobId, Prompt};
use std::fmt;

/// Marker preceding the job identifier in a dispatched prompt.
pub const JOB_TAG_MARKER: &str = "--job-id";

const PROMPT_COMMAND: &str = "/imagine prompt:";

/// Prompt message text carrying the tagging marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedPrompt<'a> {
    job_id: JobId,
    prompt: &'a Prompt,
}

impl<'a> TaggedPrompt<'a> {
    /// Tags a prompt with its job identifier.
    #[must_use]
    pub const fn new(job_id: JobId, prompt: &'a Prompt) -> Self {
        Self { job_id, prompt }
    }
}

impl fmt::Display for TaggedPrompt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PROMPT_COMMAND}{} {JOB_TAG_MARKER} {}",
            self.prompt, self.job_id
        )
    }
}

/// Extracts the job identifier tagged in `text`.
///
/// The last well-formed marker wins: the service appends its marker after the
/// caller's prompt, so a marker typed into the prompt itself cannot shadow
/// the real one.
#[must_use]
pub fn extract_job_id(text: &str) -> Option<JobId> {
    text.rmatch_indices(JOB_TAG_MARKER).find_map(|(index, _)| {
        let rest = text.get(index + JOB_TAG_MARKER.len()..)?;
        let candidate = rest
            .trim_start()
            .split(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
            .next()?;
        JobId::parse(candidate).ok()
    })
}
