//! Application services for the job lifecycle.

mod correlation;
mod lifecycle;
mod reaper;

pub use correlation::{
    CandidateRejection, CorrelationMatcher, DEFAULT_GENERATION_AUTHOR_ID, DEFAULT_HISTORY_WINDOW,
    MatcherConfig,
};
pub use lifecycle::{
    CompletionOutcome, DEFAULT_ACCEPTED_MESSAGE, DEFAULT_ESTIMATE, JobLifecycleError,
    JobLifecycleResult, JobLifecycleService, LifecycleConfig, NotificationOutcome,
    SubmitJobRequest, SubmittedJob, SweepReport,
};
pub use reaper::{DEFAULT_SWEEP_INTERVAL, spawn_reaper};
