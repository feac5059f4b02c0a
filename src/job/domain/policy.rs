//! Reclamation rules for abandoned and finished jobs.

use super::{Job, JobDomainError, JobStatus};
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Default age after which a pending job is considered abandoned.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30 * 60);

/// Default time a completed job stays queryable.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Why a job record was reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReclaimReason {
    /// Still pending past the staleness threshold.
    Stale,
    /// Completed and past the grace period.
    GraceExpired,
}

/// Thresholds deciding when job records are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReclaimPolicy {
    stale_after: TimeDelta,
    grace_period: TimeDelta,
}

impl ReclaimPolicy {
    /// Creates a policy from standard durations.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::ReclaimThresholdOutOfRange`] when a duration
    /// exceeds the range of [`TimeDelta`].
    pub fn new(stale_after: Duration, grace_period: Duration) -> Result<Self, JobDomainError> {
        let to_delta = |value: Duration| {
            TimeDelta::from_std(value).map_err(|_| JobDomainError::ReclaimThresholdOutOfRange(value))
        };
        Ok(Self {
            stale_after: to_delta(stale_after)?,
            grace_period: to_delta(grace_period)?,
        })
    }

    /// Returns the staleness threshold for pending jobs.
    #[must_use]
    pub const fn stale_after(&self) -> TimeDelta {
        self.stale_after
    }

    /// Returns the grace period for completed jobs.
    #[must_use]
    pub const fn grace_period(&self) -> TimeDelta {
        self.grace_period
    }

    /// Returns why `job` should be reclaimed at `now`, if it should.
    ///
    /// Pending jobs are reclaimed strictly after `stale_after` has elapsed
    /// since creation; completed jobs once `grace_period` has elapsed since
    /// completion.
    #[must_use]
    pub fn reclaim_reason(&self, job: &Job, now: DateTime<Utc>) -> Option<ReclaimReason> {
        match job.status() {
            JobStatus::Pending => {
                (now - job.created_at() > self.stale_after).then_some(ReclaimReason::Stale)
            }
            JobStatus::Completed => job
                .completed_at()
                .filter(|completed_at| now - *completed_at >= self.grace_period)
                .map(|_| ReclaimReason::GraceExpired),
        }
    }
}

impl Default for ReclaimPolicy {
    fn default() -> Self {
        Self {
            stale_after: TimeDelta::minutes(30),
            grace_period: TimeDelta::hours(1),
        }
    }
}
