//! Store port for job records.

use crate::job::domain::{Job, JobId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for job store operations.
pub type JobStoreResult<T> = Result<T, JobStoreError>;

/// Keyed registry that exclusively owns job records.
///
/// Callers only ever receive clones of stored records. Mutations run under
/// exclusive access, so a `sweep` never removes a record while an `update` is
/// applying its mutator.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Inserts a new job.
    ///
    /// # Errors
    ///
    /// Returns [`JobStoreError::DuplicateKey`] when the identifier is already
    /// present.
    async fn put(&self, job: &Job) -> JobStoreResult<()>;

    /// Returns a snapshot of the job, or `None` when absent.
    async fn get(&self, id: JobId) -> JobStoreResult<Option<Job>>;

    /// Applies `mutator` to the stored job under exclusive access and returns
    /// its output.
    ///
    /// # Errors
    ///
    /// Returns [`JobStoreError::NotFound`] when the job does not exist.
    async fn update<F, T>(&self, id: JobId, mutator: F) -> JobStoreResult<T>
    where
        F: FnOnce(&mut Job) -> T + Send,
        T: Send;

    /// Removes the job. Returns `false` when it was already absent.
    async fn delete(&self, id: JobId) -> JobStoreResult<bool>;

    /// Removes every job for which `predicate(job, now)` holds and returns
    /// the removed identifiers in ascending (creation) order.
    async fn sweep<P>(&self, now: DateTime<Utc>, predicate: P) -> JobStoreResult<Vec<JobId>>
    where
        P: Fn(&Job, DateTime<Utc>) -> bool + Send;

    /// Returns the number of stored jobs.
    async fn count(&self) -> JobStoreResult<usize>;
}

/// Errors returned by job store implementations.
#[derive(Debug, Clone, Error)]
pub enum JobStoreError {
    /// A job with the same identifier already exists.
    #[error("duplicate job identifier: {0}")]
    DuplicateKey(JobId),

    /// The job was not found.
    #[error("job not found: {0}")]
    NotFound(JobId),

    /// Storage-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl JobStoreError {
    /// Wraps a storage-layer error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
