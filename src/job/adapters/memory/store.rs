//! In-memory job store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::job::{
    domain::{Job, JobId},
    ports::{JobStore, JobStoreError, JobStoreResult},
};

/// Thread-safe in-memory job store.
///
/// A single [`RwLock`] guards the map: lookups share the read lock while
/// every mutation, sweeps included, takes the write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobStore {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
}

impl InMemoryJobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> JobStoreError {
    JobStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put(&self, job: &Job) -> JobStoreResult<()> {
        let mut jobs = self.jobs.write().map_err(lock_error)?;
        if jobs.contains_key(&job.id()) {
            return Err(JobStoreError::DuplicateKey(job.id()));
        }
        jobs.insert(job.id(), job.clone());
        Ok(())
    }

    async fn get(&self, id: JobId) -> JobStoreResult<Option<Job>> {
        let jobs = self.jobs.read().map_err(lock_error)?;
        Ok(jobs.get(&id).cloned())
    }

    async fn update<F, T>(&self, id: JobId, mutator: F) -> JobStoreResult<T>
    where
        F: FnOnce(&mut Job) -> T + Send,
        T: Send,
    {
        let mut jobs = self.jobs.write().map_err(lock_error)?;
        let job = jobs.get_mut(&id).ok_or(JobStoreError::NotFound(id))?;
        Ok(mutator(job))
    }

    async fn delete(&self, id: JobId) -> JobStoreResult<bool> {
        let mut jobs = self.jobs.write().map_err(lock_error)?;
        Ok(jobs.remove(&id).is_some())
    }

    async fn sweep<P>(&self, now: DateTime<Utc>, predicate: P) -> JobStoreResult<Vec<JobId>>
    where
        P: Fn(&Job, DateTime<Utc>) -> bool + Send,
    {
        let mut jobs = self.jobs.write().map_err(lock_error)?;
        let mut removed: Vec<JobId> = jobs
            .values()
            .filter(|job| predicate(job, now))
            .map(Job::id)
            .collect();
        removed.sort_unstable();
        for id in &removed {
            jobs.remove(id);
        }
        Ok(removed)
    }

    async fn count(&self) -> JobStoreResult<usize> {
        let jobs = self.jobs.read().map_err(lock_error)?;
        Ok(jobs.len())
    }
}
