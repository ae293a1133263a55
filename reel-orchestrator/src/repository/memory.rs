//! In-memory job store

use async_trait::async_trait;
use reel_core::domain::job::{Job, JobStatus};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{JobStore, StoreError};

/// Job store held in process memory
///
/// Records are lost on restart. Each record keeps its insertion sequence so
/// jobs created within the same clock tick still list newest first.
#[derive(Default)]
pub struct InMemoryJobStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    jobs: HashMap<Uuid, (u64, Job)>,
    next_seq: u64,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if inner.jobs.contains_key(&job.id) {
            return Err(StoreError::DuplicateId(job.id));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.jobs.insert(job.id, (seq, job.clone()));

        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: JobStatus,
        result_location: Option<String>,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;

        let Some((_, job)) = inner.jobs.get_mut(&id) else {
            return Ok(0);
        };

        let changed = job.transition(status, result_location, chrono::Utc::now());
        Ok(u64::from(changed))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.jobs.get(&id).map(|(_, job)| job.clone()))
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        let inner = self.inner.read().await;

        let mut entries: Vec<&(u64, Job)> = inner.jobs.values().collect();
        entries.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_seq.cmp(a_seq))
        });

        Ok(entries.into_iter().map(|(_, job)| job.clone()).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.jobs.remove(&id).is_some())
    }
}
