//! Test doubles shared by the orchestrator's unit tests

use async_trait::async_trait;
use reel_client::{ClientError, RemoteRunner};
use reel_core::domain::execution::QueueReference;
use reel_core::domain::job::{Job, JobStatus};
use reel_core::dto::runner::{BuildStatus, QueueItem};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::repository::{InMemoryJobStore, JobStore, StoreError};

/// Canned answer to a queue or build query
pub enum Reply<T> {
    Ok(T),
    /// Server answered with this HTTP status
    Fail(u16),
}

impl<T> Reply<T> {
    fn into_result(self) -> reel_client::Result<T> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Fail(status) => Err(ClientError::api_error(status, "scripted failure")),
        }
    }
}

/// Canned answer to a trigger
pub enum TriggerReply {
    Queued(String),
    Rejected(u16),
    NoLocation,
}

/// Remote runner that replays scripted replies and records every call
///
/// Once a script runs dry, triggers are queued, queue items keep waiting
/// and builds keep running.
#[derive(Default)]
pub struct ScriptedRunner {
    trigger_replies: Mutex<VecDeque<TriggerReply>>,
    queue_replies: Mutex<VecDeque<Reply<QueueItem>>>,
    build_replies: Mutex<VecDeque<Reply<BuildStatus>>>,
    triggers: Mutex<Vec<(String, BTreeMap<String, String>)>>,
    queue_polls: Mutex<Vec<QueueReference>>,
    build_polls: Mutex<Vec<(String, u64)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_triggers(&self, replies: impl IntoIterator<Item = TriggerReply>) {
        self.trigger_replies.lock().unwrap().extend(replies);
    }

    pub fn script_queue(&self, replies: impl IntoIterator<Item = Reply<QueueItem>>) {
        self.queue_replies.lock().unwrap().extend(replies);
    }

    pub fn script_builds(&self, replies: impl IntoIterator<Item = Reply<BuildStatus>>) {
        self.build_replies.lock().unwrap().extend(replies);
    }

    pub fn triggers(&self) -> Vec<(String, BTreeMap<String, String>)> {
        self.triggers.lock().unwrap().clone()
    }

    pub fn queue_calls(&self) -> usize {
        self.queue_polls.lock().unwrap().len()
    }

    pub fn polled_queues(&self) -> Vec<QueueReference> {
        self.queue_polls.lock().unwrap().clone()
    }

    pub fn build_calls(&self) -> usize {
        self.build_polls.lock().unwrap().len()
    }

    pub fn polled_builds(&self) -> Vec<(String, u64)> {
        self.build_polls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteRunner for ScriptedRunner {
    async fn trigger(
        &self,
        job_name: &str,
        parameters: &BTreeMap<String, String>,
    ) -> reel_client::Result<QueueReference> {
        let count = {
            let mut triggers = self.triggers.lock().unwrap();
            triggers.push((job_name.to_string(), parameters.clone()));
            triggers.len()
        };

        let reply = self.trigger_replies.lock().unwrap().pop_front();
        match reply {
            Some(TriggerReply::Queued(location)) => Ok(QueueReference::new(location)),
            Some(TriggerReply::Rejected(status)) => Err(ClientError::TriggerRejected { status }),
            Some(TriggerReply::NoLocation) => Err(ClientError::MissingQueueLocation),
            None => Ok(QueueReference::new(format!(
                "http://ci/queue/item/{}/",
                count
            ))),
        }
    }

    async fn queue_item(&self, queue: &QueueReference) -> reel_client::Result<QueueItem> {
        self.queue_polls.lock().unwrap().push(queue.clone());
        let reply = self.queue_replies.lock().unwrap().pop_front();
        reply.map_or(Ok(QueueItem::waiting()), Reply::into_result)
    }

    async fn build_status(
        &self,
        job_name: &str,
        build_number: u64,
    ) -> reel_client::Result<BuildStatus> {
        self.build_polls
            .lock()
            .unwrap()
            .push((job_name.to_string(), build_number));
        let reply = self.build_replies.lock().unwrap().pop_front();
        reply.map_or(Ok(BuildStatus::running()), Reply::into_result)
    }
}

/// One `update_status` call seen by a [`RecordingStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpdate {
    pub id: Uuid,
    pub status: JobStatus,
    pub result_location: Option<String>,
    pub affected: Option<u64>,
}

/// In-memory store that records status updates and can be told to fail
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryJobStore,
    updates: Mutex<Vec<RecordedUpdate>>,
    creates: Mutex<Vec<Uuid>>,
    fail_creates: AtomicBool,
    fail_updates: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_creates(&self) {
        self.fail_creates.store(true, Ordering::SeqCst);
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    pub fn creates(&self) -> Vec<Uuid> {
        self.creates.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Waits (on the tokio clock) until `count` updates have been recorded
    pub async fn wait_for_updates(&self, count: usize) -> Vec<RecordedUpdate> {
        for _ in 0..100_000 {
            let updates = self.updates();
            if updates.len() >= count {
                return updates;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("expected {} status update(s), saw {:?}", count, self.updates());
    }
}

#[async_trait]
impl JobStore for RecordingStore {
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.inner.create(job).await?;
        self.creates.lock().unwrap().push(job.id);
        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: JobStatus,
        result_location: Option<String>,
    ) -> Result<u64, StoreError> {
        let result = if self.fail_updates.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            self.inner
                .update_status(id, status, result_location.clone())
                .await
        };

        self.updates.lock().unwrap().push(RecordedUpdate {
            id,
            status,
            result_location,
            affected: result.as_ref().ok().copied(),
        });
        result
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        self.inner.get(id).await
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        self.inner.list().await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.inner.delete(id).await
    }
}
