//! Repository Module
//!
//! Durable job records. The orchestrator only sees the [`JobStore`] trait;
//! [`PgJobStore`] backs production and [`InMemoryJobStore`] backs tests and
//! database-less runs.

mod memory;
mod postgres;

pub use memory::InMemoryJobStore;
pub use postgres::PgJobStore;

use async_trait::async_trait;
use reel_core::domain::job::{Job, JobStatus};
use thiserror::Error;
use uuid::Uuid;

/// Job store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Job {0} already exists")]
    DuplicateId(Uuid),

    #[error("Job store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored job {id} is invalid: {reason}")]
    InvalidRecord { id: Uuid, reason: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Durable record of submitted jobs
///
/// Implementations must tolerate concurrent calls from independent job
/// tasks; atomicity is only required per job id.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persists a new job. Fails with [`StoreError::DuplicateId`] if the id exists.
    async fn create(&self, job: &Job) -> Result<(), StoreError>;

    /// Moves a non-terminal job to `status`
    ///
    /// # Returns
    /// The number of records changed. `0` means the job is gone or already
    /// terminal, or a completion arrived without a result location; none of
    /// that is an error.
    async fn update_status(
        &self,
        id: Uuid,
        status: JobStatus,
        result_location: Option<String>,
    ) -> Result<u64, StoreError>;

    /// Finds a job by id
    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError>;

    /// Lists all jobs, most recently created first
    async fn list(&self) -> Result<Vec<Job>, StoreError>;

    /// Deletes a job, returning whether it existed
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
