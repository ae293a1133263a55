//! PostgreSQL job store
//!
//! Handles all database operations related to jobs.

use async_trait::async_trait;
use reel_core::domain::job::{Job, JobStatus};
use sqlx::PgPool;
use uuid::Uuid;

use super::{JobStore, StoreError};

/// Job store backed by the `jobs` table
#[derive(Debug, Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (id, kind, title, file_name, file_size, duration,
                              status, result_location, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(job.id)
        .bind(job.kind.as_str())
        .bind(&job.title)
        .bind(&job.file_name)
        .bind(&job.file_size)
        .bind(&job.duration)
        .bind(job.status.as_str())
        .bind(&job.result_location)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(StoreError::DuplicateId(job.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: JobStatus,
        result_location: Option<String>,
    ) -> Result<u64, StoreError> {
        let result_location = match status {
            JobStatus::Completed if result_location.is_none() => return Ok(0),
            JobStatus::Completed => result_location,
            _ => None,
        };
        let now = chrono::Utc::now();

        // Terminal rows are frozen; the guard lives in the same statement
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $1, result_location = $2, updated_at = $3
            WHERE id = $4 AND status NOT IN ('completed', 'failed')
            "#,
        )
        .bind(status.as_str())
        .bind(result_location)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, kind, title, file_name, file_size, duration,
                   status, result_location, created_at, updated_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Job::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, kind, title, file_name, file_size, duration,
                   status, result_location, created_at, updated_at
            FROM jobs
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Job::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    kind: String,
    title: String,
    file_name: String,
    file_size: Option<String>,
    duration: Option<String>,
    status: String,
    result_location: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = move |reason: String| StoreError::InvalidRecord { id, reason };

        let kind = row.kind.parse().map_err(invalid)?;
        let status = row.status.parse().map_err(invalid)?;

        Ok(Job {
            id: row.id,
            kind,
            title: row.title,
            file_name: row.file_name,
            file_size: row.file_size,
            duration: row.duration,
            status,
            result_location: row.result_location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::domain::job::JobKind;

    fn row(kind: &str, status: &str) -> JobRow {
        let now = chrono::Utc::now();
        JobRow {
            id: Uuid::new_v4(),
            kind: kind.to_string(),
            title: "Video synthesis".to_string(),
            file_name: "synthesized-video-1.mp4".to_string(),
            file_size: Some("15.8 MB".to_string()),
            duration: None,
            status: status.to_string(),
            result_location: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_converts_to_job() {
        let job = Job::try_from(row("synthesize-video", "processing")).unwrap();
        assert_eq!(job.kind, JobKind::SynthesizeVideo);
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.file_size.as_deref(), Some("15.8 MB"));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = Job::try_from(row("extract-audio", "Queued")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord { .. }));
    }
}
