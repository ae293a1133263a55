//! Job Service
//!
//! Owns the lifecycle of a media job: record it, hand it to the build server,
//! follow the build to its result and write the final status.

use reel_client::RemoteRunner;
use reel_core::domain::execution::BuildOutcome;
use reel_core::domain::job::{Job, JobKind, JobStatus};
use reel_core::dto::job::SubmitJob;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::error::{ExecutionError, SubmitError};
use crate::repository::{JobStore, StoreError};
use crate::scheduler::{ExecutionResolver, PollSettings, StatusPoller};

/// Trigger parameter carrying the job id
pub const JOB_ID_PARAM: &str = "JOB_ID";
/// Trigger parameter that keeps otherwise identical triggers distinct
pub const NONCE_PARAM: &str = "NONCE";

/// Tunables for [`JobOrchestrator`]
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Build server job running audio extraction
    pub extract_job_name: String,
    /// Build server job running video synthesis
    pub synthesize_job_name: String,
    /// Prefix of result locations; the artifact file name is appended
    pub artifact_base_url: String,
    pub resolve: PollSettings,
    pub poll: PollSettings,
}

impl OrchestratorSettings {
    /// Build server job that handles `kind`
    pub fn job_name(&self, kind: JobKind) -> &str {
        match kind {
            JobKind::ExtractAudio => &self.extract_job_name,
            JobKind::SynthesizeVideo => &self.synthesize_job_name,
        }
    }

    /// Where the artifact named `file_name` can be fetched once produced
    pub fn result_location(&self, file_name: &str) -> String {
        format!("{}/{}", self.artifact_base_url.trim_end_matches('/'), file_name)
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            extract_job_name: "extract-music".to_string(),
            synthesize_job_name: "synthesize-video".to_string(),
            artifact_base_url: "http://localhost:3000/downloads".to_string(),
            resolve: PollSettings::resolver_default(),
            poll: PollSettings::poller_default(),
        }
    }
}

/// Submits media jobs to the build server and tracks them to completion
///
/// Cloning is cheap; every clone shares the same store and runner.
#[derive(Clone)]
pub struct JobOrchestrator {
    store: Arc<dyn JobStore>,
    runner: Arc<dyn RemoteRunner>,
    resolver: ExecutionResolver,
    poller: StatusPoller,
    settings: Arc<OrchestratorSettings>,
}

impl JobOrchestrator {
    pub fn new(
        store: Arc<dyn JobStore>,
        runner: Arc<dyn RemoteRunner>,
        settings: OrchestratorSettings,
    ) -> Self {
        let resolver = ExecutionResolver::new(Arc::clone(&runner), settings.resolve);
        let poller = StatusPoller::new(Arc::clone(&runner), settings.poll);
        Self {
            store,
            runner,
            resolver,
            poller,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Records a new job and starts its remote execution in the background
    ///
    /// Returns once the job is stored as `processing`; the outcome is only
    /// observable later through [`JobOrchestrator::get_job`].
    pub async fn submit(&self, req: SubmitJob) -> Result<Job, SubmitError> {
        let missing = req.missing_parameters();
        if !missing.is_empty() {
            return Err(SubmitError::InvalidRequest(format!(
                "{} job requires: {}",
                req.kind,
                missing.join(", ")
            )));
        }

        let job = new_job(&req);
        self.store.create(&job).await?;

        info!("Job created: {} ({})", job.id, job.kind);

        let parameters = trigger_parameters(job.id, req.parameters);
        let span = info_span!("job", id = %job.id, kind = %job.kind);
        tokio::spawn(self.clone().run(job.clone(), parameters).instrument(span));

        Ok(job)
    }

    /// Get a job by ID
    pub async fn get_job(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        self.store.get(id).await
    }

    /// List all jobs, most recently created first
    pub async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        self.store.list().await
    }

    /// Delete a job record
    ///
    /// A build still in flight for the job is left alone; its result is
    /// discarded when it arrives.
    pub async fn delete_job(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            info!("Job {} deleted", id);
        }
        Ok(deleted)
    }

    // =============================================================================
    // Background Execution
    // =============================================================================

    async fn run(self, job: Job, parameters: BTreeMap<String, String>) {
        let (status, result_location) = match self.execute(job.kind, &parameters).await {
            Ok(outcome) if outcome.is_success() => (
                JobStatus::Completed,
                Some(self.settings.result_location(&job.file_name)),
            ),
            Ok(outcome) => {
                warn!("Build finished with {}", outcome);
                (outcome.job_status(), None)
            }
            Err(e) => {
                error!("Execution failed: {}", e);
                (JobStatus::Failed, None)
            }
        };

        self.finalize(job.id, status, result_location).await;
    }

    /// Trigger, resolve and poll, strictly in that order
    async fn execute(
        &self,
        kind: JobKind,
        parameters: &BTreeMap<String, String>,
    ) -> Result<BuildOutcome, ExecutionError> {
        let job_name = self.settings.job_name(kind);

        let queue = self
            .runner
            .trigger(job_name, parameters)
            .await
            .map_err(ExecutionError::TriggerFailed)?;
        info!("Triggered {} (queue item {})", job_name, queue);

        let handle = self.resolver.resolve(job_name, queue).await?;
        self.poller.poll_until_done(&handle).await
    }

    /// Single terminal write. Failures here are logged, never retried.
    async fn finalize(&self, id: Uuid, status: JobStatus, result_location: Option<String>) {
        match self.store.update_status(id, status, result_location).await {
            Ok(0) => warn!("Job {} gone or already terminal, discarding {} result", id, status),
            Ok(_) => info!("Job {} {}", id, status),
            Err(e) => error!("Failed to record {} for job {}, left processing: {}", status, id, e),
        }
    }
}

fn new_job(req: &SubmitJob) -> Job {
    let id = req.id.unwrap_or_else(Uuid::new_v4);
    let title = req
        .title
        .clone()
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| req.kind.default_title().to_string());
    let now = chrono::Utc::now();
    let file_name = req.kind.artifact_file_name(now.timestamp_millis());

    let mut job = Job::new(id, req.kind, title, file_name);
    job.file_size = req.file_size.clone();
    job.duration = req.duration.clone();
    job.transition(JobStatus::Processing, None, job.created_at);
    job
}

/// Caller parameters plus the job id and a fresh nonce
fn trigger_parameters(
    job_id: Uuid,
    parameters: impl IntoIterator<Item = (String, String)>,
) -> BTreeMap<String, String> {
    let mut params: BTreeMap<String, String> = parameters.into_iter().collect();
    params.insert(JOB_ID_PARAM.to_string(), job_id.to_string());
    params.insert(NONCE_PARAM.to_string(), Uuid::new_v4().simple().to_string());
    params
}
