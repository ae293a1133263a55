//! Remote runner operations
//!
//! Trigger a parameterized build, follow its queue item, and read the
//! build's status.

use async_trait::async_trait;
use reel_core::domain::execution::QueueReference;
use reel_core::dto::runner::{BuildStatus, QueueItem};
use reqwest::header::LOCATION;
use std::collections::BTreeMap;
use tracing::debug;

use crate::BuildServerClient;
use crate::error::{ClientError, Result};

/// Operations the orchestrator needs from the remote build server
#[async_trait]
pub trait RemoteRunner: Send + Sync {
    /// Queues a build of `job_name` with the given parameters
    ///
    /// # Returns
    /// The queue reference to follow with [`RemoteRunner::queue_item`]
    async fn trigger(
        &self,
        job_name: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<QueueReference>;

    /// Fetches the current state of a queued build request
    async fn queue_item(&self, queue: &QueueReference) -> Result<QueueItem>;

    /// Fetches the status of a build
    async fn build_status(&self, job_name: &str, build_number: u64) -> Result<BuildStatus>;
}

#[async_trait]
impl RemoteRunner for BuildServerClient {
    async fn trigger(
        &self,
        job_name: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<QueueReference> {
        let url = self.trigger_url(job_name);
        debug!("Triggering {} with {} parameter(s)", job_name, parameters.len());

        let response = self
            .authorize(self.client.post(&url))
            .query(parameters)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::TriggerRejected {
                status: status.as_u16(),
            });
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ClientError::MissingQueueLocation)?;

        Ok(QueueReference::new(location))
    }

    async fn queue_item(&self, queue: &QueueReference) -> Result<QueueItem> {
        let url = Self::queue_url(queue.as_str());
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    async fn build_status(&self, job_name: &str, build_number: u64) -> Result<BuildStatus> {
        let url = self.build_url(job_name, build_number);
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }
}
