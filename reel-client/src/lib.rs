//! Reel Build Server Client
//!
//! HTTP client for the remote build automation server that performs the
//! actual media processing.
//!
//! The orchestrator never talks HTTP directly; it depends on the
//! [`RemoteRunner`] trait so tests can substitute a scripted runner.
//!
//! # Example
//!
//! ```no_run
//! use reel_client::{BuildServerClient, RemoteRunner};
//! use std::collections::BTreeMap;
//!
//! # async fn example() -> reel_client::Result<()> {
//! let client = BuildServerClient::new("http://localhost:8080");
//!
//! let mut params = BTreeMap::new();
//! params.insert("videoUrl".to_string(), "http://media/clip.mp4".to_string());
//!
//! let queue = client.trigger("extract-music", &params).await?;
//! println!("Queued at {}", queue);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod runner;

pub use error::{ClientError, Result};
pub use runner::RemoteRunner;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// HTTP client for a Jenkins-style build server
#[derive(Debug, Clone)]
pub struct BuildServerClient {
    /// Base URL of the build server (e.g., "http://localhost:8080")
    base_url: String,
    /// Basic auth user and API token
    credentials: Option<(String, String)>,
    /// HTTP client instance
    client: Client,
}

impl BuildServerClient {
    /// Create a new build server client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the build server (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            client,
        }
    }

    /// Attach basic auth credentials (user + API token) to every request
    pub fn with_credentials(mut self, user: impl Into<String>, token: impl Into<String>) -> Self {
        self.credentials = Some((user.into(), token.into()));
        self
    }

    /// Get the base URL of the build server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // URL Builders
    // =============================================================================

    /// URL of a job, with folder separators expanded (`a/b` -> `/job/a/job/b`)
    fn job_url(&self, job_name: &str) -> String {
        let path: String = job_name
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| format!("/job/{}", segment))
            .collect();
        format!("{}{}", self.base_url, path)
    }

    fn trigger_url(&self, job_name: &str) -> String {
        format!("{}/buildWithParameters", self.job_url(job_name))
    }

    fn build_url(&self, job_name: &str, build_number: u64) -> String {
        format!("{}/{}/api/json", self.job_url(job_name), build_number)
    }

    fn queue_url(queue_reference: &str) -> String {
        format!("{}/api/json", queue_reference.trim_end_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, token)) => request.basic_auth(user, Some(token)),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
