//! Orchestrator configuration
//!
//! Defines all configurable parameters for the orchestrator including the
//! build server connection, job names on the server, and polling bounds.

use std::path::PathBuf;
use std::time::Duration;

use crate::scheduler::PollSettings;
use crate::service::OrchestratorSettings;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API binds to
    pub bind_addr: String,

    /// PostgreSQL URL; jobs are kept in memory when unset
    pub database_url: Option<String>,

    /// Build server base URL (e.g., "http://localhost:8080")
    pub runner_url: String,

    /// Build server user for basic auth
    pub runner_user: Option<String>,

    /// Build server API token for basic auth
    pub runner_api_token: Option<String>,

    /// Timeout applied to every request sent to the build server
    pub runner_request_timeout: Duration,

    /// Build server job running audio extraction
    pub extract_job_name: String,

    /// Build server job running video synthesis
    pub synthesize_job_name: String,

    /// Base URL under which produced artifacts are served
    pub artifact_base_url: String,

    /// Directory served under `/downloads`
    pub downloads_dir: PathBuf,

    /// Wait between queue checks
    pub resolve_interval: Duration,

    /// Queue checks before a queued build is given up on
    pub resolve_max_attempts: u32,

    /// Wait between build status checks
    pub poll_interval: Duration,

    /// Build status checks before a running build is given up on
    pub poll_max_attempts: u32,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Every variable is optional:
    /// - ORCHESTRATOR_BIND_ADDR (default: 0.0.0.0:3000)
    /// - DATABASE_URL (default: unset, in-memory store)
    /// - RUNNER_URL (default: http://localhost:8080)
    /// - RUNNER_USER, RUNNER_API_TOKEN (set both or neither)
    /// - RUNNER_REQUEST_TIMEOUT_SECS (default: 30)
    /// - EXTRACT_JOB_NAME (default: extract-music)
    /// - SYNTHESIZE_JOB_NAME (default: synthesize-video)
    /// - ARTIFACT_BASE_URL (default: http://localhost:3000/downloads)
    /// - DOWNLOADS_DIR (default: downloads)
    /// - RESOLVE_INTERVAL_SECS (default: 2), RESOLVE_MAX_ATTEMPTS (default: 30)
    /// - POLL_INTERVAL_SECS (default: 2), POLL_MAX_ATTEMPTS (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: env_or("ORCHESTRATOR_BIND_ADDR", defaults.bind_addr),
            database_url: env_opt("DATABASE_URL"),
            runner_url: env_or("RUNNER_URL", defaults.runner_url),
            runner_user: env_opt("RUNNER_USER"),
            runner_api_token: env_opt("RUNNER_API_TOKEN"),
            runner_request_timeout: env_secs(
                "RUNNER_REQUEST_TIMEOUT_SECS",
                defaults.runner_request_timeout,
            ),
            extract_job_name: env_or("EXTRACT_JOB_NAME", defaults.extract_job_name),
            synthesize_job_name: env_or("SYNTHESIZE_JOB_NAME", defaults.synthesize_job_name),
            artifact_base_url: env_or("ARTIFACT_BASE_URL", defaults.artifact_base_url),
            downloads_dir: env_opt("DOWNLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.downloads_dir),
            resolve_interval: env_secs("RESOLVE_INTERVAL_SECS", defaults.resolve_interval),
            resolve_max_attempts: env_parse("RESOLVE_MAX_ATTEMPTS", defaults.resolve_max_attempts),
            poll_interval: env_secs("POLL_INTERVAL_SECS", defaults.poll_interval),
            poll_max_attempts: env_parse("POLL_MAX_ATTEMPTS", defaults.poll_max_attempts),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("runner_url", &self.runner_url),
            ("artifact_base_url", &self.artifact_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.runner_user.is_some() != self.runner_api_token.is_some() {
            anyhow::bail!("runner_user and runner_api_token must be set together");
        }

        if self.extract_job_name.is_empty() || self.synthesize_job_name.is_empty() {
            anyhow::bail!("job names cannot be empty");
        }

        if self.resolve_interval.is_zero() || self.poll_interval.is_zero() {
            anyhow::bail!("polling intervals must be greater than 0");
        }

        if self.resolve_max_attempts == 0 || self.poll_max_attempts == 0 {
            anyhow::bail!("max attempts must be greater than 0");
        }

        if self.runner_request_timeout.is_zero() {
            anyhow::bail!("runner_request_timeout must be greater than 0");
        }

        Ok(())
    }

    /// Settings handed to the job orchestrator
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            extract_job_name: self.extract_job_name.clone(),
            synthesize_job_name: self.synthesize_job_name.clone(),
            artifact_base_url: self.artifact_base_url.clone(),
            resolve: PollSettings::new(self.resolve_interval, self.resolve_max_attempts),
            poll: PollSettings::new(self.poll_interval, self.poll_max_attempts),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let resolve = PollSettings::resolver_default();
        let poll = PollSettings::poller_default();

        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            runner_url: "http://localhost:8080".to_string(),
            runner_user: None,
            runner_api_token: None,
            runner_request_timeout: Duration::from_secs(30),
            extract_job_name: "extract-music".to_string(),
            synthesize_job_name: "synthesize-video".to_string(),
            artifact_base_url: "http://localhost:3000/downloads".to_string(),
            downloads_dir: PathBuf::from("downloads"),
            resolve_interval: resolve.interval,
            resolve_max_attempts: resolve.max_attempts,
            poll_interval: poll.interval,
            poll_max_attempts: poll.max_attempts,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn env_or(key: &str, default: String) -> String {
    env_opt(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_opt(key)
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_secs(key: &str, default: Duration) -> Duration {
    env_opt(key)
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
