//! Remote execution types
//!
//! These never touch the job store. They are owned by the task driving one
//! job through the build server and dropped once a terminal outcome is known.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::job::JobStatus;

/// Reference to a queued build request, as returned by the build server
/// in the `Location` header of a trigger response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueReference(String);

impl QueueReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything needed to poll one build for its result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionHandle {
    /// Name of the job on the build server
    pub job_name: String,
    /// Build number assigned once the queued request left the queue
    pub build_number: u64,
    /// Queue item the build was resolved from
    pub queue_reference: QueueReference,
}

impl fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.job_name, self.build_number)
    }
}

/// Terminal result reported by the build server
///
/// The server vocabulary is open-ended; anything not recognised is kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    Failure,
    Aborted,
    Unstable,
    NotBuilt,
    Other(String),
}

impl BuildOutcome {
    /// Parses the `result` field of a build status response
    ///
    /// Matching is exact: `"success"` is not `Success`.
    pub fn from_result(result: &str) -> Self {
        match result {
            "SUCCESS" => BuildOutcome::Success,
            "FAILURE" => BuildOutcome::Failure,
            "ABORTED" => BuildOutcome::Aborted,
            "UNSTABLE" => BuildOutcome::Unstable,
            "NOT_BUILT" => BuildOutcome::NotBuilt,
            other => BuildOutcome::Other(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Success)
    }

    /// Maps the outcome onto the job lifecycle. Only `Success` completes a job.
    pub fn job_status(&self) -> JobStatus {
        if self.is_success() {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        }
    }
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildOutcome::Success => f.write_str("SUCCESS"),
            BuildOutcome::Failure => f.write_str("FAILURE"),
            BuildOutcome::Aborted => f.write_str("ABORTED"),
            BuildOutcome::Unstable => f.write_str("UNSTABLE"),
            BuildOutcome::NotBuilt => f.write_str("NOT_BUILT"),
            BuildOutcome::Other(s) => f.write_str(s),
        }
    }
}
