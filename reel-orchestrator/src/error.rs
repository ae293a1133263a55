//! Orchestrator error types

use reel_client::ClientError;
use thiserror::Error;

use crate::repository::StoreError;

/// Why a job's remote execution did not reach a terminal build result
///
/// Every variant ends the job as `failed`; none of them is retried.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The build server refused the trigger or returned no queue location
    #[error("Trigger failed: {0}")]
    TriggerFailed(#[source] ClientError),

    /// The queued build was cancelled on the build server
    #[error("Queued build was cancelled")]
    QueueCancelled,

    /// The build never left the queue
    #[error("Build not scheduled after {attempts} queue checks")]
    ResolveTimeout { attempts: u32 },

    /// A queue query failed
    #[error("Queue query failed: {0}")]
    QueueTransport(#[source] ClientError),

    /// A build status query failed
    #[error("Build status query failed: {0}")]
    PollTransport(#[source] ClientError),

    /// The build never reported a result
    #[error("No build result after {attempts} status checks")]
    PollTimeout { attempts: u32 },
}

/// Errors surfaced synchronously to a submitter
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
