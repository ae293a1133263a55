//! Status poller
//!
//! Polls a resolved build until the server reports its result.

use reel_client::RemoteRunner;
use reel_core::domain::execution::{BuildOutcome, ExecutionHandle};
use std::sync::Arc;
use tracing::{debug, info};

use super::{Attempt, PollSettings, run_attempts};
use crate::error::ExecutionError;

/// Polls builds until they report a terminal result
#[derive(Clone)]
pub struct StatusPoller {
    runner: Arc<dyn RemoteRunner>,
    settings: PollSettings,
}

impl StatusPoller {
    pub fn new(runner: Arc<dyn RemoteRunner>, settings: PollSettings) -> Self {
        Self { runner, settings }
    }

    /// Polls `handle` until its status carries a result
    ///
    /// The first result observed is returned as is; mapping it onto a job
    /// status is the caller's concern.
    ///
    /// # Errors
    /// - [`ExecutionError::PollTransport`] on the first failed status query
    /// - [`ExecutionError::PollTimeout`] when no result was seen in time
    pub async fn poll_until_done(
        &self,
        handle: &ExecutionHandle,
    ) -> Result<BuildOutcome, ExecutionError> {
        let runner = &self.runner;

        let outcome = run_attempts(self.settings, move |attempt| async move {
            let status = runner
                .build_status(&handle.job_name, handle.build_number)
                .await
                .map_err(ExecutionError::PollTransport)?;

            match status.outcome() {
                Some(outcome) => Ok(Attempt::Done(outcome)),
                None => {
                    debug!("{} still running (check {})", handle, attempt);
                    Ok(Attempt::Pending)
                }
            }
        })
        .await?
        .ok_or(ExecutionError::PollTimeout {
            attempts: self.settings.max_attempts,
        })?;

        info!("{} finished with {}", handle, outcome);
        Ok(outcome)
    }
}
