//! Execution resolver
//!
//! Turns the queue reference returned by a trigger into a concrete build
//! number by following the queue item until the server assigns one.

use reel_client::RemoteRunner;
use reel_core::domain::execution::{ExecutionHandle, QueueReference};
use reel_core::dto::runner::QueueState;
use std::sync::Arc;
use tracing::{debug, info};

use super::{Attempt, PollSettings, run_attempts};
use crate::error::ExecutionError;

/// Follows queued build requests until they become builds
///
/// Waiting in the queue ends in one of three ways: a build number is
/// assigned, the item is cancelled, or the attempts run out.
#[derive(Clone)]
pub struct ExecutionResolver {
    runner: Arc<dyn RemoteRunner>,
    settings: PollSettings,
}

impl ExecutionResolver {
    pub fn new(runner: Arc<dyn RemoteRunner>, settings: PollSettings) -> Self {
        Self { runner, settings }
    }

    /// Waits for the queued request to be assigned a build number
    ///
    /// # Errors
    /// - [`ExecutionError::QueueCancelled`] as soon as cancellation is reported
    /// - [`ExecutionError::QueueTransport`] on the first failed queue query
    /// - [`ExecutionError::ResolveTimeout`] when no build was assigned in time
    pub async fn resolve(
        &self,
        job_name: &str,
        queue: QueueReference,
    ) -> Result<ExecutionHandle, ExecutionError> {
        let runner = &self.runner;
        let queue_ref = &queue;

        let build_number = run_attempts(self.settings, move |attempt| async move {
            let item = runner
                .queue_item(queue_ref)
                .await
                .map_err(ExecutionError::QueueTransport)?;

            match item.state() {
                QueueState::Assigned(number) => Ok(Attempt::Done(number)),
                QueueState::Cancelled => Err(ExecutionError::QueueCancelled),
                QueueState::Waiting => {
                    debug!("{} still queued (check {})", queue_ref, attempt);
                    Ok(Attempt::Pending)
                }
            }
        })
        .await?
        .ok_or(ExecutionError::ResolveTimeout {
            attempts: self.settings.max_attempts,
        })?;

        info!("{} resolved to {}#{}", queue, job_name, build_number);

        Ok(ExecutionHandle {
            job_name: job_name.to_string(),
            build_number,
            queue_reference: queue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, ScriptedRunner};
    use reel_core::dto::runner::QueueItem;
    use std::time::Duration;
    use tokio::time::Instant;

    fn resolver(runner: &Arc<ScriptedRunner>, max_attempts: u32) -> ExecutionResolver {
        ExecutionResolver::new(
            runner.clone(),
            PollSettings::new(Duration::from_secs(2), max_attempts),
        )
    }

    fn queue() -> QueueReference {
        QueueReference::new("http://ci/queue/item/5/")
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_after_waiting() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.script_queue([
            Reply::Ok(QueueItem::waiting()),
            Reply::Ok(QueueItem::waiting()),
            Reply::Ok(QueueItem::assigned(42)),
        ]);

        let start = Instant::now();
        let handle = resolver(&runner, 30)
            .resolve("extract-music", queue())
            .await
            .unwrap();

        assert_eq!(handle.build_number, 42);
        assert_eq!(handle.job_name, "extract-music");
        assert_eq!(handle.queue_reference, queue());
        assert_eq!(runner.queue_calls(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_fails_without_further_waiting() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.script_queue([
            Reply::Ok(QueueItem::waiting()),
            Reply::Ok(QueueItem::cancelled()),
        ]);

        let start = Instant::now();
        let err = resolver(&runner, 30)
            .resolve("extract-music", queue())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::QueueCancelled));
        assert_eq!(runner.queue_calls(), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_at_ceiling() {
        let runner = Arc::new(ScriptedRunner::new());

        let start = Instant::now();
        let err = resolver(&runner, 30)
            .resolve("extract-music", queue())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::ResolveTimeout { attempts: 30 }));
        assert_eq!(runner.queue_calls(), 30);
        assert_eq!(start.elapsed(), PollSettings::resolver_default().ceiling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_not_retried() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.script_queue([Reply::Ok(QueueItem::waiting()), Reply::Fail(502)]);

        let err = resolver(&runner, 30)
            .resolve("extract-music", queue())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::QueueTransport(_)));
        assert_eq!(runner.queue_calls(), 2);
    }
}
