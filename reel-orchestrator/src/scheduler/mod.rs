//! Scheduler layer
//!
//! Follows one triggered build on the remote server: first until the queued
//! request is assigned a build number ([`ExecutionResolver`]), then until that
//! build reports a result ([`StatusPoller`]).
//!
//! Both loops are bounded by a [`PollSettings`] and wait on the tokio clock,
//! so tests drive them with a paused runtime instead of real time.

pub mod poller;
pub mod resolver;

pub use poller::StatusPoller;
pub use resolver::ExecutionResolver;

use std::future::Future;
use std::time::Duration;
use tracing::trace;

use crate::error::ExecutionError;

/// Bounds for a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Wait between two consecutive attempts
    pub interval: Duration,
    /// Attempts before giving up
    pub max_attempts: u32,
}

impl PollSettings {
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Queue resolution: 30 checks, 2 seconds apart
    pub const fn resolver_default() -> Self {
        Self::new(Duration::from_secs(2), 30)
    }

    /// Build status: 300 checks, 2 seconds apart
    pub const fn poller_default() -> Self {
        Self::new(Duration::from_secs(2), 300)
    }

    /// Time from the first attempt to the last one
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// What one attempt observed
pub(crate) enum Attempt<T> {
    /// Terminal observation, stop polling
    Done(T),
    /// Nothing yet, try again after the interval
    Pending,
}

/// Runs `attempt` until it returns [`Attempt::Done`], an error, or the
/// attempts run out
///
/// Attempts are numbered from 1. There is no wait after the final attempt.
/// Returns `Ok(None)` when every attempt came back [`Attempt::Pending`].
pub(crate) async fn run_attempts<T, F, Fut>(
    settings: PollSettings,
    mut attempt: F,
) -> Result<Option<T>, ExecutionError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Attempt<T>, ExecutionError>>,
{
    for n in 1..=settings.max_attempts {
        if let Attempt::Done(value) = attempt(n).await? {
            return Ok(Some(value));
        }

        if n < settings.max_attempts {
            trace!("Attempt {}/{} pending", n, settings.max_attempts);
            tokio::time::sleep(settings.interval).await;
        }
    }

    Ok(None)
}
