//! Build server response documents
//!
//! Only the fields the orchestrator reads are modelled; everything else in
//! the server's JSON is ignored.

use serde::{Deserialize, Serialize};

use crate::domain::execution::BuildOutcome;

/// Queue item as returned by `{queue_reference}/api/json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub executable: Option<Executable>,
}

/// Build assigned to a queue item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executable {
    pub number: u64,
    #[serde(default)]
    pub url: Option<String>,
}

/// Where a queued request currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Waiting,
    Assigned(u64),
    Cancelled,
}

impl QueueItem {
    pub fn waiting() -> Self {
        Self::default()
    }

    pub fn assigned(number: u64) -> Self {
        Self {
            cancelled: false,
            executable: Some(Executable { number, url: None }),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            executable: None,
        }
    }

    /// Cancellation wins over an assigned build number
    pub fn state(&self) -> QueueState {
        if self.cancelled {
            return QueueState::Cancelled;
        }
        match &self.executable {
            Some(executable) => QueueState::Assigned(executable.number),
            None => QueueState::Waiting,
        }
    }
}

/// Build status as returned by `/job/{name}/{number}/api/json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub building: bool,
}

impl BuildStatus {
    pub fn running() -> Self {
        Self {
            result: None,
            building: true,
        }
    }

    pub fn finished(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            building: false,
        }
    }

    /// Terminal outcome, if the server reported one
    pub fn outcome(&self) -> Option<BuildOutcome> {
        self.result.as_deref().map(BuildOutcome::from_result)
    }
}
