//! Core domain types
//!
//! This module contains the core domain structures used across Reel crates.
//! Jobs are persisted by the orchestrator; execution handles and outcomes only
//! live for the duration of one in-flight orchestration task.

pub mod execution;
pub mod job;
