//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services orchestrate between the job store and the build server.

pub mod job;

pub use job::{JobOrchestrator, OrchestratorSettings};
