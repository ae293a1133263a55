//! Data Transfer Objects
//!
//! `job` holds the request/response shapes of the orchestrator's HTTP surface.
//! `runner` holds the JSON documents returned by the remote build server.

pub mod job;
pub mod runner;
