//! Reel Core
//!
//! Core types and abstractions for the Reel media job service.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, ExecutionHandle, BuildOutcome)
//! - DTOs: Data transfer objects for the HTTP surface and the remote build server

pub mod domain;
pub mod dto;
