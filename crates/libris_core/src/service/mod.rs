//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate archive store calls into use-case level APIs.
//! - Own recovery policy (first-run initialization) so the store does not.

pub mod archive_service;
