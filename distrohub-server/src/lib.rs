//! HTTP service for the distrohub moderation workflow.
//!
//! Layering, outermost first:
//! - `api`: axum routes and status-code mapping
//! - `service`: orchestration of pure transitions over the repository
//! - `repository`: storage trait with in-memory and SQLite backends
//!
//! The domain model and state machine live in `distrohub-core`.

pub mod api;
pub mod config;
pub mod repository;
pub mod service;

use service::ModerationService;

/// Shared state handed to every handler.
pub struct AppState {
    pub service: ModerationService,
}
