//! Repository abstraction for submission persistence.
//!
//! This module defines the `SubmissionRepository` trait that abstracts
//! storage operations for submissions. Implementations can provide
//! different backends (in-memory, SQLite).
//!
//! The contract mirrors how the service layer drives transitions: fetch a
//! snapshot, run the pure transition, write the result back as a single
//! partial update. `create` and `update` return the authoritative stored
//! value, so callers never need a second round-trip to observe their own
//! write.

mod memory;
mod sqlite;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

use async_trait::async_trait;
use thiserror::Error;

use distrohub_core::{OwnerId, Payload, Status, Submission, SubmissionId, SubmissionKind};

/// Errors from the storage backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage operation `{operation}` failed: {detail}")]
    Storage { operation: String, detail: String },

    #[error("failed to (de)serialize stored submission: {detail}")]
    Serialization { detail: String },
}

impl RepositoryError {
    pub fn storage(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Storage {
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    pub fn serialization(detail: impl Into<String>) -> Self {
        Self::Serialization {
            detail: detail.into(),
        }
    }
}

/// Three-way patch semantics for an optional field: leave it alone, clear
/// it, or set a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PatchField<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

/// Partial update applied by `SubmissionRepository::update`.
///
/// Identity fields (`id`, `owner_id`, `created_at`) are never part of a
/// patch; `updated_at` is bumped by the repository on every update.
#[derive(Debug, Clone, Default)]
pub struct SubmissionPatch {
    pub payload: Option<Payload>,
    pub status: Option<Status>,
    pub rejection_reason: PatchField<String>,
}

impl SubmissionPatch {
    /// Build the patch that persists a transition result: the new payload,
    /// the new status, and the new rejection reason (cleared when the
    /// transition cleared it).
    pub fn from_transition(next: &Submission) -> Self {
        Self {
            payload: Some(next.payload.clone()),
            status: Some(next.status),
            rejection_reason: match &next.rejection_reason {
                Some(reason) => PatchField::Set(reason.clone()),
                None => PatchField::Clear,
            },
        }
    }

    /// A patch that only replaces the payload (owner edits).
    pub fn payload_only(payload: Payload) -> Self {
        Self {
            payload: Some(payload),
            ..Default::default()
        }
    }

    /// Merge this patch into a stored submission, in place.
    pub fn apply(&self, submission: &mut Submission) {
        if let Some(payload) = &self.payload {
            submission.payload = payload.clone();
        }
        if let Some(status) = self.status {
            submission.status = status;
        }
        match &self.rejection_reason {
            PatchField::Keep => {}
            PatchField::Clear => submission.rejection_reason = None,
            PatchField::Set(reason) => submission.rejection_reason = Some(reason.clone()),
        }
    }
}

/// Repository trait for durable storage of submissions.
///
/// Each transition operates on a snapshot fetched immediately before
/// mutation and is persisted as one atomic write. There is no
/// optimistic-concurrency token: two racing writers are last-write-wins.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// List submissions of a kind, newest first. `owner` and `status`
    /// filters are optional; no filter means all.
    async fn list(
        &self,
        kind: SubmissionKind,
        owner: Option<&OwnerId>,
        status: Option<Status>,
    ) -> Result<Vec<Submission>, RepositoryError>;

    /// Fetch one submission, returning None on a lookup miss (including a
    /// kind/id mismatch).
    async fn get(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
    ) -> Result<Option<Submission>, RepositoryError>;

    /// Store a new submission. The repository assigns the id, both
    /// timestamps, and the kind-appropriate initial status (Draft for
    /// releases, OnModeration otherwise).
    async fn create(
        &self,
        owner: OwnerId,
        payload: Payload,
    ) -> Result<Submission, RepositoryError>;

    /// Apply a partial update and return the merged value, or None on a
    /// lookup miss.
    async fn update(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
        patch: SubmissionPatch,
    ) -> Result<Option<Submission>, RepositoryError>;
}
