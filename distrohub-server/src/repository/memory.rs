//! In-memory implementation of `SubmissionRepository`.
//!
//! Stores submissions in a `HashMap` protected by a `RwLock`. All state is
//! lost on restart; used by tests and for local development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use distrohub_core::{OwnerId, Payload, Status, Submission, SubmissionId, SubmissionKind};

use super::{RepositoryError, SubmissionPatch, SubmissionRepository};

/// In-memory submission repository.
pub struct InMemoryRepository {
    submissions: RwLock<HashMap<SubmissionId, Submission>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            submissions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryRepository {
    async fn list(
        &self,
        kind: SubmissionKind,
        owner: Option<&OwnerId>,
        status: Option<Status>,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let submissions = self.submissions.read().await;
        let mut matching: Vec<Submission> = submissions
            .values()
            .filter(|s| s.kind() == kind)
            .filter(|s| owner.map_or(true, |o| &s.owner_id == o))
            .filter(|s| status.map_or(true, |st| s.status == st))
            .cloned()
            .collect();
        // Newest first; id as tie-break for deterministic ordering
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.0.cmp(&a.id.0))
        });
        Ok(matching)
    }

    async fn get(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
    ) -> Result<Option<Submission>, RepositoryError> {
        let submissions = self.submissions.read().await;
        Ok(submissions.get(id).filter(|s| s.kind() == kind).cloned())
    }

    async fn create(
        &self,
        owner: OwnerId,
        payload: Payload,
    ) -> Result<Submission, RepositoryError> {
        let now = Utc::now();
        let submission = Submission {
            id: SubmissionId(Uuid::new_v4().to_string()),
            owner_id: owner,
            status: payload.kind().initial_status(),
            rejection_reason: None,
            payload,
            created_at: now,
            updated_at: now,
        };

        let mut submissions = self.submissions.write().await;
        submissions.insert(submission.id.clone(), submission.clone());
        Ok(submission)
    }

    async fn update(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
        patch: SubmissionPatch,
    ) -> Result<Option<Submission>, RepositoryError> {
        let mut submissions = self.submissions.write().await;
        let Some(stored) = submissions.get_mut(id).filter(|s| s.kind() == kind) else {
            return Ok(None);
        };
        patch.apply(stored);
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }
}
