//! Moderation service: the glue between the pure domain transitions and
//! the repository.
//!
//! Every mutation follows the same shape: fetch a snapshot, run the pure
//! transition from `distrohub_core`, persist the result as one partial
//! update. The service itself holds no state beyond the repository handle,
//! so it is cheap to clone into handlers.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use distrohub_core::{
    accept, reject, renumber_tracks, submit, withdraw, AcceptInput, ModerationError, OwnerId,
    Payload, Status, Submission, SubmissionId, SubmissionKind, validate_for_submit,
};

use crate::repository::{RepositoryError, SubmissionPatch, SubmissionRepository};

/// Errors surfaced to the HTTP layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ModerationError),

    #[error("no {kind} submission with id {id}")]
    NotFound {
        kind: SubmissionKind,
        id: SubmissionId,
    },

    #[error("payload is a {got} but the request targets {expected}")]
    KindMismatch {
        expected: SubmissionKind,
        got: SubmissionKind,
    },

    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// The three studio-moderated queues, fetched together.
#[derive(Debug, Clone, Serialize)]
pub struct StudioQueue {
    pub promo_releases: Vec<Submission>,
    pub videos: Vec<Submission>,
    pub platform_accounts: Vec<Submission>,
}

/// Submission moderation service.
#[derive(Clone)]
pub struct ModerationService {
    repo: Arc<dyn SubmissionRepository>,
}

impl ModerationService {
    pub fn new(repo: Arc<dyn SubmissionRepository>) -> Self {
        Self { repo }
    }

    /// Create a new submission.
    ///
    /// Releases start in Draft and may be created incomplete; every other
    /// kind enters moderation immediately, so its required fields are
    /// validated here.
    pub async fn create(
        &self,
        owner: OwnerId,
        mut payload: Payload,
    ) -> Result<Submission, ServiceError> {
        clear_moderation_fields(&mut payload);
        match payload {
            Payload::Release(ref mut release) => renumber_tracks(&mut release.tracks),
            _ => validate_for_submit(&payload)?,
        }

        let submission = self.repo.create(owner, payload).await?;
        info!(
            kind = %submission.kind(),
            id = %submission.id,
            status = %submission.status,
            "created submission"
        );
        Ok(submission)
    }

    pub async fn get(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
    ) -> Result<Submission, ServiceError> {
        self.repo
            .get(kind, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                kind,
                id: id.clone(),
            })
    }

    pub async fn list(
        &self,
        kind: SubmissionKind,
        owner: Option<&OwnerId>,
        status: Option<Status>,
    ) -> Result<Vec<Submission>, ServiceError> {
        Ok(self.repo.list(kind, owner, status).await?)
    }

    /// Replace the payload of an editable (Draft or Rejected) submission.
    pub async fn update_payload(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
        mut payload: Payload,
    ) -> Result<Submission, ServiceError> {
        if payload.kind() != kind {
            return Err(ServiceError::KindMismatch {
                expected: kind,
                got: payload.kind(),
            });
        }

        let current = self.get(kind, id).await?;
        if !current.status.is_editable() {
            return Err(ModerationError::InvalidTransition {
                action: "edit",
                kind,
                status: current.status,
            }
            .into());
        }

        clear_moderation_fields(&mut payload);
        if let Payload::Release(ref mut release) = payload {
            renumber_tracks(&mut release.tracks);
        }

        self.persist(kind, id, SubmissionPatch::payload_only(payload))
            .await
    }

    /// Submit (or resubmit after rejection) for moderation.
    pub async fn submit(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
    ) -> Result<Submission, ServiceError> {
        let current = self.get(kind, id).await?;
        let next = submit(&current)?;
        let stored = self
            .persist(kind, id, SubmissionPatch::from_transition(&next))
            .await?;
        info!(kind = %kind, id = %id, "submitted for moderation");
        Ok(stored)
    }

    /// Accept a submission, applying kind-specific moderator input.
    pub async fn accept(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
        input: AcceptInput,
    ) -> Result<Submission, ServiceError> {
        let current = self.get(kind, id).await?;
        let next = accept(&current, input)?;
        let stored = self
            .persist(kind, id, SubmissionPatch::from_transition(&next))
            .await?;
        info!(kind = %kind, id = %id, "accepted");
        Ok(stored)
    }

    /// Reject a submission with a non-blank reason.
    pub async fn reject(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
        reason: &str,
    ) -> Result<Submission, ServiceError> {
        let current = self.get(kind, id).await?;
        let next = reject(&current, reason)?;
        let stored = self
            .persist(kind, id, SubmissionPatch::from_transition(&next))
            .await?;
        info!(kind = %kind, id = %id, "rejected");
        Ok(stored)
    }

    /// Withdraw a release from moderation back to Draft.
    pub async fn withdraw(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
    ) -> Result<Submission, ServiceError> {
        let current = self.get(kind, id).await?;
        let next = withdraw(&current)?;
        let stored = self
            .persist(kind, id, SubmissionPatch::from_transition(&next))
            .await?;
        info!(kind = %kind, id = %id, "withdrawn to draft");
        Ok(stored)
    }

    /// Everything of one kind awaiting moderation, newest first.
    pub async fn moderation_queue(
        &self,
        kind: SubmissionKind,
    ) -> Result<Vec<Submission>, ServiceError> {
        Ok(self
            .repo
            .list(kind, None, Some(Status::OnModeration))
            .await?)
    }

    /// The combined studio view: pending promo releases, videos and
    /// platform accounts in one response.
    pub async fn studio_queue(&self) -> Result<StudioQueue, ServiceError> {
        let (promo_releases, videos, platform_accounts) = tokio::join!(
            self.moderation_queue(SubmissionKind::PromoRelease),
            self.moderation_queue(SubmissionKind::Video),
            self.moderation_queue(SubmissionKind::PlatformAccount),
        );
        Ok(StudioQueue {
            promo_releases: promo_releases?,
            videos: videos?,
            platform_accounts: platform_accounts?,
        })
    }

    async fn persist(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
        patch: SubmissionPatch,
    ) -> Result<Submission, ServiceError> {
        self.repo
            .update(kind, id, patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                kind,
                id: id.clone(),
            })
    }
}

/// Strip fields only a moderator may set from an owner-supplied payload.
/// A smartlink's published URL is assigned at acceptance, never by the
/// submitter.
fn clear_moderation_fields(payload: &mut Payload) {
    if let Payload::Smartlink(smartlink) = payload {
        smartlink.smartlink_url = None;
    }
}
