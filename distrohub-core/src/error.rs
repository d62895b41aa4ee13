//! Error types for moderation transitions.

use thiserror::Error;

use crate::submission::{Status, SubmissionKind};

/// Why a moderation transition was refused.
///
/// Every variant is local to a single transition attempt; the submission
/// the caller holds is never mutated on failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModerationError {
    /// A required field for the submission's kind is absent or blank.
    #[error("{kind} is missing required field `{field}`")]
    MissingField {
        kind: SubmissionKind,
        field: &'static str,
    },

    /// The operation is not allowed from the submission's current status.
    #[error("cannot {action} a {kind} in status {status}")]
    InvalidTransition {
        action: &'static str,
        kind: SubmissionKind,
        status: Status,
    },

    /// A rejection must carry a non-blank reason.
    #[error("rejection reason must not be blank")]
    BlankRejectionReason,

    /// The acceptance payload does not have the shape this kind expects
    /// (e.g. a smartlink URL supplied for a video).
    #[error("acceptance fields do not match kind {kind}")]
    AcceptFieldsMismatch { kind: SubmissionKind },

    /// A required acceptance field is absent or blank.
    #[error("acceptance of {kind} requires non-blank `{field}`")]
    MissingAcceptField {
        kind: SubmissionKind,
        field: &'static str,
    },
}
