//! Core domain for the distrohub moderation workflow.
//!
//! This crate is pure: it defines the submission model and the moderation
//! state machine as deterministic functions over immutable values. The
//! design separates:
//! - **Model**: what a submission is (`Submission`, `Payload`, `Status`)
//! - **Validation**: per-kind required-field tables
//! - **Transition**: pure functions `(&Submission, input) -> Result<Submission, _>`
//!
//! Persistence and HTTP live in `distrohub-server`; callers there fetch a
//! snapshot, run a transition, and hand the new value back to storage.

pub mod error;
pub mod submission;
pub mod transition;
pub mod validation;

pub use error::ModerationError;
pub use submission::{
    OwnerId, Payload, Platform, PlatformAccountPayload, PromoReleasePayload, ReleasePayload,
    SmartlinkPayload, Status, Submission, SubmissionId, SubmissionKind, Track, VideoPayload,
};
pub use transition::{accept, reject, renumber_tracks, submit, withdraw, AcceptInput};
pub use validation::validate_for_submit;
