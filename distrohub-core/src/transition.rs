//! Pure moderation transitions.
//!
//! Each operation takes a submission snapshot by reference and returns a
//! new value (or an error, leaving the input untouched). There are NO side
//! effects here: persistence of the returned value is the caller's job.
//!
//! Lifecycle: Draft -> OnModeration -> Accepted | Rejected, where Rejected
//! can be resubmitted and Accepted is terminal. Only releases have a Draft
//! stage or a withdraw path; the other kinds enter moderation on creation.

use std::collections::BTreeMap;

use crate::error::ModerationError;
use crate::submission::{Payload, Status, Submission, SubmissionKind, Track};
use crate::validation::validate_for_submit;

/// Kind-shaped data a moderator supplies when accepting a submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AcceptInput {
    /// Release acceptance: optional album UPC plus per-track ISRCs keyed by
    /// track index. Unsupplied entries keep the track's previous ISRC.
    Release {
        upc: Option<String>,
        track_isrc: BTreeMap<usize, String>,
    },
    /// Smartlink acceptance: the published URL.
    Smartlink { smartlink_url: String },
    /// Promo, video and platform-account acceptance carries no extra data.
    #[default]
    None,
}

/// Renumber `track_order` to a dense 1..=N sequence in array order.
///
/// Any pre-existing values are ignored; the array position is the source of
/// truth. Applying this twice yields the same result.
pub fn renumber_tracks(tracks: &mut [Track]) {
    for (idx, track) in tracks.iter_mut().enumerate() {
        track.track_order = (idx + 1) as u32;
    }
}

/// Submit (or resubmit) a submission for moderation.
///
/// Allowed from Draft and Rejected. Validates the kind's required fields,
/// renumbers release tracks, clears any previous rejection reason and moves
/// the submission to OnModeration.
pub fn submit(submission: &Submission) -> Result<Submission, ModerationError> {
    match submission.status {
        Status::Draft | Status::Rejected => {}
        status => {
            return Err(ModerationError::InvalidTransition {
                action: "submit",
                kind: submission.kind(),
                status,
            })
        }
    }

    validate_for_submit(&submission.payload)?;

    let mut next = submission.clone();
    if let Payload::Release(ref mut release) = next.payload {
        renumber_tracks(&mut release.tracks);
    }
    next.status = Status::OnModeration;
    next.rejection_reason = None;
    Ok(next)
}

/// Accept a submission currently on moderation.
///
/// The acceptance input must match the submission's kind. For releases the
/// ISRC map is a partial update: tracks without an entry (or with a blank
/// entry) keep whatever ISRC they already had.
pub fn accept(
    submission: &Submission,
    input: AcceptInput,
) -> Result<Submission, ModerationError> {
    if submission.status != Status::OnModeration {
        return Err(ModerationError::InvalidTransition {
            action: "accept",
            kind: submission.kind(),
            status: submission.status,
        });
    }

    let mut next = submission.clone();
    match (&mut next.payload, input) {
        (Payload::Release(release), AcceptInput::Release { upc, track_isrc }) => {
            if let Some(upc) = upc {
                if !upc.trim().is_empty() {
                    release.upc = Some(upc);
                }
            }
            for (idx, isrc) in track_isrc {
                if isrc.trim().is_empty() {
                    continue;
                }
                if let Some(track) = release.tracks.get_mut(idx) {
                    track.isrc = Some(isrc);
                }
            }
        }
        (Payload::Smartlink(smartlink), AcceptInput::Smartlink { smartlink_url }) => {
            if smartlink_url.trim().is_empty() {
                return Err(ModerationError::MissingAcceptField {
                    kind: SubmissionKind::Smartlink,
                    field: "smartlink_url",
                });
            }
            smartlink.smartlink_url = Some(smartlink_url);
        }
        (
            Payload::PromoRelease(_) | Payload::Video(_) | Payload::PlatformAccount(_),
            AcceptInput::None,
        ) => {}
        _ => {
            return Err(ModerationError::AcceptFieldsMismatch {
                kind: submission.kind(),
            })
        }
    }

    next.status = Status::Accepted;
    next.rejection_reason = None;
    Ok(next)
}

/// Reject a submission currently on moderation, with a non-blank reason.
pub fn reject(submission: &Submission, reason: &str) -> Result<Submission, ModerationError> {
    if submission.status != Status::OnModeration {
        return Err(ModerationError::InvalidTransition {
            action: "reject",
            kind: submission.kind(),
            status: submission.status,
        });
    }
    if reason.trim().is_empty() {
        return Err(ModerationError::BlankRejectionReason);
    }

    let mut next = submission.clone();
    next.status = Status::Rejected;
    next.rejection_reason = Some(reason.to_string());
    Ok(next)
}

/// Withdraw a release from moderation back to Draft (owner-initiated).
///
/// Other kinds have no withdraw path: they never leave moderation except
/// through accept/reject.
pub fn withdraw(submission: &Submission) -> Result<Submission, ModerationError> {
    if submission.kind() != SubmissionKind::Release
        || submission.status != Status::OnModeration
    {
        return Err(ModerationError::InvalidTransition {
            action: "withdraw",
            kind: submission.kind(),
            status: submission.status,
        });
    }

    let mut next = submission.clone();
    next.status = Status::Draft;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::{
        OwnerId, ReleasePayload, SmartlinkPayload, SubmissionId, VideoPayload,
    };
    use chrono::Utc;
    use proptest::prelude::*;

    fn make_submission(status: Status, payload: Payload) -> Submission {
        Submission {
            id: SubmissionId::from("sub-1"),
            owner_id: OwnerId::from("user-1"),
            status,
            rejection_reason: match status {
                Status::Rejected => Some("previous reason".to_string()),
                _ => None,
            },
            payload,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn draft_release() -> Submission {
        make_submission(
            Status::Draft,
            Payload::Release(ReleasePayload {
                album_name: "X".into(),
                artists: vec!["A".into()],
                tracks: vec![Track::new("T1", "A")],
                ..Default::default()
            }),
        )
    }

    #[test]
    fn test_submit_draft_release_enters_moderation() {
        let submission = draft_release();
        let submitted = submit(&submission).unwrap();

        assert_eq!(submitted.status, Status::OnModeration);
        assert_eq!(submitted.rejection_reason, None);
        if let Payload::Release(release) = &submitted.payload {
            assert_eq!(release.tracks[0].track_order, 1);
        } else {
            panic!("payload kind changed");
        }
    }

    #[test]
    fn test_submit_missing_field_leaves_input_untouched() {
        let submission = make_submission(
            Status::Draft,
            Payload::Release(ReleasePayload {
                album_name: "".into(),
                artists: vec!["A".into()],
                tracks: vec![Track::new("T1", "A")],
                ..Default::default()
            }),
        );

        let err = submit(&submission).unwrap_err();
        assert!(matches!(err, ModerationError::MissingField { .. }));
        assert_eq!(submission.status, Status::Draft);
    }

    #[test]
    fn test_submit_blank_smartlink_release_name_fails() {
        let submission = make_submission(
            Status::Rejected,
            Payload::Smartlink(SmartlinkPayload {
                release_name: "".into(),
                artists: "A".into(),
                ..Default::default()
            }),
        );

        let err = submit(&submission).unwrap_err();
        assert_eq!(
            err,
            ModerationError::MissingField {
                kind: SubmissionKind::Smartlink,
                field: "release_name",
            }
        );
        // The rejected snapshot keeps its status and reason
        assert_eq!(submission.status, Status::Rejected);
        assert!(submission.rejection_reason.is_some());
    }

    #[test]
    fn test_submit_from_on_moderation_is_invalid() {
        let submission = make_submission(
            Status::OnModeration,
            Payload::Release(ReleasePayload {
                album_name: "X".into(),
                artists: vec!["A".into()],
                tracks: vec![Track::new("T1", "A")],
                ..Default::default()
            }),
        );
        assert!(matches!(
            submit(&submission),
            Err(ModerationError::InvalidTransition {
                action: "submit",
                ..
            })
        ));
    }

    #[test]
    fn test_submit_from_accepted_is_invalid() {
        let mut submission = draft_release();
        submission.status = Status::Accepted;
        assert!(matches!(
            submit(&submission),
            Err(ModerationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_resubmit_clears_rejection_reason() {
        let mut submission = draft_release();
        submission.status = Status::Rejected;
        submission.rejection_reason = Some("Bad cover".to_string());

        let resubmitted = submit(&submission).unwrap();
        assert_eq!(resubmitted.status, Status::OnModeration);
        assert_eq!(resubmitted.rejection_reason, None);
    }

    #[test]
    fn test_reject_resubmit_reject_keeps_only_latest_reason() {
        let on_moderation = submit(&draft_release()).unwrap();

        let rejected = reject(&on_moderation, "reason A").unwrap();
        assert_eq!(rejected.rejection_reason.as_deref(), Some("reason A"));

        let resubmitted = submit(&rejected).unwrap();
        assert_eq!(resubmitted.rejection_reason, None);

        let rejected_again = reject(&resubmitted, "reason B").unwrap();
        assert_eq!(rejected_again.rejection_reason.as_deref(), Some("reason B"));
    }

    #[test]
    fn test_reject_blank_reason_fails() {
        let on_moderation = submit(&draft_release()).unwrap();

        let err = reject(&on_moderation, "").unwrap_err();
        assert_eq!(err, ModerationError::BlankRejectionReason);
        assert_eq!(reject(&on_moderation, "   ").unwrap_err(), err);

        let rejected = reject(&on_moderation, "Bad cover").unwrap();
        assert_eq!(rejected.status, Status::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Bad cover"));
    }

    #[test]
    fn test_reject_requires_on_moderation() {
        let submission = draft_release();
        assert!(matches!(
            reject(&submission, "nope"),
            Err(ModerationError::InvalidTransition {
                action: "reject",
                ..
            })
        ));
    }

    #[test]
    fn test_accept_release_merges_upc_and_partial_isrc() {
        let mut submission = draft_release();
        if let Payload::Release(release) = &mut submission.payload {
            release.tracks.push(Track {
                isrc: Some("OLD-ISRC".to_string()),
                ..Track::new("T2", "A")
            });
        }
        let on_moderation = submit(&submission).unwrap();

        let mut track_isrc = BTreeMap::new();
        track_isrc.insert(0, "ISRC1".to_string());
        let accepted = accept(
            &on_moderation,
            AcceptInput::Release {
                upc: Some("123".to_string()),
                track_isrc,
            },
        )
        .unwrap();

        assert_eq!(accepted.status, Status::Accepted);
        if let Payload::Release(release) = &accepted.payload {
            assert_eq!(release.upc.as_deref(), Some("123"));
            assert_eq!(release.tracks[0].isrc.as_deref(), Some("ISRC1"));
            // Unsupplied entry keeps its previous value
            assert_eq!(release.tracks[1].isrc.as_deref(), Some("OLD-ISRC"));
        } else {
            panic!("payload kind changed");
        }
    }

    #[test]
    fn test_accept_release_blank_upc_keeps_previous() {
        let mut submission = draft_release();
        if let Payload::Release(release) = &mut submission.payload {
            release.upc = Some("OLD-UPC".to_string());
        }
        let on_moderation = submit(&submission).unwrap();

        let accepted = accept(
            &on_moderation,
            AcceptInput::Release {
                upc: Some("  ".to_string()),
                track_isrc: BTreeMap::new(),
            },
        )
        .unwrap();

        if let Payload::Release(release) = &accepted.payload {
            assert_eq!(release.upc.as_deref(), Some("OLD-UPC"));
        } else {
            panic!("payload kind changed");
        }
    }

    #[test]
    fn test_accept_release_out_of_range_isrc_index_is_ignored() {
        let on_moderation = submit(&draft_release()).unwrap();

        let mut track_isrc = BTreeMap::new();
        track_isrc.insert(5, "ISRC-NOWHERE".to_string());
        let accepted = accept(
            &on_moderation,
            AcceptInput::Release {
                upc: None,
                track_isrc,
            },
        )
        .unwrap();
        assert_eq!(accepted.status, Status::Accepted);
    }

    #[test]
    fn test_accept_smartlink_requires_url() {
        let submission = make_submission(
            Status::OnModeration,
            Payload::Smartlink(SmartlinkPayload {
                release_name: "EP".into(),
                artists: "A".into(),
                ..Default::default()
            }),
        );

        let err = accept(
            &submission,
            AcceptInput::Smartlink {
                smartlink_url: " ".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModerationError::MissingAcceptField {
                kind: SubmissionKind::Smartlink,
                field: "smartlink_url",
            }
        );

        let accepted = accept(
            &submission,
            AcceptInput::Smartlink {
                smartlink_url: "https://links.example/ep".to_string(),
            },
        )
        .unwrap();
        assert_eq!(accepted.status, Status::Accepted);
        if let Payload::Smartlink(smartlink) = &accepted.payload {
            assert_eq!(
                smartlink.smartlink_url.as_deref(),
                Some("https://links.example/ep")
            );
        } else {
            panic!("payload kind changed");
        }
    }

    #[test]
    fn test_accept_with_mismatched_input_shape_fails() {
        let submission = make_submission(
            Status::OnModeration,
            Payload::Video(VideoPayload {
                video_name: "Clip".into(),
                artist_name: "A".into(),
                ..Default::default()
            }),
        );

        let err = accept(
            &submission,
            AcceptInput::Smartlink {
                smartlink_url: "https://links.example".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModerationError::AcceptFieldsMismatch {
                kind: SubmissionKind::Video,
            }
        );

        let accepted = accept(&submission, AcceptInput::None).unwrap();
        assert_eq!(accepted.status, Status::Accepted);
    }

    #[test]
    fn test_accept_requires_on_moderation() {
        let submission = draft_release();
        assert!(matches!(
            accept(&submission, AcceptInput::default()),
            Err(ModerationError::InvalidTransition {
                action: "accept",
                ..
            })
        ));
    }

    #[test]
    fn test_withdraw_release_returns_to_draft() {
        let on_moderation = submit(&draft_release()).unwrap();
        let withdrawn = withdraw(&on_moderation).unwrap();
        assert_eq!(withdrawn.status, Status::Draft);
        assert_eq!(withdrawn.rejection_reason, None);
    }

    #[test]
    fn test_withdraw_only_from_on_moderation() {
        let submission = draft_release();
        assert!(matches!(
            withdraw(&submission),
            Err(ModerationError::InvalidTransition {
                action: "withdraw",
                ..
            })
        ));
    }

    #[test]
    fn test_withdraw_non_release_is_invalid() {
        let submission = make_submission(
            Status::OnModeration,
            Payload::Video(VideoPayload {
                video_name: "Clip".into(),
                artist_name: "A".into(),
                ..Default::default()
            }),
        );
        assert!(matches!(
            withdraw(&submission),
            Err(ModerationError::InvalidTransition {
                action: "withdraw",
                ..
            })
        ));
    }

    #[test]
    fn test_renumbering_ignores_existing_order() {
        let mut tracks = vec![
            Track {
                track_order: 7,
                ..Track::new("T1", "A")
            },
            Track {
                track_order: 2,
                ..Track::new("T2", "A")
            },
            Track {
                track_order: 2,
                ..Track::new("T3", "A")
            },
        ];
        renumber_tracks(&mut tracks);
        let orders: Vec<u32> = tracks.iter().map(|t| t.track_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    // =========================================================================
    // Property-based tests
    // =========================================================================

    fn arb_track() -> impl Strategy<Value = Track> {
        ("[A-Za-z ]{1,12}", "[A-Za-z ]{1,12}", 0u32..100).prop_map(
            |(name, artists, track_order)| Track {
                track_order,
                ..Track::new(name, artists)
            },
        )
    }

    proptest! {
        /// Renumbering is idempotent: a second pass never changes anything.
        #[test]
        fn renumbering_is_idempotent(mut tracks in proptest::collection::vec(arb_track(), 0..16)) {
            renumber_tracks(&mut tracks);
            let first: Vec<u32> = tracks.iter().map(|t| t.track_order).collect();
            renumber_tracks(&mut tracks);
            let second: Vec<u32> = tracks.iter().map(|t| t.track_order).collect();

            prop_assert_eq!(&first, &second);
            // And the result is dense 1..=N in array order
            prop_assert_eq!(first, (1..=tracks.len() as u32).collect::<Vec<_>>());
        }

        /// Invariant: across any sequence of transitions, rejection_reason is
        /// Some iff the status is Rejected.
        #[test]
        fn rejection_reason_iff_rejected(ops in proptest::collection::vec(0u8..4, 0..12)) {
            let mut current = draft_release();
            for op in ops {
                let result = match op {
                    0 => submit(&current),
                    1 => accept(&current, AcceptInput::Release {
                        upc: None,
                        track_isrc: BTreeMap::new(),
                    }),
                    2 => reject(&current, "not good enough"),
                    _ => withdraw(&current),
                };
                if let Ok(next) = result {
                    current = next;
                }
                prop_assert_eq!(
                    current.rejection_reason.is_some(),
                    current.status == Status::Rejected,
                    "status {:?} with reason {:?}", current.status, current.rejection_reason
                );
            }
        }
    }
}
