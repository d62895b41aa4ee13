//! Required-field validation for `submit`.
//!
//! The required-field set of each kind is encoded as static data consulted
//! by the transition layer, rather than being scattered across conditional
//! branches. A field is "blank" when absent or whitespace-only.

use crate::error::ModerationError;
use crate::submission::{Payload, SubmissionKind};

/// Extracts the value of one scalar field, or None when structurally absent.
type FieldGetter = fn(&Payload) -> Option<&str>;

/// One required scalar field of a kind.
struct RequiredField {
    name: &'static str,
    get: FieldGetter,
}

const RELEASE_REQUIRED: &[RequiredField] = &[RequiredField {
    name: "album_name",
    get: |p| match p {
        Payload::Release(r) => Some(r.album_name.as_str()),
        _ => None,
    },
}];

const SMARTLINK_REQUIRED: &[RequiredField] = &[
    RequiredField {
        name: "release_name",
        get: |p| match p {
            Payload::Smartlink(s) => Some(s.release_name.as_str()),
            _ => None,
        },
    },
    RequiredField {
        name: "artists",
        get: |p| match p {
            Payload::Smartlink(s) => Some(s.artists.as_str()),
            _ => None,
        },
    },
];

const PROMO_REQUIRED: &[RequiredField] = &[RequiredField {
    name: "upc",
    get: |p| match p {
        Payload::PromoRelease(promo) => Some(promo.upc.as_str()),
        _ => None,
    },
}];

const VIDEO_REQUIRED: &[RequiredField] = &[
    RequiredField {
        name: "video_name",
        get: |p| match p {
            Payload::Video(v) => Some(v.video_name.as_str()),
            _ => None,
        },
    },
    RequiredField {
        name: "artist_name",
        get: |p| match p {
            Payload::Video(v) => Some(v.artist_name.as_str()),
            _ => None,
        },
    },
];

// PlatformAccount has no required free-text fields: the platform itself is
// an enum and always present.
const PLATFORM_ACCOUNT_REQUIRED: &[RequiredField] = &[];

fn required_fields(kind: SubmissionKind) -> &'static [RequiredField] {
    match kind {
        SubmissionKind::Release => RELEASE_REQUIRED,
        SubmissionKind::Smartlink => SMARTLINK_REQUIRED,
        SubmissionKind::PromoRelease => PROMO_REQUIRED,
        SubmissionKind::Video => VIDEO_REQUIRED,
        SubmissionKind::PlatformAccount => PLATFORM_ACCOUNT_REQUIRED,
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

/// Check that every required field of the payload's kind is present and
/// non-blank. Releases additionally need at least one artist and at least
/// one track, and every track needs a name and artists.
pub fn validate_for_submit(payload: &Payload) -> Result<(), ModerationError> {
    let kind = payload.kind();

    for field in required_fields(kind) {
        if is_blank((field.get)(payload)) {
            return Err(ModerationError::MissingField {
                kind,
                field: field.name,
            });
        }
    }

    if let Payload::Release(release) = payload {
        if !release.artists.iter().any(|a| !a.trim().is_empty()) {
            return Err(ModerationError::MissingField {
                kind,
                field: "artists",
            });
        }
        if release.tracks.is_empty() {
            return Err(ModerationError::MissingField {
                kind,
                field: "tracks",
            });
        }
        for track in &release.tracks {
            if track.track_name.trim().is_empty() {
                return Err(ModerationError::MissingField {
                    kind,
                    field: "track_name",
                });
            }
            if track.artists.trim().is_empty() {
                return Err(ModerationError::MissingField {
                    kind,
                    field: "track_artists",
                });
            }
        }
    }

    Ok(())
}
