//! Submission model shared by all five resource kinds.
//!
//! Following the principle of "make illegal states unrepresentable", the
//! kind of a submission is derived from its payload variant rather than
//! stored alongside it, so a Release can never carry a Video payload.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Newtype for a submission's opaque identifier.
///
/// Assigned by the persistence layer; the core never generates ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SubmissionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SubmissionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Newtype for the submitting user's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OwnerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The five submittable resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Release,
    Smartlink,
    PromoRelease,
    Video,
    PlatformAccount,
}

impl SubmissionKind {
    /// Kinds that start life as a Draft; everything else is created
    /// directly on moderation.
    pub fn supports_draft(&self) -> bool {
        matches!(self, Self::Release)
    }

    /// The status a freshly created submission of this kind receives.
    pub fn initial_status(&self) -> Status {
        if self.supports_draft() {
            Status::Draft
        } else {
            Status::OnModeration
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Release => "release",
            Self::Smartlink => "smartlink",
            Self::PromoRelease => "promo release",
            Self::Video => "video",
            Self::PlatformAccount => "platform account",
        };
        write!(f, "{}", name)
    }
}

/// Moderation lifecycle status.
///
/// Serialized in the original wire format (`draft`, `on_moderation`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Draft,
    OnModeration,
    Accepted,
    Rejected,
}

impl Status {
    /// Accepted is the only terminal status; Rejected can be resubmitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Whether the owner may edit the payload in this status.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Draft => "draft",
            Self::OnModeration => "on_moderation",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        write!(f, "{}", name)
    }
}

/// A single track within a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub track_name: String,
    pub artists: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default = "default_track_version")]
    pub version: String,
    #[serde(default)]
    pub musicians: Option<String>,
    #[serde(default)]
    pub lyricists: Option<String>,
    #[serde(default)]
    pub tiktok_moment: Option<String>,
    #[serde(default)]
    pub has_explicit: bool,
    #[serde(default)]
    pub has_lyrics: bool,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub lyrics: Option<String>,
    /// Dense 1..=N position, normalized from array order on every write.
    #[serde(default)]
    pub track_order: u32,
}

fn default_track_version() -> String {
    "Original".to_string()
}

impl Track {
    /// A minimal track with only the required fields filled in.
    pub fn new(track_name: impl Into<String>, artists: impl Into<String>) -> Self {
        Self {
            track_name: track_name.into(),
            artists: artists.into(),
            audio_url: None,
            isrc: None,
            version: default_track_version(),
            musicians: None,
            lyricists: None,
            tiktok_moment: None,
            has_explicit: false,
            has_lyrics: false,
            language: None,
            lyrics: None,
            track_order: 0,
        }
    }
}

/// Album release payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReleasePayload {
    #[serde(default)]
    pub album_name: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    /// Assigned by a moderator at acceptance time.
    #[serde(default)]
    pub upc: Option<String>,
    #[serde(default)]
    pub old_release_date: Option<String>,
    #[serde(default)]
    pub is_rerelease: bool,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Smartlink request payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SmartlinkPayload {
    #[serde(default)]
    pub release_name: String,
    #[serde(default)]
    pub artists: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub upc: Option<String>,
    /// The published link; assigned by a moderator at acceptance time.
    #[serde(default)]
    pub smartlink_url: Option<String>,
}

/// Promo pitch payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PromoReleasePayload {
    #[serde(default)]
    pub upc: String,
    #[serde(default)]
    pub release_description: Option<String>,
    #[serde(default)]
    pub key_track_isrc: Option<String>,
    #[serde(default)]
    pub key_track_name: Option<String>,
    #[serde(default)]
    pub key_track_description: Option<String>,
    #[serde(default)]
    pub artists: Option<String>,
    #[serde(default)]
    pub smartlink_url: Option<String>,
}

/// Music video payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoPayload {
    #[serde(default)]
    pub video_name: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

/// Streaming platforms an artist cabinet can be requested on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    YandexMusic,
    VkMusic,
    Spotify,
    AppleMusic,
    YoutubeMusic,
}

impl Default for Platform {
    fn default() -> Self {
        Self::YandexMusic
    }
}

/// Artist cabinet payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlatformAccountPayload {
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub artist_description: Option<String>,
    #[serde(default)]
    pub latest_release_upc: Option<String>,
    #[serde(default)]
    pub upcoming_release_upc: Option<String>,
    #[serde(default)]
    pub artist_photo_url: Option<String>,
    #[serde(default)]
    pub artist_video_url: Option<String>,
    /// Social-link label to URL, stable iteration order.
    #[serde(default)]
    pub links: BTreeMap<String, String>,
    #[serde(default)]
    pub youtube_channel_url: Option<String>,
    #[serde(default)]
    pub youtube_artist_card_url: Option<String>,
}

/// Kind-specific payload, tagged by kind on the wire and in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Release(ReleasePayload),
    Smartlink(SmartlinkPayload),
    PromoRelease(PromoReleasePayload),
    Video(VideoPayload),
    PlatformAccount(PlatformAccountPayload),
}

impl Payload {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            Self::Release(_) => SubmissionKind::Release,
            Self::Smartlink(_) => SubmissionKind::Smartlink,
            Self::PromoRelease(_) => SubmissionKind::PromoRelease,
            Self::Video(_) => SubmissionKind::Video,
            Self::PlatformAccount(_) => SubmissionKind::PlatformAccount,
        }
    }
}

/// The abstract unit of user-submitted content subject to moderation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub owner_id: OwnerId,
    pub status: Status,
    /// Present iff `status == Rejected`; cleared on resubmission.
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub payload: Payload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    pub fn kind(&self) -> SubmissionKind {
        self.payload.kind()
    }
}
