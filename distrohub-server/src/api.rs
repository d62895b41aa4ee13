//! HTTP surface of the moderation service.
//!
//! Routes are grouped per submission kind under `/api/{kind}`, with the
//! moderation queues under `/api/moderation`. Kind slugs in the path map
//! to `SubmissionKind`; the request body carries only the kind's payload
//! fields, so clients never spell the kind twice.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use distrohub_core::{
    AcceptInput, OwnerId, Payload, PlatformAccountPayload, PromoReleasePayload, ReleasePayload,
    SmartlinkPayload, Status, Submission, SubmissionId, SubmissionKind, VideoPayload,
};

use crate::service::{ServiceError, StudioQueue};
use crate::AppState;

/// Map a URL slug to a submission kind.
fn kind_from_slug(slug: &str) -> Option<SubmissionKind> {
    match slug {
        "releases" => Some(SubmissionKind::Release),
        "smartlinks" => Some(SubmissionKind::Smartlink),
        "promo" => Some(SubmissionKind::PromoRelease),
        "videos" => Some(SubmissionKind::Video),
        "platform-accounts" => Some(SubmissionKind::PlatformAccount),
        _ => None,
    }
}

/// Deserialize a bare payload object as the given kind.
fn payload_from_value(kind: SubmissionKind, value: Value) -> Result<Payload, ApiError> {
    let result = match kind {
        SubmissionKind::Release => {
            serde_json::from_value::<ReleasePayload>(value).map(Payload::Release)
        }
        SubmissionKind::Smartlink => {
            serde_json::from_value::<SmartlinkPayload>(value).map(Payload::Smartlink)
        }
        SubmissionKind::PromoRelease => {
            serde_json::from_value::<PromoReleasePayload>(value).map(Payload::PromoRelease)
        }
        SubmissionKind::Video => serde_json::from_value::<VideoPayload>(value).map(Payload::Video),
        SubmissionKind::PlatformAccount => {
            serde_json::from_value::<PlatformAccountPayload>(value).map(Payload::PlatformAccount)
        }
    };
    result.map_err(|e| ApiError::BadPayload(e.to_string()))
}

/// HTTP-facing errors with their status mapping.
#[derive(Debug)]
pub enum ApiError {
    UnknownKind(String),
    BadPayload(String),
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::UnknownKind(slug) => (
                StatusCode::NOT_FOUND,
                format!("unknown submission kind `{}`", slug),
            ),
            ApiError::BadPayload(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Service(err) => match err {
                ServiceError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
                ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                ServiceError::KindMismatch { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                ServiceError::Persistence(_) => {
                    error!(error = %err, "storage failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal storage error".to_string(),
                    )
                }
            },
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CreateSubmission {
    owner_id: String,
    payload: Value,
}

#[derive(Debug, Deserialize, Default)]
struct AcceptBody {
    #[serde(default)]
    upc: Option<String>,
    #[serde(default)]
    track_isrc: Option<BTreeMap<usize, String>>,
    #[serde(default)]
    smartlink_url: Option<String>,
}

impl AcceptBody {
    fn into_input(self, kind: SubmissionKind) -> AcceptInput {
        match kind {
            SubmissionKind::Release => AcceptInput::Release {
                upc: self.upc,
                track_isrc: self.track_isrc.unwrap_or_default(),
            },
            SubmissionKind::Smartlink => AcceptInput::Smartlink {
                smartlink_url: self.smartlink_url.unwrap_or_default(),
            },
            _ => AcceptInput::None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RejectBody {
    reason: String,
}

#[derive(Debug, Deserialize, Default)]
struct ListParams {
    owner_id: Option<String>,
    status: Option<Status>,
}

/// Build the API router. Callers attach state and middleware.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/api/moderation/studio", get(studio_queue))
        .route("/api/moderation/:kind", get(moderation_queue))
        .route("/api/:kind", get(list_submissions).post(create_submission))
        .route("/api/:kind/:id", get(get_submission).put(update_submission))
        .route("/api/:kind/:id/submit", post(submit_submission))
        .route("/api/:kind/:id/accept", post(accept_submission))
        .route("/api/:kind/:id/reject", post(reject_submission))
        .route("/api/:kind/:id/withdraw", post(withdraw_submission))
}

async fn health() -> &'static str {
    "ok"
}

async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    let kind = kind_from_slug(&kind).ok_or(ApiError::UnknownKind(kind))?;
    let owner = params.owner_id.map(OwnerId::from);
    let submissions = state
        .service
        .list(kind, owner.as_ref(), params.status)
        .await?;
    Ok(Json(submissions))
}

async fn create_submission(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(body): Json<CreateSubmission>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    let kind = kind_from_slug(&kind).ok_or(ApiError::UnknownKind(kind))?;
    let payload = payload_from_value(kind, body.payload)?;
    let submission = state
        .service
        .create(OwnerId::from(body.owner_id), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

async fn get_submission(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Submission>, ApiError> {
    let kind = kind_from_slug(&kind).ok_or(ApiError::UnknownKind(kind))?;
    let submission = state.service.get(kind, &SubmissionId(id)).await?;
    Ok(Json(submission))
}

async fn update_submission(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Submission>, ApiError> {
    let kind = kind_from_slug(&kind).ok_or(ApiError::UnknownKind(kind))?;
    let payload = payload_from_value(kind, body)?;
    let submission = state
        .service
        .update_payload(kind, &SubmissionId(id), payload)
        .await?;
    Ok(Json(submission))
}

async fn submit_submission(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Submission>, ApiError> {
    let kind = kind_from_slug(&kind).ok_or(ApiError::UnknownKind(kind))?;
    let submission = state.service.submit(kind, &SubmissionId(id)).await?;
    Ok(Json(submission))
}

async fn accept_submission(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
    body: Option<Json<AcceptBody>>,
) -> Result<Json<Submission>, ApiError> {
    let kind = kind_from_slug(&kind).ok_or(ApiError::UnknownKind(kind))?;
    let input = body.map(|Json(b)| b).unwrap_or_default().into_input(kind);
    let submission = state.service.accept(kind, &SubmissionId(id), input).await?;
    Ok(Json(submission))
}

async fn reject_submission(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
    Json(body): Json<RejectBody>,
) -> Result<Json<Submission>, ApiError> {
    let kind = kind_from_slug(&kind).ok_or(ApiError::UnknownKind(kind))?;
    let submission = state
        .service
        .reject(kind, &SubmissionId(id), &body.reason)
        .await?;
    Ok(Json(submission))
}

async fn withdraw_submission(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Submission>, ApiError> {
    let kind = kind_from_slug(&kind).ok_or(ApiError::UnknownKind(kind))?;
    let submission = state.service.withdraw(kind, &SubmissionId(id)).await?;
    Ok(Json(submission))
}

async fn moderation_queue(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    let kind = kind_from_slug(&kind).ok_or(ApiError::UnknownKind(kind))?;
    let submissions = state.service.moderation_queue(kind).await?;
    Ok(Json(submissions))
}

async fn studio_queue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StudioQueue>, ApiError> {
    let queue = state.service.studio_queue().await?;
    Ok(Json(queue))
}
