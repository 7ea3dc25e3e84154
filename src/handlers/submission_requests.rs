//! # Submission Request Handlers
//!
//! Moderators open a request for a viewer; the viewer redeems it once,
//! before it expires, with a YouTube or Spotify link. Every route sweeps
//! expired requests first.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::submission_request::{SubmissionFulfillPayload, SubmissionRequestCreate};
use crate::models::{AppState, Song, SubmissionRequestPublic};
use crate::services::submission_requests::{self as ledger, REQUEST_NOT_FOUND};
use crate::utils::extract::JsonBody;
use crate::utils::validator::{blank_to_none, validate_link};

/// POST /submission-requests
///
/// # Returns
///
/// - `200 OK` - The request and its token
/// - `400 Bad Request` - Empty viewer name, or fields too long
#[instrument(
    skip(state, payload),
    fields(twitch_user = %payload.twitch_user, request_id = %uuid::Uuid::new_v4())
)]
pub async fn create_submission_request(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<SubmissionRequestCreate>,
) -> AppResult<Json<SubmissionRequestPublic>> {
    let payload = SubmissionRequestCreate {
        twitch_user: payload.twitch_user.trim().to_string(),
        comment: blank_to_none(payload.comment),
    };
    payload.validate().map_err(|e| {
        warn!(error = %e, "Invalid submission request payload");
        AppError::BadRequest("Utilisateur Twitch requis (255 caractères max), commentaire de 500 caractères max.")
    })?;

    let now = OffsetDateTime::now_utc();
    ledger::expire_old_requests(&state.db_pool, now).await?;

    let request = ledger::create_request(
        &state.db_pool,
        &payload.twitch_user,
        payload.comment.as_deref(),
        state.config.submission_ttl,
        now,
    )
    .await?;

    Ok(Json(request.into()))
}

/// GET /submission-requests/active
#[instrument(skip(state), fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn list_active_requests(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<SubmissionRequestPublic>>> {
    let now = OffsetDateTime::now_utc();
    ledger::expire_old_requests(&state.db_pool, now).await?;

    let requests = ledger::active_requests(&state.db_pool, now).await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// GET /submission-requests/{token}
#[instrument(skip(state, token), fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn get_submission_request(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> AppResult<Json<SubmissionRequestPublic>> {
    let now = OffsetDateTime::now_utc();
    ledger::expire_old_requests(&state.db_pool, now).await?;

    ledger::find_active(&state.db_pool, &token, now)
        .await?
        .map(|request| Json(request.into()))
        .ok_or(AppError::NotFound(REQUEST_NOT_FOUND))
}

/// Redeems a request with a link.
///
/// POST /submission-requests/{token}/submit
///
/// # Returns
///
/// - `200 OK` - The new or voted song; the request is consumed
/// - `400 Bad Request` - Unsupported link, or a banned song
/// - `404 Not Found` - Unknown, expired or already used request
/// - `502 Bad Gateway` - The provider could not describe the link
#[instrument(skip(state, token, payload), fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn fulfill_submission_request(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    JsonBody(payload): JsonBody<SubmissionFulfillPayload>,
) -> AppResult<Json<Song>> {
    let now = OffsetDateTime::now_utc();
    ledger::expire_old_requests(&state.db_pool, now).await?;

    if ledger::find_active(&state.db_pool, &token, now).await?.is_none() {
        return Err(AppError::NotFound(REQUEST_NOT_FOUND));
    }

    let link = validate_link(&payload.link)?;
    let candidate = state.metadata_service.fetch(&link).await?;

    let song = ledger::fulfill(&state.db_pool, &token, &candidate, OffsetDateTime::now_utc()).await?;
    info!(song_id = song.id, "Viewer redeemed a submission request");
    Ok(Json(song))
}
