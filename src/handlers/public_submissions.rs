use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::error::{AppError, AppResult};
use crate::models::{AppState, Song};
use crate::services::songs;
use crate::services::submission_requests::SONG_BANNED;
use crate::utils::extract::JsonBody;
use crate::utils::validator::validate_link;

#[derive(Debug, Deserialize)]
pub struct PublicSubmissionPayload {
    #[serde(default)]
    pub link: String,
}

/// Lets any viewer suggest a YouTube or Spotify link.
///
/// POST /public-submissions
///
/// # Returns
///
/// - `201 Created` - The new or voted song
/// - `400 Bad Request` - Missing or unsupported link, or a banned song
/// - `502 Bad Gateway` - The provider could not describe the link
#[instrument(skip(state, payload), fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn submit_song(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<PublicSubmissionPayload>,
) -> AppResult<(StatusCode, Json<Song>)> {
    let link = validate_link(&payload.link)?;
    let candidate = state.metadata_service.fetch(&link).await?;

    let song = songs::add_or_increment_song(&state.db_pool, &candidate)
        .await?
        .ok_or_else(|| {
            warn!(link = %link, "Viewer submitted a banned song");
            AppError::BadRequest(SONG_BANNED)
        })?;

    Ok((StatusCode::CREATED, Json(song)))
}
