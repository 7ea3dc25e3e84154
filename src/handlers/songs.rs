//! # Song Queue Handlers
//!
//! Listing and voting are public. Adding a song by hand and deleting one
//! are admin operations.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::models::{AppState, Song, SongCandidate};
use crate::services::songs;
use crate::services::submission_requests::SONG_BANNED;
use crate::utils::extract::JsonBody;

const SONG_NOT_FOUND: &str = "Chanson introuvable";

/// Lists the queue, most voted first.
///
/// GET /songs
#[instrument(skip(state), fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn list_songs(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Song>>> {
    let songs = songs::list_songs(&state.db_pool).await?;
    Ok(Json(songs))
}

/// Adds a song with admin-provided metadata, or votes for its duplicate.
///
/// POST /songs
///
/// # Returns
///
/// - `200 OK` - The new or voted song
/// - `400 Bad Request` - Blank fields, or a ban rule matches
#[instrument(
    skip(state, payload),
    fields(link = %payload.link, request_id = %uuid::Uuid::new_v4())
)]
pub async fn add_song(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<SongCandidate>,
) -> AppResult<Json<Song>> {
    let candidate = payload.sanitized()?;

    let song = songs::add_or_increment_song(&state.db_pool, &candidate)
        .await?
        .ok_or_else(|| {
            warn!("Admin tried to add a banned song");
            AppError::BadRequest(SONG_BANNED)
        })?;

    Ok(Json(song))
}

/// POST /songs/{id}/vote
#[instrument(skip(state), fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn vote_song(
    State(state): State<Arc<AppState>>,
    Path(song_id): Path<i32>,
) -> AppResult<Json<Song>> {
    let song = songs::increment_vote(&state.db_pool, song_id)
        .await?
        .ok_or(AppError::NotFound(SONG_NOT_FOUND))?;
    Ok(Json(song))
}

/// DELETE /songs/{id}
#[instrument(skip(state), fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn delete_song(
    State(state): State<Arc<AppState>>,
    Path(song_id): Path<i32>,
) -> AppResult<StatusCode> {
    if !songs::delete_song(&state.db_pool, song_id).await? {
        return Err(AppError::NotFound(SONG_NOT_FOUND));
    }
    info!(song_id, "Song deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
