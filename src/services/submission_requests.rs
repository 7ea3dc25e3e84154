//! # Submission Request Ledger
//!
//! A moderator answers a viewer's `!reco` with a request token; the viewer
//! then has a limited time to redeem it with a link. A request is active
//! while it is neither consumed nor past `expires_at`. Expired rows are
//! deleted by [`expire_old_requests`], which every ledger route runs first.
//!
//! Time comparisons use the application clock, passed in as `now`.

use std::time::Duration;

use rand::{Rng, distr::Alphanumeric};
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::models::song::{Song, SongCandidate};
use crate::models::submission_request::SubmissionRequest;
use crate::services::songs::add_or_increment_in;
use crate::utils::constant::SUBMISSION_TOKEN_LENGTH;

pub const REQUEST_NOT_FOUND: &str = "Demande introuvable ou expirée";
pub const SONG_BANNED: &str = "Chanson bannie";

fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SUBMISSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[instrument(skip(db_pool), err)]
pub async fn create_request(
    db_pool: &PgPool,
    twitch_user: &str,
    comment: Option<&str>,
    ttl: Duration,
    now: OffsetDateTime,
) -> AppResult<SubmissionRequest> {
    let expires_at = now + ttl;

    let request = sqlx::query_as::<_, SubmissionRequest>(
        r#"
        INSERT INTO submission_requests (token, twitch_user, comment, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, token, twitch_user, comment, created_at, expires_at, consumed_at
        "#,
    )
    .bind(generate_token())
    .bind(twitch_user)
    .bind(comment)
    .bind(now)
    .bind(expires_at)
    .fetch_one(db_pool)
    .await?;

    info!(request_id = request.id, "Submission request created");
    Ok(request)
}

/// Active requests, oldest first.
pub async fn active_requests(
    db_pool: &PgPool,
    now: OffsetDateTime,
) -> AppResult<Vec<SubmissionRequest>> {
    let requests = sqlx::query_as::<_, SubmissionRequest>(
        r#"
        SELECT id, token, twitch_user, comment, created_at, expires_at, consumed_at
        FROM submission_requests
        WHERE consumed_at IS NULL AND expires_at > $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(now)
    .fetch_all(db_pool)
    .await?;
    Ok(requests)
}

pub async fn find_active(
    db_pool: &PgPool,
    token: &str,
    now: OffsetDateTime,
) -> AppResult<Option<SubmissionRequest>> {
    let request = sqlx::query_as::<_, SubmissionRequest>(
        r#"
        SELECT id, token, twitch_user, comment, created_at, expires_at, consumed_at
        FROM submission_requests
        WHERE token = $1 AND consumed_at IS NULL AND expires_at > $2
        "#,
    )
    .bind(token)
    .bind(now)
    .fetch_optional(db_pool)
    .await?;
    Ok(request)
}

/// Redeems request `token` with `candidate`.
///
/// The request row is locked for the whole transaction, so two viewers
/// racing on one token cannot both be served. A banned candidate leaves the
/// request active.
///
/// # Errors
///
/// - [`AppError::NotFound`] when the request is unknown, expired or consumed
/// - [`AppError::BadRequest`] when a ban rule matches the candidate
#[instrument(skip(db_pool, candidate), fields(link = %candidate.link), err)]
pub async fn fulfill(
    db_pool: &PgPool,
    token: &str,
    candidate: &SongCandidate,
    now: OffsetDateTime,
) -> AppResult<Song> {
    let mut tx = db_pool.begin().await?;

    let request_id = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT id FROM submission_requests
        WHERE token = $1 AND consumed_at IS NULL AND expires_at > $2
        FOR UPDATE
        "#,
    )
    .bind(token)
    .bind(now)
    .fetch_optional(tx.as_mut())
    .await?
    .ok_or_else(|| {
        debug!("Request vanished before fulfillment");
        AppError::NotFound(REQUEST_NOT_FOUND)
    })?;

    let Some(song) = add_or_increment_in(tx.as_mut(), candidate).await? else {
        tx.rollback().await?;
        warn!(request_id, "Submission matched a ban rule");
        return Err(AppError::BadRequest(SONG_BANNED));
    };

    sqlx::query("UPDATE submission_requests SET consumed_at = $2 WHERE id = $1")
        .bind(request_id)
        .bind(now)
        .execute(tx.as_mut())
        .await?;

    tx.commit().await?;
    info!(request_id, song_id = song.id, "Submission request fulfilled");
    Ok(song)
}

/// Deletes requests whose expiry has passed and returns how many.
pub async fn expire_old_requests(db_pool: &PgPool, now: OffsetDateTime) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM submission_requests WHERE expires_at <= $1")
        .bind(now)
        .execute(db_pool)
        .await?;

    let deleted = result.rows_affected();
    if deleted > 0 {
        debug!(deleted, "Expired submission requests swept");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_alphanumeric_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), SUBMISSION_TOKEN_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
