//! # Song Queue
//!
//! Songs are deduplicated on insert: the same link, or the same normalized
//! title and artist, adds a vote to the existing song instead of a new row.

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, instrument};

use crate::error::AppResult;
use crate::models::ban_rule::SongRef;
use crate::models::song::{Song, SongCandidate};
use crate::services::ban_rules::is_banned;
use crate::utils::text::normalize;

#[instrument(skip_all)]
pub async fn list_songs(db_pool: &PgPool) -> AppResult<Vec<Song>> {
    let songs = sqlx::query_as::<_, Song>(
        r#"
        SELECT id, title, artist, link, thumbnail, votes
        FROM songs
        ORDER BY votes DESC, id ASC
        "#,
    )
    .fetch_all(db_pool)
    .await?;
    Ok(songs)
}

/// Adds `candidate` to the queue or votes for its duplicate.
///
/// Returns `None` when a ban rule matches the candidate.
#[instrument(skip(db_pool), fields(link = %candidate.link), err)]
pub async fn add_or_increment_song(
    db_pool: &PgPool,
    candidate: &SongCandidate,
) -> AppResult<Option<Song>> {
    let mut tx = db_pool.begin().await?;
    let song = add_or_increment_in(tx.as_mut(), candidate).await?;
    tx.commit().await?;
    Ok(song)
}

/// Transaction body of [`add_or_increment_song`], shared with request
/// fulfillment.
pub(crate) async fn add_or_increment_in(
    conn: &mut PgConnection,
    candidate: &SongCandidate,
) -> Result<Option<Song>, sqlx::Error> {
    let song_ref = SongRef {
        title: &candidate.title,
        artist: &candidate.artist,
        link: &candidate.link,
    };
    if is_banned(&mut *conn, song_ref).await? {
        info!("Banned song rejected");
        return Ok(None);
    }

    if let Some(song) = increment_where_link(&mut *conn, &candidate.link).await? {
        debug!(song_id = song.id, "Existing link voted");
        return Ok(Some(song));
    }

    if let Some(duplicate_id) = find_duplicate(&mut *conn, candidate).await? {
        let song = sqlx::query_as::<_, Song>(
            r#"
            UPDATE songs SET votes = votes + 1
            WHERE id = $1
            RETURNING id, title, artist, link, thumbnail, votes
            "#,
        )
        .bind(duplicate_id)
        .fetch_one(&mut *conn)
        .await?;
        debug!(song_id = song.id, "Same title and artist voted");
        return Ok(Some(song));
    }

    // A concurrent insert of the same link turns into a vote.
    let song = sqlx::query_as::<_, Song>(
        r#"
        INSERT INTO songs (title, artist, link, thumbnail, votes)
        VALUES ($1, $2, $3, $4, 1)
        ON CONFLICT (link) DO UPDATE SET votes = songs.votes + 1
        RETURNING id, title, artist, link, thumbnail, votes
        "#,
    )
    .bind(&candidate.title)
    .bind(&candidate.artist)
    .bind(&candidate.link)
    .bind(&candidate.thumbnail)
    .fetch_one(conn)
    .await?;

    info!(song_id = song.id, "Song added");
    Ok(Some(song))
}

async fn increment_where_link(
    conn: &mut PgConnection,
    link: &str,
) -> Result<Option<Song>, sqlx::Error> {
    sqlx::query_as::<_, Song>(
        r#"
        UPDATE songs SET votes = votes + 1
        WHERE link = $1
        RETURNING id, title, artist, link, thumbnail, votes
        "#,
    )
    .bind(link)
    .fetch_optional(conn)
    .await
}

/// Scans stored songs for the same normalized title and artist.
///
/// A candidate whose title normalizes to nothing never has a duplicate.
async fn find_duplicate(
    conn: &mut PgConnection,
    candidate: &SongCandidate,
) -> Result<Option<i32>, sqlx::Error> {
    let title_key = normalize(&candidate.title);
    if title_key.is_empty() {
        return Ok(None);
    }
    let artist_key = normalize(&candidate.artist);

    let songs = sqlx::query_as::<_, Song>(
        "SELECT id, title, artist, link, thumbnail, votes FROM songs ORDER BY id",
    )
    .fetch_all(conn)
    .await?;

    Ok(songs
        .into_iter()
        .find(|song| normalize(&song.title) == title_key && normalize(&song.artist) == artist_key)
        .map(|song| song.id))
}

/// Returns whether a song was deleted.
#[instrument(skip(db_pool), err)]
pub async fn delete_song(db_pool: &PgPool, song_id: i32) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM songs WHERE id = $1")
        .bind(song_id)
        .execute(db_pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Adds one vote; `None` for an unknown id.
#[instrument(skip(db_pool), err)]
pub async fn increment_vote(db_pool: &PgPool, song_id: i32) -> AppResult<Option<Song>> {
    let song = sqlx::query_as::<_, Song>(
        r#"
        UPDATE songs SET votes = votes + 1
        WHERE id = $1
        RETURNING id, title, artist, link, thumbnail, votes
        "#,
    )
    .bind(song_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(song)
}
