//! # Ban Rule Store
//!
//! CRUD for ban rules. Creating or updating a rule also sweeps the queue:
//! a link rule deletes the song with that exact link, a fuzzy rule deletes
//! every stored song it matches. The rule write and its sweep share one
//! transaction.

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, instrument};

use crate::error::AppResult;
use crate::models::ban_rule::{BanRule, BanRuleFields, SongRef};
use crate::models::song::Song;

#[instrument(skip_all)]
pub async fn list_ban_rules(db_pool: &PgPool) -> AppResult<Vec<BanRule>> {
    let rules = sqlx::query_as::<_, BanRule>(
        "SELECT id, title, artist, link FROM ban_rules ORDER BY id",
    )
    .fetch_all(db_pool)
    .await?;
    Ok(rules)
}

#[instrument(skip(db_pool), err)]
pub async fn add_ban_rule(db_pool: &PgPool, fields: BanRuleFields) -> AppResult<BanRule> {
    let mut tx = db_pool.begin().await?;

    let rule = sqlx::query_as::<_, BanRule>(
        r#"
        INSERT INTO ban_rules (title, artist, link)
        VALUES ($1, $2, $3)
        RETURNING id, title, artist, link
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.artist)
    .bind(&fields.link)
    .fetch_one(tx.as_mut())
    .await?;

    let removed = sweep_matching_songs(tx.as_mut(), &fields).await?;
    tx.commit().await?;

    info!(rule_id = rule.id, removed, "Ban rule created");
    Ok(rule)
}

/// Replaces every field of rule `rule_id`, then sweeps with the new filters.
///
/// Returns `None` when no such rule exists.
#[instrument(skip(db_pool), err)]
pub async fn update_ban_rule(
    db_pool: &PgPool,
    rule_id: i32,
    fields: BanRuleFields,
) -> AppResult<Option<BanRule>> {
    let mut tx = db_pool.begin().await?;

    let Some(rule) = sqlx::query_as::<_, BanRule>(
        r#"
        UPDATE ban_rules
        SET title = $2, artist = $3, link = $4
        WHERE id = $1
        RETURNING id, title, artist, link
        "#,
    )
    .bind(rule_id)
    .bind(&fields.title)
    .bind(&fields.artist)
    .bind(&fields.link)
    .fetch_optional(tx.as_mut())
    .await?
    else {
        debug!("Ban rule not found");
        return Ok(None);
    };

    let removed = sweep_matching_songs(tx.as_mut(), &fields).await?;
    tx.commit().await?;

    info!(rule_id, removed, "Ban rule updated");
    Ok(Some(rule))
}

/// Returns whether a rule was deleted. Songs removed by the rule stay removed.
#[instrument(skip(db_pool), err)]
pub async fn delete_ban_rule(db_pool: &PgPool, rule_id: i32) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM ban_rules WHERE id = $1")
        .bind(rule_id)
        .execute(db_pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// True when any stored rule matches the song.
pub async fn is_banned(conn: &mut PgConnection, song: SongRef<'_>) -> Result<bool, sqlx::Error> {
    let rules = sqlx::query_as::<_, BanRule>("SELECT id, title, artist, link FROM ban_rules")
        .fetch_all(conn)
        .await?;

    let banned = rules.iter().find(|rule| rule.matches(song));
    if let Some(rule) = banned {
        debug!(rule_id = rule.id, "Song matches a ban rule");
    }
    Ok(banned.is_some())
}

/// Deletes the songs `fields` matches and returns how many were removed.
async fn sweep_matching_songs(
    conn: &mut PgConnection,
    fields: &BanRuleFields,
) -> Result<u64, sqlx::Error> {
    if let Some(link) = &fields.link {
        let result = sqlx::query("DELETE FROM songs WHERE link = $1")
            .bind(link)
            .execute(conn)
            .await?;
        return Ok(result.rows_affected());
    }

    let songs = sqlx::query_as::<_, Song>(
        "SELECT id, title, artist, link, thumbnail, votes FROM songs FOR UPDATE",
    )
    .fetch_all(&mut *conn)
    .await?;

    let doomed: Vec<i32> = songs
        .iter()
        .filter(|song| {
            fields.matches(SongRef {
                title: &song.title,
                artist: &song.artist,
                link: &song.link,
            })
        })
        .map(|song| song.id)
        .collect();

    if doomed.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query("DELETE FROM songs WHERE id = ANY($1)")
        .bind(&doomed)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
