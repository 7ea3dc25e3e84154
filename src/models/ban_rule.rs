//! # Ban Rules
//!
//! A ban rule filters songs by exact link or by fuzzy title/artist. Fuzzy
//! fields are compared on normalized keys (see [`crate::utils::text`]) with a
//! containment test in both directions, so a rule for "zitti e buoni" also
//! catches "Zitti e Buòni (Live)".

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::utils::text::{is_unknown_artist, keys_overlap, normalize};
use crate::utils::validator::blank_to_none;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct BanRule {
    pub id: i32,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub link: Option<String>,
}

/// Body of `POST /ban` and `PUT /ban/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BanRulePayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// A payload that passed validation: blank fields are `None` and at least
/// one field is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanRuleFields {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub link: Option<String>,
}

impl BanRulePayload {
    /// # Errors
    ///
    /// - [`AppError::BadRequest`] when every field is blank
    pub fn validated(self) -> AppResult<BanRuleFields> {
        let fields = BanRuleFields {
            title: blank_to_none(self.title),
            artist: blank_to_none(self.artist),
            link: blank_to_none(self.link),
        };

        if fields.title.is_none() && fields.artist.is_none() && fields.link.is_none() {
            warn!("Ban rule without any field rejected");
            return Err(AppError::BadRequest("Au moins un champ doit être renseigné"));
        }
        Ok(fields)
    }
}

/// Borrowed view of the song attributes a rule is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct SongRef<'a> {
    pub title: &'a str,
    pub artist: &'a str,
    pub link: &'a str,
}

impl BanRuleFields {
    /// Decides whether this rule bans `song`.
    pub fn matches(&self, song: SongRef<'_>) -> bool {
        rule_matches(
            self.title.as_deref(),
            self.artist.as_deref(),
            self.link.as_deref(),
            song,
        )
    }
}

impl BanRule {
    pub fn matches(&self, song: SongRef<'_>) -> bool {
        rule_matches(
            self.title.as_deref(),
            self.artist.as_deref(),
            self.link.as_deref(),
            song,
        )
    }
}

/// - With a link, only an exact link match counts.
/// - Otherwise title and artist must both match; an unset field matches
///   anything, and a blank or placeholder song artist matches any artist.
fn rule_matches(
    title: Option<&str>,
    artist: Option<&str>,
    link: Option<&str>,
    song: SongRef<'_>,
) -> bool {
    if let Some(link) = link {
        return song.link == link;
    }

    let title_matches =
        title.is_none_or(|title| keys_overlap(&normalize(title), &normalize(song.title)));

    let artist_matches = artist.is_none_or(|artist| {
        is_unknown_artist(song.artist) || keys_overlap(&normalize(artist), &normalize(song.artist))
    });

    title_matches && artist_matches
}
