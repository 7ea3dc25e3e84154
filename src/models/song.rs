use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// A song in the request queue, ranked by votes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Song {
    pub id: i32,
    pub title: String,
    pub artist: String,
    pub link: String,
    pub thumbnail: Option<String>,
    pub votes: i32,
}

/// A song as submitted, before deduplication.
///
/// Built either from an admin payload or from provider metadata.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct SongCandidate {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(min = 1, max = 300))]
    pub artist: String,
    #[validate(length(min = 1, max = 2048))]
    pub link: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl SongCandidate {
    /// Trims every field and validates lengths.
    ///
    /// # Errors
    ///
    /// - [`AppError::BadRequest`] when a required field is blank or too long
    pub fn sanitized(self) -> AppResult<Self> {
        let candidate = Self {
            title: self.title.trim().to_string(),
            artist: self.artist.trim().to_string(),
            link: self.link.trim().to_string(),
            thumbnail: crate::utils::validator::blank_to_none(self.thumbnail),
        };
        candidate
            .validate()
            .map_err(|_| AppError::BadRequest("Titre, artiste et lien sont requis."))?;
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, artist: &str, link: &str) -> SongCandidate {
        SongCandidate {
            title: title.into(),
            artist: artist.into(),
            link: link.into(),
            thumbnail: Some("  ".into()),
        }
    }

    #[test]
    fn sanitized_trims_fields() {
        let c = candidate("  Valentine ", " Måneskin", " https://youtu.be/x ")
            .sanitized()
            .unwrap();
        assert_eq!(c.title, "Valentine");
        assert_eq!(c.artist, "Måneskin");
        assert_eq!(c.link, "https://youtu.be/x");
        assert_eq!(c.thumbnail, None);
    }

    #[test]
    fn sanitized_rejects_blank_fields() {
        assert!(candidate(" ", "a", "l").sanitized().is_err());
        assert!(candidate("t", "", "l").sanitized().is_err());
        assert!(candidate("t", "a", "  ").sanitized().is_err());
    }
}
