//! # Text Input Validation Utilities
//!
//! This module provides validation utilities for user input: song links
//! accepted on viewer-facing endpoints and the admin login e-mail format.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::error::{AppError, AppResult};

/// Links to YouTube videos, `youtu.be` short links included.
pub static YOUTUBE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.be)/")
        .case_insensitive(true)
        .build()
        .expect("YouTube link pattern is valid")
});

/// Links to Spotify tracks, albums or playlists.
pub static SPOTIFY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^(https?://)?(open\.)?spotify\.com/")
        .case_insensitive(true)
        .build()
        .expect("Spotify link pattern is valid")
});

/// Loose e-mail shape check used by the password login form.
///
/// # Examples
///
/// - `admin@example.com` ✓ Valid
/// - `admin@example` ✗ Invalid
/// - `ad min@example.com` ✗ Invalid
pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("E-mail pattern is valid")
});

/// Trims `link` and checks it points at YouTube or Spotify.
///
/// # Returns
///
/// The trimmed link.
///
/// # Errors
///
/// - [`AppError::BadRequest`] when the link is empty or from another host
pub fn validate_link(link: &str) -> AppResult<String> {
    let cleaned = link.trim();
    if cleaned.is_empty() {
        warn!("Empty song link submitted");
        return Err(AppError::BadRequest("Le lien est requis."));
    }

    if !(YOUTUBE_REGEX.is_match(cleaned) || SPOTIFY_REGEX.is_match(cleaned)) {
        warn!(link = %cleaned, "Unsupported song link submitted");
        return Err(AppError::BadRequest(
            "Seuls les liens YouTube et Spotify sont autorisés.",
        ));
    }

    Ok(cleaned.to_string())
}

/// Trims an optional text field and maps blank values to `None`.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
