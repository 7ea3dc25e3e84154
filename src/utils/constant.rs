//! # Application Constants
//!
//! This module defines configuration constants used throughout the reco backend.
//! Values that operators may want to tune are read from the environment in
//! [`crate::config`]; the constants here are their defaults or fixed limits.

use std::time::Duration;

/// Default lifetime of an admin session token, in minutes
pub const DEFAULT_ADMIN_TOKEN_TTL_MINUTES: u64 = 12 * 60;

/// Default lifetime of a viewer submission request, in minutes
pub const DEFAULT_SUBMISSION_TTL_MINUTES: u64 = 10;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Timeout applied to every outbound call (OAuth providers, oEmbed)
pub const UPSTREAM_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// JWKS cache lifetime used when Google omits `Cache-Control: max-age`
pub const DEFAULT_JWKS_TTL: Duration = Duration::from_secs(60 * 60);

/// Number of random characters in a submission request token
pub const SUBMISSION_TOKEN_LENGTH: usize = 16;

/// Role claim carried by every admin session token
pub const ADMIN_ROLE: &str = "admin";

/// Fallback title when a provider does not return one
pub const UNKNOWN_TITLE: &str = "Inconnu";

/// Fallback artist when a provider does not return one
pub const UNKNOWN_ARTIST: &str = "Artiste inconnu";

pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
pub const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

pub const TWITCH_OAUTH_BASE_URL: &str = "https://id.twitch.tv/oauth2";
pub const TWITCH_HELIX_BASE_URL: &str = "https://api.twitch.tv/helix";

pub const YOUTUBE_OEMBED_URL: &str = "https://www.youtube.com/oembed";
pub const SPOTIFY_OEMBED_URL: &str = "https://open.spotify.com/oembed";
