//! # Song Metadata
//!
//! Turns a viewer's YouTube or Spotify link into a [`SongCandidate`].
//!
//! ## Implementations
//!
//! - [`OEmbedMetadataService`] - queries the providers' public oEmbed
//!   endpoints; for Spotify it also reads the embed player page, whose
//!   embedded JSON names the track and its first artist
//!
//! Tests inject their own [`MetadataService`] through
//! [`crate::app_with_metadata_service`].

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::models::song::SongCandidate;
use crate::utils::constant::{
    SPOTIFY_OEMBED_URL, UNKNOWN_ARTIST, UNKNOWN_TITLE, YOUTUBE_OEMBED_URL,
};
use crate::utils::text::normalize;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("unsupported link")]
    Unsupported,
    #[error("provider answered with an error: {0}")]
    Upstream(#[source] reqwest::Error),
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("invalid provider response: {0}")]
    InvalidResponse(#[source] reqwest::Error),
}

impl MetadataError {
    pub fn detail(&self) -> &'static str {
        match self {
            MetadataError::Unsupported => "Lien non supporté",
            MetadataError::Upstream(_) => "Impossible de récupérer les informations de la chanson",
            MetadataError::Network(_) => "Erreur réseau lors de la récupération des métadonnées",
            MetadataError::InvalidResponse(_) => "Réponse invalide du fournisseur",
        }
    }
}

/// Trait for song metadata lookups
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Fetches title, artist and thumbnail for `link`.
    ///
    /// The returned candidate carries `link` unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`MetadataError`] when the link belongs to no known
    /// provider or the provider cannot be queried.
    async fn fetch(&self, link: &str) -> Result<SongCandidate, MetadataError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    YouTube,
    Spotify,
}

fn provider_for(link: &str) -> Option<Provider> {
    let lowered = link.to_lowercase();
    if lowered.contains("youtube") || lowered.contains("youtu.be") {
        Some(Provider::YouTube)
    } else if lowered.contains("spotify") {
        Some(Provider::Spotify)
    } else {
        None
    }
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    html: Option<String>,
}

pub struct OEmbedMetadataService {
    http_client: reqwest::Client,
    youtube_endpoint: String,
    spotify_endpoint: String,
}

impl OEmbedMetadataService {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self::with_endpoints(http_client, YOUTUBE_OEMBED_URL, SPOTIFY_OEMBED_URL)
    }

    pub fn with_endpoints(
        http_client: reqwest::Client,
        youtube_endpoint: impl Into<String>,
        spotify_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            youtube_endpoint: youtube_endpoint.into(),
            spotify_endpoint: spotify_endpoint.into(),
        }
    }

    async fn oembed(&self, endpoint: &str, link: &str) -> Result<OEmbedResponse, MetadataError> {
        let response = self
            .http_client
            .get(endpoint)
            .query(&[("url", link), ("format", "json")])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Network error while fetching oEmbed");
                MetadataError::Network(e)
            })?
            .error_for_status()
            .map_err(|e| {
                warn!(error = %e, "oEmbed provider returned an error");
                MetadataError::Upstream(e)
            })?;

        response.json::<OEmbedResponse>().await.map_err(|e| {
            warn!(error = %e, "oEmbed response is not valid JSON");
            MetadataError::InvalidResponse(e)
        })
    }

    /// Reads track and artist names from the Spotify embed player.
    async fn spotify_embed(&self, html: &str) -> Option<(Option<String>, Option<String>)> {
        let src = iframe_src(html)?;
        let page = match self.http_client.get(src).send().await {
            Ok(res) => res.error_for_status().ok()?.text().await.ok()?,
            Err(e) => {
                debug!(error = %e, "Spotify embed page unavailable");
                return None;
            }
        };
        Some((spotify_track_name(&page), spotify_first_artist(&page)))
    }
}

#[async_trait]
impl MetadataService for OEmbedMetadataService {
    #[instrument(skip(self))]
    async fn fetch(&self, link: &str) -> Result<SongCandidate, MetadataError> {
        let provider = provider_for(link).ok_or(MetadataError::Unsupported)?;
        let endpoint = match provider {
            Provider::YouTube => &self.youtube_endpoint,
            Provider::Spotify => &self.spotify_endpoint,
        };

        let result = self.oembed(endpoint, link).await?;

        let mut title = non_blank(result.title);
        let mut artist = non_blank(result.author_name);

        match provider {
            Provider::YouTube => {
                artist = artist.map(|author| clean_youtube_author(&author));
                if let (Some(t), Some(a)) = (&title, &artist) {
                    title = Some(strip_artist_prefix(t, a));
                }
            }
            Provider::Spotify => {
                if let Some(html) = result.html.as_deref() {
                    if let Some((track, first_artist)) = self.spotify_embed(html).await {
                        title = track.or(title);
                        artist = first_artist.or(artist);
                    }
                }
            }
        }

        let candidate = SongCandidate {
            title: non_blank(title).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist: non_blank(artist).unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            link: link.to_string(),
            thumbnail: non_blank(result.thumbnail_url),
        };
        debug!(title = %candidate.title, artist = %candidate.artist, "Metadata resolved");
        Ok(candidate)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Drops the channel decorations YouTube adds to artist names.
fn clean_youtube_author(author: &str) -> String {
    let mut cleaned = author.trim();
    if let Some(stripped) = cleaned.strip_suffix(" - Topic") {
        cleaned = stripped.trim_end();
    }
    if let Some(stripped) = cleaned.strip_suffix("VEVO") {
        cleaned = stripped.trim_end();
    }
    if cleaned.is_empty() {
        author.trim().to_string()
    } else {
        cleaned.to_string()
    }
}

/// `"Artist - Title"` becomes `"Title"` when `Artist` is the channel's artist.
fn strip_artist_prefix(title: &str, artist: &str) -> String {
    if let Some((left, right)) = title.split_once(" - ") {
        let left_key = normalize(left);
        if !left_key.is_empty() && left_key == normalize(artist) && !right.trim().is_empty() {
            return right.trim().to_string();
        }
    }
    title.to_string()
}

static IFRAME_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src="([^"]+)""#).expect("iframe src pattern is valid"));

static SPOTIFY_TRACK_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""type":"track","name":"((?:[^"\\]|\\.)*)""#).expect("Spotify track pattern is valid")
});

static SPOTIFY_FIRST_ARTIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""artists":\[\{"name":"((?:[^"\\]|\\.)*)""#).expect("Spotify artist pattern is valid")
});

const SPOTIFY_EMBED_HOST: &str = "open.spotify.com";

/// The embed player URL, only when it is served over https by Spotify.
fn iframe_src(html: &str) -> Option<Url> {
    let raw = IFRAME_SRC.captures(html)?[1].replace("&amp;", "&");
    let url = Url::parse(&raw).ok()?;
    if url.scheme() != "https" || url.host_str() != Some(SPOTIFY_EMBED_HOST) {
        warn!(src = %raw, "Ignoring embed player outside Spotify");
        return None;
    }
    Some(url)
}

fn spotify_track_name(page: &str) -> Option<String> {
    SPOTIFY_TRACK_NAME
        .captures(page)
        .and_then(|caps| unescape_json(&caps[1]))
}

fn spotify_first_artist(page: &str) -> Option<String> {
    SPOTIFY_FIRST_ARTIST
        .captures(page)
        .and_then(|caps| unescape_json(&caps[1]))
}

/// Decodes the body of a JSON string literal (`\"`, `é`, ...).
fn unescape_json(raw: &str) -> Option<String> {
    serde_json::from_str::<String>(&format!("\"{raw}\""))
        .ok()
        .and_then(|s| non_blank(Some(s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_detection() {
        assert_eq!(
            provider_for("https://www.youtube.com/watch?v=abc"),
            Some(Provider::YouTube)
        );
        assert_eq!(provider_for("https://youtu.be/abc"), Some(Provider::YouTube));
        assert_eq!(
            provider_for("https://open.spotify.com/track/123"),
            Some(Provider::Spotify)
        );
        assert_eq!(provider_for("https://soundcloud.com/x"), None);
    }

    #[test]
    fn youtube_author_decorations_are_removed() {
        assert_eq!(clean_youtube_author("Måneskin - Topic"), "Måneskin");
        assert_eq!(clean_youtube_author("AdeleVEVO"), "Adele");
        assert_eq!(clean_youtube_author("Stromae"), "Stromae");
        assert_eq!(clean_youtube_author("VEVO"), "VEVO");
    }

    #[test]
    fn artist_prefix_is_stripped_only_when_it_matches() {
        assert_eq!(
            strip_artist_prefix("Måneskin - ZITTI E BUONI (Official Video)", "Maneskin"),
            "ZITTI E BUONI (Official Video)"
        );
        assert_eq!(
            strip_artist_prefix("Someone Else - Song", "Stromae"),
            "Someone Else - Song"
        );
        assert_eq!(strip_artist_prefix("Alors on danse", "Stromae"), "Alors on danse");
    }

    #[test]
    fn spotify_embed_fields_are_extracted() {
        let page = r#"<script>{"entity":{"type":"track","name":"Zitti e buoni","uri":"x","artists":[{"name":"Måneskin","uri":"y"},{"name":"Other"}]}}</script>"#;
        assert_eq!(spotify_track_name(page).as_deref(), Some("Zitti e buoni"));
        assert_eq!(spotify_first_artist(page).as_deref(), Some("Måneskin"));

        let escaped = r#"{"type":"track","name":"Say \"Hi\""}"#;
        assert_eq!(spotify_track_name(escaped).as_deref(), Some("Say \"Hi\""));

        assert_eq!(spotify_track_name("<html></html>"), None);
    }

    #[test]
    fn iframe_source_is_unescaped() {
        let html = r#"<iframe width="100%" src="https://open.spotify.com/embed/track/123?utm_source=oembed&amp;x=1"></iframe>"#;
        assert_eq!(
            iframe_src(html).map(String::from).as_deref(),
            Some("https://open.spotify.com/embed/track/123?utm_source=oembed&x=1")
        );
    }

    #[test]
    fn iframe_source_must_be_served_by_spotify() {
        for src in [
            "http://169.254.169.254/latest/meta-data/",
            "https://open.spotify.com.evil.example/embed/track/1",
            "https://user@evil.example/open.spotify.com/embed",
            "http://open.spotify.com/embed/track/1",
            "file:///etc/passwd",
            "/embed/track/1",
        ] {
            let html = format!(r#"<iframe src="{src}"></iframe>"#);
            assert_eq!(iframe_src(&html), None, "{src}");
        }
    }

    #[tokio::test]
    async fn unsupported_links_fail_without_network() {
        let service = OEmbedMetadataService::new(reqwest::Client::new());
        let err = service.fetch("https://example.com/song").await.unwrap_err();
        assert!(matches!(err, MetadataError::Unsupported));
        assert_eq!(err.detail(), "Lien non supporté");
    }
}
