//! # Text Normalization
//!
//! Comparison keys for fuzzy song matching. A key is the input decomposed
//! with NFKD, stripped of combining marks (diacritics), lowercased and
//! reduced to letters and digits. Letters of every script survive, so
//! "Кино" keys as "кино" and a Japanese title keeps its kana and kanji.
//! Keys are never stored or displayed.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Artist names that providers emit when they could not resolve one.
/// Compared against [`normalize`]d names.
const UNKNOWN_ARTIST_KEYS: [&str; 3] = ["artisteinconnu", "artistinconnu", "unknownartist"];

/// Returns the normalized comparison key for `text`.
///
/// # Examples
///
/// ```rust
/// use reco::utils::text::normalize;
///
/// assert_eq!(normalize("Zitti e Buòni"), "zittiebuoni");
/// assert_eq!(normalize("Måneskin"), "maneskin");
/// assert_eq!(normalize("КИНО!"), "кино");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c) && c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// True when one key contains the other.
///
/// An empty key only overlaps another empty key.
pub fn keys_overlap(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return a == b;
    }
    a.contains(b) || b.contains(a)
}

/// True when an artist name carries no information and should act as a
/// wildcard during ban-rule matching: blank, or a provider placeholder.
pub fn is_unknown_artist(artist: &str) -> bool {
    let key = normalize(artist);
    key.is_empty() || UNKNOWN_ARTIST_KEYS.contains(&key.as_str())
}
