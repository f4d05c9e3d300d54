//! URL validation for the supported video host

use crate::error::RycError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Accepted URL shapes: watch page, short link, embed.
/// Each needs an 11-character video identifier; anything may follow it.
static VIDEO_URL_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"^(https?://)?(www\.)?youtube\.com/watch\?v=([\w-]{11})").unwrap(),
        Regex::new(r"^(https?://)?youtu\.be/([\w-]{11})").unwrap(),
        Regex::new(r"^(https?://)?(www\.)?youtube\.com/embed/([\w-]{11})").unwrap(),
    ]
});

/// Check if a string structurally looks like a supported video URL.
///
/// This does not verify that the video exists.
pub fn is_valid_video_url(url: &str) -> bool {
    VIDEO_URL_PATTERNS.iter().any(|pattern| pattern.is_match(url))
}

/// Extract the 11-character video ID from a supported URL
pub fn extract_video_id(url: &str) -> Result<String, RycError> {
    VIDEO_URL_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.iter().flatten().last().map(|m| m.as_str().to_string()))
        .ok_or_else(|| RycError::Validation(format!("Not a supported video URL: {}", url)))
}
