//! Filename helpers for retrieved artifacts

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Name used when the backend does not announce one
pub const FALLBACK_FILENAME: &str = "youtube_video.mp4";

static DISPOSITION_FILENAME: Lazy<Regex> = Lazy::new(|| Regex::new(r#"filename="(.+)""#).unwrap());

static INVALID_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap());

/// Pull the quoted `filename="..."` attribute out of a Content-Disposition value
pub fn filename_from_disposition(header: &str) -> Option<String> {
    DISPOSITION_FILENAME
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolve the artifact name from an optional Content-Disposition header
pub fn resolve_filename(header: Option<&str>, fallback: &str) -> String {
    header
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| fallback.to_string())
}

/// Make a backend-provided filename safe to create on the local filesystem
pub fn to_safe_filename(name: &str) -> String {
    // Strip any directory part the backend may have sent
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let mut safe = INVALID_CHARS.replace_all(base, "_").to_string();
    safe = safe
        .trim_matches(|c: char| c == '.' || c == ' ')
        .to_string();

    // Windows has a 255 char limit, be conservative
    if safe.len() > 200 {
        let mut cut = 200;
        while !safe.is_char_boundary(cut) {
            cut -= 1;
        }
        safe.truncate(cut);
        safe = safe.trim_end().to_string();
    }

    if safe.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        safe
    }
}

/// Generate a unique filename by appending a number if the file already exists
pub fn generate_unique_filename(base_path: &Path, filename: &str) -> std::io::Result<String> {
    let mut counter = 1;
    let mut final_filename = filename.to_string();

    while base_path.join(&final_filename).exists() {
        let path = Path::new(filename);
        let stem = path.file_stem().unwrap_or_default();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        final_filename = format!("{} ({}){}", stem.to_string_lossy(), counter, extension);
        counter += 1;

        if counter > 10000 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "Too many files with similar names",
            ));
        }
    }

    Ok(final_filename)
}
