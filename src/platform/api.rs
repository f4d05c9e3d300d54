//! Wire types of the backend HTTP API

use crate::core::video_info::{Format, VideoInfo};
use crate::error::RycError;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /info`
#[derive(Debug, Serialize)]
pub struct InfoRequest<'a> {
    pub url: &'a str,
}

/// Body of `POST /download`
#[derive(Debug, Serialize)]
pub struct DownloadRequest<'a> {
    pub url: &'a str,
    pub format_id: &'a str,
}

/// Response of `POST /info`
#[derive(Debug, Deserialize)]
pub struct InfoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default, deserialize_with = "deserialize_seconds")]
    pub duration: Option<u64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub formats: Vec<Format>,
}

impl InfoResponse {
    /// Turn the response into metadata, honouring the logical failure flag
    pub fn into_video_info(self) -> Result<VideoInfo, RycError> {
        if !self.success {
            return Err(RycError::Backend(backend_message(
                self.error,
                "Failed to get video info",
            )));
        }

        Ok(VideoInfo {
            title: self.title,
            uploader: self.uploader,
            duration: self.duration,
            thumbnail: self.thumbnail,
            formats: self.formats,
        })
    }
}

/// Response of `POST /download`
#[derive(Debug, Deserialize)]
pub struct DownloadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub download_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DownloadResponse {
    /// Extract the job identifier, honouring the logical failure flag
    pub fn into_job_id(self) -> Result<String, RycError> {
        const FALLBACK: &str = "Failed to start download";

        if !self.success {
            return Err(RycError::Backend(backend_message(self.error, FALLBACK)));
        }

        self.download_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RycError::Backend(FALLBACK.to_string()))
    }
}

/// Backend-provided message, or a generic fallback when it is missing or blank
pub fn backend_message(error: Option<String>, fallback: &str) -> String {
    error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Durations arrive as integers or floats; negatives and garbage become absent
fn deserialize_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_f64())
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(|s| s.floor() as u64))
}

/// Job ids are opaque; accept strings and bare numbers
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
