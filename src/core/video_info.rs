//! Video metadata structures

use serde::{Deserialize, Serialize};

/// Codec value the backend uses to mark a missing stream
const NO_CODEC: &str = "none";

/// Video information and metadata as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Video title
    pub title: Option<String>,
    /// Uploader/channel name
    pub uploader: Option<String>,
    /// Video duration in seconds
    pub duration: Option<u64>,
    /// Video thumbnail URL
    pub thumbnail: Option<String>,
    /// Available formats, in backend order
    pub formats: Vec<Format>,
}

impl VideoInfo {
    /// Title for display
    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or("Unknown Title")
    }

    /// Uploader for display
    pub fn display_uploader(&self) -> &str {
        non_empty(self.uploader.as_deref()).unwrap_or("Unknown Author")
    }

    /// Thumbnail URL, if the backend sent a usable one
    pub fn thumbnail_url(&self) -> Option<&str> {
        non_empty(self.thumbnail.as_deref())
    }

    /// Find a format by its identifier
    pub fn format(&self, format_id: &str) -> Option<&Format> {
        self.formats.iter().find(|f| f.format_id == format_id)
    }
}

/// One selectable quality/codec/container variant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Format {
    /// Opaque backend format identifier, used as the selection key
    #[serde(default)]
    pub format_id: String,
    /// Quality label (e.g., "720p", "1080p60")
    pub quality: Option<String>,
    /// Container extension
    pub ext: Option<String>,
    /// Human-readable size computed by the backend
    pub filesize_fmt: Option<String>,
    /// Video codec, "none" when the format has no video
    pub vcodec: Option<String>,
    /// Audio codec, "none" when the format has no audio
    pub acodec: Option<String>,
}

impl Format {
    /// Create a new Format
    pub fn new(format_id: &str, quality: &str) -> Self {
        Self {
            format_id: format_id.to_string(),
            quality: Some(quality.to_string()),
            ..Default::default()
        }
    }

    /// Set codecs
    pub fn with_codecs(mut self, vcodec: &str, acodec: &str) -> Self {
        self.vcodec = Some(vcodec.to_string());
        self.acodec = Some(acodec.to_string());
        self
    }

    /// Check if the format carries a video stream.
    /// An unreported codec is not treated as absent.
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some(NO_CODEC)
    }

    /// Check if the format carries an audio stream
    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some(NO_CODEC)
    }

    /// Check if format is progressive (video+audio combined)
    pub fn is_progressive(&self) -> bool {
        self.has_video() && self.has_audio()
    }

    /// Quality label for display
    pub fn quality_label(&self) -> &str {
        non_empty(self.quality.as_deref()).unwrap_or("Unknown")
    }

    /// Size label for display
    pub fn size_label(&self) -> &str {
        non_empty(self.filesize_fmt.as_deref()).unwrap_or("Unknown size")
    }

    /// Extension for display
    pub fn extension(&self) -> &str {
        non_empty(self.ext.as_deref()).unwrap_or("mp4")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_streams() {
        let muxed = Format::new("18", "360p").with_codecs("avc1.42001E", "mp4a.40.2");
        assert!(muxed.has_video());
        assert!(muxed.has_audio());
        assert!(muxed.is_progressive());

        let video_only = Format::new("137", "1080p").with_codecs("avc1.640028", "none");
        assert!(video_only.has_video());
        assert!(!video_only.has_audio());
        assert!(!video_only.is_progressive());

        let audio_only = Format::new("140", "audio only").with_codecs("none", "mp4a.40.2");
        assert!(!audio_only.has_video());
        assert!(!audio_only.is_progressive());
    }

    #[test]
    fn test_format_missing_codecs_count_as_present() {
        let format = Format::new("22", "720p");
        assert!(format.vcodec.is_none());
        assert!(format.is_progressive());
    }

    #[test]
    fn test_format_display_fallbacks() {
        let format = Format {
            format_id: "x".to_string(),
            ..Default::default()
        };
        assert_eq!(format.quality_label(), "Unknown");
        assert_eq!(format.size_label(), "Unknown size");
        assert_eq!(format.extension(), "mp4");

        let format = Format {
            format_id: "y".to_string(),
            quality: Some("720p".to_string()),
            ext: Some("webm".to_string()),
            filesize_fmt: Some("12.3 MB".to_string()),
            ..Default::default()
        };
        assert_eq!(format.quality_label(), "720p");
        assert_eq!(format.size_label(), "12.3 MB");
        assert_eq!(format.extension(), "webm");
    }

    #[test]
    fn test_video_info_display_fallbacks() {
        let info = VideoInfo::default();
        assert_eq!(info.display_title(), "Unknown Title");
        assert_eq!(info.display_uploader(), "Unknown Author");
        assert_eq!(info.thumbnail_url(), None);

        let info = VideoInfo {
            title: Some("Never Gonna Give You Up".to_string()),
            uploader: Some("Rick Astley".to_string()),
            thumbnail: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(info.display_title(), "Never Gonna Give You Up");
        assert_eq!(info.display_uploader(), "Rick Astley");
        assert_eq!(info.thumbnail_url(), None);
    }

    #[test]
    fn test_video_info_format_lookup() {
        let info = VideoInfo {
            formats: vec![
                Format::new("18", "360p"),
                Format::new("22", "720p"),
            ],
            ..Default::default()
        };
        assert_eq!(info.format("22").map(|f| f.quality_label()), Some("720p"));
        assert!(info.format("137").is_none());
    }

    #[test]
    fn test_format_deserialize_from_backend_json() {
        let json = r#"{
            "format_id": "22",
            "quality": "720p",
            "filesize_fmt": "45.2 MB",
            "ext": "mp4",
            "vcodec": "avc1.64001F",
            "acodec": "mp4a.40.2"
        }"#;
        let format: Format = serde_json::from_str(json).unwrap();
        assert_eq!(format.format_id, "22");
        assert_eq!(format.size_label(), "45.2 MB");
        assert!(format.is_progressive());

        let format: Format = serde_json::from_str(r#"{"format_id": "140", "vcodec": "none"}"#).unwrap();
        assert!(!format.has_video());
        assert!(format.quality.is_none());
    }
}
