//! Single-flow session state

use crate::core::selector::{default_format, rank_formats};
use crate::core::video_info::{Format, VideoInfo};
use crate::error::RycError;

/// Transient state of the one flow a client runs at a time.
///
/// A selection only exists alongside metadata, and a job id only exists if a
/// selection existed when the job was launched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    video_info: Option<VideoInfo>,
    source_url: Option<String>,
    selected_format_id: Option<String>,
    job_id: Option<String>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    pub fn video_info(&self) -> Option<&VideoInfo> {
        self.video_info.as_ref()
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn selected_format_id(&self) -> Option<&str> {
        self.selected_format_id.as_deref()
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    /// Check if the session is back in its initial condition
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Replace metadata for a new URL, dropping any previous selection and job
    pub fn load(&mut self, source_url: &str, info: VideoInfo) {
        self.video_info = Some(info);
        self.source_url = Some(source_url.to_string());
        self.selected_format_id = None;
        self.job_id = None;
    }

    /// Formats the user can choose from, best first
    pub fn candidates(&self) -> Vec<Format> {
        self.video_info
            .as_ref()
            .map(|info| rank_formats(&info.formats))
            .unwrap_or_default()
    }

    /// Record the selected format. No backend call happens here.
    pub fn select(&mut self, format_id: &str) -> Result<&Format, RycError> {
        let info = self.video_info.as_ref().ok_or_else(|| {
            RycError::Precondition("Fetch video information before choosing a quality".to_string())
        })?;

        let format = info
            .format(format_id)
            .filter(|f| f.is_progressive())
            .ok_or_else(|| RycError::Precondition(format!("Unknown format: {}", format_id)))?;

        self.selected_format_id = Some(format.format_id.clone());
        Ok(format)
    }

    /// Select the highest-ranked format, if any qualify
    pub fn select_default(&mut self) -> Option<Format> {
        let ranked = self.candidates();
        let best = default_format(&ranked)?.clone();
        self.selected_format_id = Some(best.format_id.clone());
        Some(best)
    }

    /// URL and format a job can be launched with
    pub fn launch_request(&self) -> Result<(String, String), RycError> {
        match (&self.video_info, &self.source_url, &self.selected_format_id) {
            (Some(_), Some(url), Some(format_id)) => Ok((url.clone(), format_id.clone())),
            _ => Err(RycError::Precondition(
                "Please select a video quality first".to_string(),
            )),
        }
    }

    /// Record the job the backend started
    pub fn begin_job(&mut self, job_id: &str) -> Result<(), RycError> {
        if self.selected_format_id.is_none() {
            return Err(RycError::Precondition(
                "Cannot record a job without a selected format".to_string(),
            ));
        }
        self.job_id = Some(job_id.to_string());
        Ok(())
    }

    /// Return to the initial empty state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn info() -> VideoInfo {
        VideoInfo {
            title: Some("Test Video".to_string()),
            formats: vec![
                Format::new("18", "360p").with_codecs("avc1", "mp4a"),
                Format::new("22", "720p").with_codecs("avc1", "mp4a"),
                Format::new("137", "1080p").with_codecs("avc1", "none"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(session.is_empty());
        assert!(session.video_info().is_none());
        assert!(session.selected_format_id().is_none());
        assert!(session.job_id().is_none());
    }

    #[test]
    fn test_select_requires_metadata() {
        let mut session = Session::new();
        let err = session.select("22").unwrap_err();
        assert!(matches!(err, RycError::Precondition(_)));
        assert!(session.selected_format_id().is_none());
    }

    #[test]
    fn test_select_default_picks_highest_quality() {
        let mut session = Session::new();
        session.load(URL, info());

        let chosen = session.select_default().unwrap();
        assert_eq!(chosen.format_id, "22");
        assert_eq!(session.selected_format_id(), Some("22"));
    }

    #[test]
    fn test_select_overwrites_and_rejects_unknown() {
        let mut session = Session::new();
        session.load(URL, info());
        session.select_default();

        session.select("18").unwrap();
        assert_eq!(session.selected_format_id(), Some("18"));

        // Video-only formats are not selectable
        assert!(session.select("137").is_err());
        assert!(session.select("nope").is_err());
        assert_eq!(session.selected_format_id(), Some("18"));
    }

    #[test]
    fn test_load_clears_selection_and_job() {
        let mut session = Session::new();
        session.load(URL, info());
        session.select_default();
        session.begin_job("job-1").unwrap();

        session.load("https://youtu.be/aaaaaaaaaaa", info());
        assert!(session.selected_format_id().is_none());
        assert!(session.job_id().is_none());
        assert_eq!(session.source_url(), Some("https://youtu.be/aaaaaaaaaaa"));
    }

    #[test]
    fn test_launch_request_requires_selection() {
        let mut session = Session::new();
        assert!(matches!(
            session.launch_request(),
            Err(RycError::Precondition(_))
        ));

        session.load(URL, info());
        assert!(session.launch_request().is_err());

        session.select_default();
        assert_eq!(
            session.launch_request().unwrap(),
            (URL.to_string(), "22".to_string())
        );
    }

    #[test]
    fn test_begin_job_requires_selection() {
        let mut session = Session::new();
        session.load(URL, info());
        assert!(session.begin_job("job-1").is_err());
        assert!(session.job_id().is_none());

        session.select_default();
        session.begin_job("job-1").unwrap();
        assert_eq!(session.job_id(), Some("job-1"));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut session = Session::new();
        session.load(URL, info());
        session.select_default();
        session.begin_job("job-1").unwrap();

        session.reset();
        assert_eq!(session, Session::default());
        assert!(session.is_empty());
    }

    #[test]
    fn test_no_candidates_means_no_default() {
        let mut session = Session::new();
        session.load(
            URL,
            VideoInfo {
                formats: vec![Format::new("140", "audio").with_codecs("none", "mp4a")],
                ..Default::default()
            },
        );
        assert!(session.candidates().is_empty());
        assert!(session.select_default().is_none());
        assert!(session.selected_format_id().is_none());
    }
}
