//! The backend seam the client state machine talks through

use crate::core::progress::ProgressSnapshot;
use crate::core::video_info::VideoInfo;
use crate::download::RetrievedFile;
use crate::error::RycError;
use async_trait::async_trait;

/// Remote extraction backend.
///
/// `fetch_info` and `start_download` report HTTP and logical failures as
/// [`RycError::Backend`]; `fetch_file` reports a missing artifact as
/// [`RycError::Retrieval`]; network failures surface as
/// [`RycError::Transport`].
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetch metadata and available formats for a video URL
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, RycError>;

    /// Start a backend job and return its identifier
    async fn start_download(&self, url: &str, format_id: &str) -> Result<String, RycError>;

    /// Fetch the current progress of a job
    async fn fetch_progress(&self, job_id: &str) -> Result<ProgressSnapshot, RycError>;

    /// Fetch the produced artifact of a completed job
    async fn fetch_file(&self, job_id: &str) -> Result<RetrievedFile, RycError>;
}
