//! Scripted backend and helpers for state machine tests

use crate::core::progress::{JobStatus, ProgressSnapshot};
use crate::core::video_info::{Format, VideoInfo};
use crate::download::{ArtifactSink, RetrievedFile};
use crate::error::RycError;
use crate::platform::Backend;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

pub fn sample_info() -> VideoInfo {
    VideoInfo {
        title: Some("Test Video".to_string()),
        uploader: Some("Test Author".to_string()),
        duration: Some(212),
        thumbnail: Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg".to_string()),
        formats: vec![
            Format::new("18", "360p").with_codecs("avc1", "mp4a"),
            Format::new("22", "720p").with_codecs("avc1", "mp4a"),
            Format::new("137", "1080p").with_codecs("avc1", "none"),
            Format::new("140", "audio only").with_codecs("none", "mp4a"),
        ],
    }
}

/// One scripted reply to a progress poll; `None` simulates a failed request
pub type ProgressStep = Option<ProgressSnapshot>;

pub fn pending(percent: f64) -> ProgressStep {
    Some(ProgressSnapshot::new(JobStatus::Pending, percent))
}

pub fn completed() -> ProgressStep {
    Some(ProgressSnapshot::new(JobStatus::Completed, 100.0))
}

pub fn failed(message: &str) -> ProgressStep {
    Some(ProgressSnapshot::new(JobStatus::Error, 0.0).with_message(message))
}

/// In-memory backend replaying scripted answers and counting calls
pub struct FakeBackend {
    info: Mutex<Result<VideoInfo, String>>,
    job: Mutex<Result<String, String>>,
    progress: Mutex<VecDeque<ProgressStep>>,
    file: Mutex<Result<RetrievedFile, String>>,
    launches: Mutex<Vec<(String, String)>>,
    hanging_polls: AtomicUsize,
    pub info_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub progress_calls: AtomicUsize,
    pub file_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            info: Mutex::new(Ok(sample_info())),
            job: Mutex::new(Ok("job-1".to_string())),
            progress: Mutex::new(VecDeque::new()),
            file: Mutex::new(Ok(RetrievedFile::new(
                "Test Video.mp4",
                b"video bytes".to_vec(),
            ))),
            launches: Mutex::new(Vec::new()),
            hanging_polls: AtomicUsize::new(0),
            info_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            progress_calls: AtomicUsize::new(0),
            file_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_info_error(self, message: &str) -> Self {
        *self.info.lock().unwrap() = Err(message.to_string());
        self
    }

    pub fn with_job_error(self, message: &str) -> Self {
        *self.job.lock().unwrap() = Err(message.to_string());
        self
    }

    /// Replies returned in order; the last one repeats forever
    pub fn with_progress(self, steps: Vec<ProgressStep>) -> Self {
        *self.progress.lock().unwrap() = steps.into();
        self
    }

    /// The first `count` progress polls never answer
    pub fn with_hanging_polls(self, count: usize) -> Self {
        self.hanging_polls.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_file_error(self, message: &str) -> Self {
        *self.file.lock().unwrap() = Err(message.to_string());
        self
    }

    /// `(url, format_id)` of every launched job
    pub fn launches(&self) -> Vec<(String, String)> {
        self.launches.lock().unwrap().clone()
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn fetch_info(&self, _url: &str) -> Result<VideoInfo, RycError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.info.lock().unwrap().clone().map_err(RycError::Backend)
    }

    async fn start_download(&self, url: &str, format_id: &str) -> Result<String, RycError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.launches
            .lock()
            .unwrap()
            .push((url.to_string(), format_id.to_string()));
        self.job.lock().unwrap().clone().map_err(RycError::Backend)
    }

    async fn fetch_progress(&self, _job_id: &str) -> Result<ProgressSnapshot, RycError> {
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        let hang = self
            .hanging_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if hang {
            std::future::pending::<()>().await;
        }
        let step = {
            let mut steps = self.progress.lock().unwrap();
            if steps.len() > 1 {
                steps.pop_front().flatten()
            } else {
                steps
                    .front()
                    .cloned()
                    .unwrap_or_else(|| pending(0.0))
            }
        };
        step.ok_or_else(|| {
            RycError::IoError(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            ))
        })
    }

    async fn fetch_file(&self, _job_id: &str) -> Result<RetrievedFile, RycError> {
        self.file_calls.fetch_add(1, Ordering::SeqCst);
        self.file.lock().unwrap().clone().map_err(RycError::Retrieval)
    }
}

/// Sink that refuses every artifact
pub struct FailingSink;

#[async_trait]
impl ArtifactSink for FailingSink {
    async fn save(&self, _file: RetrievedFile) -> Result<PathBuf, RycError> {
        Err(RycError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "disk is read-only",
        )))
    }
}
