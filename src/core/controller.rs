//! The client state machine.
//!
//! [`Controller`] owns the [`Session`] and the single poll handle, and exposes
//! the user actions of the flow: submit a URL, pick a format, start a job,
//! wait for it, retrieve the artifact, reset. Every failure the user has to see
//! is emitted as [`ClientEvent::Error`] before the action returns `Err`.

use crate::config::ClientConfig;
use crate::core::events::{ClientEvent, Notifier};
use crate::core::monitor::{PollHandle, PollOutcome, PollPolicy, ProgressMonitor};
use crate::core::session::Session;
use crate::core::video_info::VideoInfo;
use crate::download::{ArtifactSink, DirectorySink};
use crate::error::RycError;
use crate::platform::Backend;
use crate::utils::url::{extract_video_id, is_valid_video_url};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Status text shown once the artifact is saved
pub const COMPLETE_MESSAGE: &str = "Download complete! Check your downloads folder.";

/// Drives one flow at a time against a backend
pub struct Controller<B: Backend + 'static> {
    backend: Arc<B>,
    monitor: ProgressMonitor<B>,
    sink: Arc<dyn ArtifactSink>,
    notifier: Notifier,
    session: Session,
    poll: Option<PollHandle>,
    reset_delay: Duration,
    last_saved: Option<PathBuf>,
}

impl<B: Backend + 'static> Controller<B> {
    /// Create a controller saving artifacts into `config.output_dir`
    pub fn new(backend: Arc<B>, config: &ClientConfig, notifier: Notifier) -> Self {
        let policy = PollPolicy::new(config.poll_interval)
            .with_max_failures(config.max_poll_failures);

        Self {
            monitor: ProgressMonitor::new(backend.clone(), policy, notifier.clone()),
            backend,
            sink: Arc::new(DirectorySink::new(&config.output_dir)),
            notifier,
            session: Session::new(),
            poll: None,
            reset_delay: config.reset_delay,
            last_saved: None,
        }
    }

    /// Replace the artifact destination
    pub fn with_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Current session state
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Artifact saved by the latest flow. Survives the reset that follows a
    /// save and is cleared when a new URL is submitted.
    pub fn last_saved(&self) -> Option<&Path> {
        self.last_saved.as_deref()
    }

    /// Check if a poll timer is running
    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().map(|p| p.is_active()).unwrap_or(false)
    }

    /// Validate a URL, fetch its metadata and preselect the best format
    pub async fn submit_url(&mut self, input: &str) -> Result<VideoInfo> {
        let url = input.trim();
        self.last_saved = None;

        if url.is_empty() {
            return self.fail(RycError::Validation("Please enter a YouTube URL".to_string()));
        }
        if !is_valid_video_url(url) {
            return self.fail(RycError::Validation(
                "Please enter a valid YouTube URL".to_string(),
            ));
        }

        if let Ok(video_id) = extract_video_id(url) {
            info!("Fetching video info for {}", video_id);
        }

        self.notifier.emit(ClientEvent::Busy(true));
        let result = self.backend.fetch_info(url).await;
        self.notifier.emit(ClientEvent::Busy(false));

        let info = match result {
            Ok(info) => info,
            Err(e) => return self.fail(e),
        };

        self.stop_polling();
        self.session.load(url, info.clone());
        let formats = self.session.candidates();
        debug!(
            "{} formats received, {} selectable",
            info.formats.len(),
            formats.len()
        );

        self.notifier.emit(ClientEvent::VideoInfoReady {
            info: info.clone(),
            formats,
        });

        match self.session.select_default() {
            Some(format) => self.notifier.emit(ClientEvent::FormatSelected {
                format_id: format.format_id,
            }),
            None => self
                .notifier
                .message("No format with both video and audio is available"),
        }

        Ok(info)
    }

    /// Choose a format from the ranked list
    pub fn select_format(&mut self, format_id: &str) -> Result<()> {
        let format_id = match self.session.select(format_id) {
            Ok(format) => format.format_id.clone(),
            Err(e) => return self.fail(e),
        };

        debug!("Selected format {}", format_id);
        self.notifier.emit(ClientEvent::FormatSelected { format_id });
        Ok(())
    }

    /// Ask the backend to start a job for the selection and begin polling it
    pub async fn start_job(&mut self) -> Result<String> {
        let (url, format_id) = match self.session.launch_request() {
            Ok(request) => request,
            Err(e) => return self.fail(e),
        };

        self.stop_polling();
        self.notifier.emit(ClientEvent::Busy(true));
        self.notifier.emit(ClientEvent::Progress {
            percent: 0.0,
            message: None,
        });

        let result = self.backend.start_download(&url, &format_id).await;
        self.notifier.emit(ClientEvent::Busy(false));

        let job_id = match result {
            Ok(job_id) => job_id,
            Err(e) => {
                self.notifier.emit(ClientEvent::ProgressHidden);
                return self.fail(e);
            }
        };

        if let Err(e) = self.session.begin_job(&job_id) {
            return self.fail(e);
        }

        info!("Backend started job {} (format {})", job_id, format_id);
        self.notifier.emit(ClientEvent::JobStarted {
            job_id: job_id.clone(),
        });
        self.poll = Some(self.monitor.start(&job_id));

        Ok(job_id)
    }

    /// Wait until the running job reaches a terminal status or is cancelled
    pub async fn wait_for_job(&mut self) -> Result<PollOutcome> {
        let mut handle = match self.poll.take() {
            Some(handle) => handle,
            None => {
                return self.fail(RycError::Precondition(
                    "No download is in progress".to_string(),
                ))
            }
        };

        Ok(handle.outcome().await)
    }

    /// Fetch the finished artifact, hand it to the sink, then reset the session
    /// after the configured delay
    pub async fn retrieve_result(&mut self) -> Result<PathBuf> {
        let job_id = match self.session.job_id() {
            Some(id) => id.to_string(),
            None => {
                return self.fail(RycError::Precondition(
                    "No finished download to retrieve".to_string(),
                ))
            }
        };

        let saved = match self.backend.fetch_file(&job_id).await {
            Ok(file) => {
                let size = file.size();
                debug!("Retrieved {} ({} bytes)", file.filename, size);
                self.sink.save(file).await.map(|path| (path, size))
            }
            Err(e) => Err(e),
        };

        let (path, size) = match saved {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Retrieval of job {} failed: {}", job_id, e);
                let kind = e.kind();
                let message = format!("Failed to download file: {}", e);
                self.notifier.error(kind, message.clone());
                self.notifier.emit(ClientEvent::ProgressHidden);
                return Err(RycError::Retrieval(message));
            }
        };

        info!("Saved job {} to {:?}", job_id, path);
        self.last_saved = Some(path.clone());
        self.notifier.emit(ClientEvent::ArtifactSaved {
            path: path.clone(),
            size,
        });
        self.notifier.emit(ClientEvent::Progress {
            percent: 100.0,
            message: Some(COMPLETE_MESSAGE.to_string()),
        });

        tokio::time::sleep(self.reset_delay).await;
        self.reset();

        Ok(path)
    }

    /// Stop polling and return to the initial empty state
    pub fn reset(&mut self) {
        self.stop_polling();
        self.session.reset();
        self.notifier.emit(ClientEvent::ProgressHidden);
        self.notifier.emit(ClientEvent::SessionReset);
    }

    /// Run the whole flow for one URL.
    ///
    /// Returns `None` when the job did not complete (failed or cancelled).
    pub async fn run(&mut self, url: &str, format_id: Option<&str>) -> Result<Option<PathBuf>> {
        self.submit_url(url).await?;
        if let Some(format_id) = format_id {
            self.select_format(format_id)?;
        }

        self.start_job().await?;

        match self.wait_for_job().await? {
            PollOutcome::Completed(_) => self.retrieve_result().await.map(Some),
            PollOutcome::Failed { kind, message } => Err(RycError::from_kind(kind, message)),
            PollOutcome::Cancelled => Ok(None),
        }
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.cancel();
        }
    }

    fn fail<T>(&self, err: RycError) -> Result<T> {
        self.notifier.error(err.kind(), err.to_string());
        Err(err)
    }
}
