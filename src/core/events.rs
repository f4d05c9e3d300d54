//! Non-blocking notifications emitted by the client.
//!
//! The controller and the progress monitor never block on the UI. Anything the
//! user must be told goes through a [`Notifier`], and whichever front-end is
//! attached drains the matching receiver at its own pace.

use crate::core::video_info::{Format, VideoInfo};
use crate::error::ErrorKind;
use std::path::PathBuf;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Everything a front-end may want to render
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// A backend request started (`true`) or finished (`false`)
    Busy(bool),
    /// Metadata arrived; `formats` is the ranked, selectable list
    VideoInfoReady {
        info: VideoInfo,
        formats: Vec<Format>,
    },
    /// The selection changed
    FormatSelected { format_id: String },
    /// The backend accepted a job
    JobStarted { job_id: String },
    /// The poll timer started for a job
    PollingStarted { job_id: String },
    /// The poll timer stopped for a job
    PollingStopped { job_id: String },
    /// New progress values
    Progress { percent: f64, message: Option<String> },
    /// The progress panel should be hidden
    ProgressHidden,
    /// The artifact was handed to the sink
    ArtifactSaved { path: PathBuf, size: u64 },
    /// Session state went back to empty
    SessionReset,
    /// An informational message
    Message(String),
    /// A failure the user has to be told about
    Error { kind: ErrorKind, message: String },
}

/// Sending half of the notification channel
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    sender: Option<UnboundedSender<ClientEvent>>,
}

impl Notifier {
    /// Create a connected notifier and its receiver
    pub fn channel() -> (Self, UnboundedReceiver<ClientEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// A notifier nobody listens to
    pub fn disconnected() -> Self {
        Self { sender: None }
    }

    /// Emit an event. Dropped silently when no receiver is attached.
    pub fn emit(&self, event: ClientEvent) {
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                debug!("Event receiver dropped, discarding notification");
            }
        }
    }

    /// Emit a user-facing error
    pub fn error(&self, kind: ErrorKind, message: impl Into<String>) {
        self.emit(ClientEvent::Error {
            kind,
            message: message.into(),
        });
    }

    /// Emit an informational message
    pub fn message(&self, message: impl Into<String>) {
        self.emit(ClientEvent::Message(message.into()));
    }
}
