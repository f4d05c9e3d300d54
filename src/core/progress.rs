//! Progress snapshots reported by the backend for a running job

use serde::{Deserialize, Serialize};

/// Status of a backend job
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    /// Queued or running
    #[default]
    Pending,
    /// Artifact is ready to fetch
    Completed,
    /// Job failed on the backend
    Error,
    /// Any other in-progress status the backend reports
    Other(String),
}

impl JobStatus {
    /// Check if this status ends polling
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// Wire name of the status
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
            JobStatus::Other(s) => s,
        }
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => JobStatus::Pending,
            "completed" => JobStatus::Completed,
            "error" => JobStatus::Error,
            _ => JobStatus::Other(s),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One progress report for a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Job status
    #[serde(default)]
    pub status: JobStatus,
    /// Completion percentage as reported (may be absent or null)
    #[serde(default)]
    pub progress: Option<f64>,
    /// Optional human-readable status message
    #[serde(default)]
    pub message: Option<String>,
}

impl ProgressSnapshot {
    /// Create a snapshot
    pub fn new(status: JobStatus, progress: f64) -> Self {
        Self {
            status,
            progress: Some(progress),
            message: None,
        }
    }

    /// Set the status message
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// Completion percentage clamped to 0..=100, 0 when not reported
    pub fn percent(&self) -> f64 {
        match self.progress {
            Some(p) if p.is_finite() => p.clamp(0.0, 100.0),
            _ => 0.0,
        }
    }

    /// Status message, ignoring empty strings
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}
