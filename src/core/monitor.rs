//! Progress monitoring for a running backend job.
//!
//! A [`ProgressMonitor`] spawns one repeating poll task per job and hands back a
//! [`PollHandle`]. The task reports every snapshot through the [`Notifier`] and
//! ends on the first terminal status, on cancellation, or when the optional
//! failure cap is reached. `PollingStopped` is emitted exactly once per handle.

use crate::config::DEFAULT_POLL_INTERVAL;
use crate::core::events::{ClientEvent, Notifier};
use crate::core::progress::{JobStatus, ProgressSnapshot};
use crate::error::{ErrorKind, RycError};
use crate::platform::Backend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Requests outstanding at once; a poll slower than this many intervals counts as failed
const MAX_IN_FLIGHT: u32 = 4;

/// Polling cadence and failure tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Consecutive failed polls tolerated; `None` keeps polling forever
    pub max_consecutive_failures: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_consecutive_failures: None,
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    pub fn with_max_failures(mut self, max: Option<u32>) -> Self {
        self.max_consecutive_failures = max;
        self
    }
}

/// How a poll task ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The backend reported `completed`
    Completed(ProgressSnapshot),
    /// The backend reported `error` (`Backend`), or the failure cap was hit (`Transport`)
    Failed { kind: ErrorKind, message: String },
    /// The handle was cancelled first
    Cancelled,
}

/// Emits `PollingStopped` once, whoever stops first
#[derive(Debug)]
struct StopSignal {
    job_id: String,
    stopped: AtomicBool,
    notifier: Notifier,
}

impl StopSignal {
    fn fire(&self) -> bool {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return false;
        }
        debug!("Polling stopped for job {}", self.job_id);
        self.notifier.emit(ClientEvent::PollingStopped {
            job_id: self.job_id.clone(),
        });
        true
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Handle to a running poll task. Dropping it cancels the task.
#[derive(Debug)]
pub struct PollHandle {
    token: CancellationToken,
    signal: Arc<StopSignal>,
    task: Option<JoinHandle<PollOutcome>>,
}

impl PollHandle {
    /// Job being polled
    pub fn job_id(&self) -> &str {
        &self.signal.job_id
    }

    /// Check if the timer is still running
    pub fn is_active(&self) -> bool {
        !self.signal.is_stopped()
    }

    /// Stop the timer. Safe to call any number of times.
    pub fn cancel(&self) {
        self.token.cancel();
        self.signal.fire();
    }

    /// Wait for the task to end and return how it ended.
    ///
    /// Later calls return [`PollOutcome::Cancelled`].
    pub async fn outcome(&mut self) -> PollOutcome {
        let task = match self.task.take() {
            Some(task) => task,
            None => return PollOutcome::Cancelled,
        };

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Poll task for job {} ended abnormally: {}", self.job_id(), e);
                self.signal.fire();
                PollOutcome::Cancelled
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Starts poll tasks against a backend
pub struct ProgressMonitor<B: Backend + 'static> {
    backend: Arc<B>,
    policy: PollPolicy,
    notifier: Notifier,
}

impl<B: Backend + 'static> ProgressMonitor<B> {
    pub fn new(backend: Arc<B>, policy: PollPolicy, notifier: Notifier) -> Self {
        Self {
            backend,
            policy,
            notifier,
        }
    }

    /// Start polling a job. The first request goes out one interval from now.
    pub fn start(&self, job_id: &str) -> PollHandle {
        let token = CancellationToken::new();
        let signal = Arc::new(StopSignal {
            job_id: job_id.to_string(),
            stopped: AtomicBool::new(false),
            notifier: self.notifier.clone(),
        });

        info!(
            "Polling job {} every {:?}",
            job_id, self.policy.interval
        );
        self.notifier.emit(ClientEvent::PollingStarted {
            job_id: job_id.to_string(),
        });

        let task = tokio::spawn(poll_job(
            self.backend.clone(),
            self.policy,
            self.notifier.clone(),
            token.clone(),
            signal.clone(),
        ));

        PollHandle {
            token,
            signal,
            task: Some(task),
        }
    }
}

async fn poll_job<B: Backend + 'static>(
    backend: Arc<B>,
    policy: PollPolicy,
    notifier: Notifier,
    token: CancellationToken,
    signal: Arc<StopSignal>,
) -> PollOutcome {
    let job_id = signal.job_id.clone();
    let interval = policy.interval.max(MIN_POLL_INTERVAL);
    let request_timeout = interval * MAX_IN_FLIGHT;
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately
    ticker.tick().await;

    // Each tick fires its own request so a stalled one cannot hold back the next.
    // Dropping the set on return aborts whatever is still outstanding.
    let mut in_flight: JoinSet<Result<ProgressSnapshot, RycError>> = JoinSet::new();
    let mut failures: u32 = 0;

    loop {
        let joined = tokio::select! {
            // Answers already in hand are handled before the next request goes out
            biased;
            _ = token.cancelled() => return PollOutcome::Cancelled,
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => joined,
            _ = ticker.tick() => {
                let backend = backend.clone();
                let job_id = job_id.clone();
                in_flight.spawn(async move {
                    match tokio::time::timeout(request_timeout, backend.fetch_progress(&job_id)).await {
                        Ok(result) => result,
                        Err(_) => Err(RycError::Disconnected(format!(
                            "Progress check timed out after {:?}",
                            request_timeout
                        ))),
                    }
                });
                continue;
            }
        };

        if token.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        let result = match joined {
            Ok(result) => result,
            Err(e) => {
                warn!("Progress check for job {} aborted: {}", job_id, e);
                continue;
            }
        };

        let snapshot = match result {
            Ok(snapshot) => {
                failures = 0;
                snapshot
            }
            Err(e) => {
                failures += 1;
                warn!("Progress check failed for job {}: {}", job_id, e);

                if let Some(max) = policy.max_consecutive_failures {
                    if failures >= max {
                        signal.fire();
                        let message = format!(
                            "Lost contact with the backend after {} failed progress checks",
                            failures
                        );
                        notifier.error(ErrorKind::Transport, message.clone());
                        notifier.emit(ClientEvent::ProgressHidden);
                        return PollOutcome::Failed {
                            kind: ErrorKind::Transport,
                            message,
                        };
                    }
                }
                continue;
            }
        };

        debug!(
            "Job {}: {} {}%",
            job_id,
            snapshot.status.as_str(),
            snapshot.percent()
        );
        notifier.emit(ClientEvent::Progress {
            percent: snapshot.percent(),
            message: snapshot.message().map(str::to_string),
        });

        if !snapshot.status.is_terminal() {
            continue;
        }

        signal.fire();
        if snapshot.status == JobStatus::Completed {
            info!("Job {} completed", job_id);
            return PollOutcome::Completed(snapshot);
        }

        let message = snapshot.message().unwrap_or("Download failed").to_string();
        warn!("Job {} failed: {}", job_id, message);
        notifier.error(ErrorKind::Backend, message.clone());
        notifier.emit(ClientEvent::ProgressHidden);
        return PollOutcome::Failed {
            kind: ErrorKind::Backend,
            message,
        };
    }
}
