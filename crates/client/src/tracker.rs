//! Fixed-cadence polling of one job until it reaches a terminal state.
//!
//! [`JobTracker::start_tracking`] spawns a task that polls immediately,
//! then once per interval, and reports every result to a
//! [`JobObserver`]. The task ends on the first `done`/`error` snapshot or
//! when [`JobTracker::stop_tracking`] cancels it.
//!
//! At most one status request is outstanding at any time. Deadlines that
//! pass while a request is in flight are skipped; the next poll lands on
//! the fixed grid (`start + n * interval`).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use jobtrack_core::job_status::JobStatus;
use jobtrack_core::types::JobId;

use crate::api::{JobApi, JobApiError};
use crate::observer::JobObserver;

/// Source of job snapshots. [`JobApi`] is the production implementation.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatus, JobApiError>;
}

#[async_trait]
impl StatusFetcher for JobApi {
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatus, JobApiError> {
        self.get_job_status(job_id).await
    }
}

/// Errors reported on the transport channel of a [`JobObserver`].
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The job identifier was absent or blank; nothing was sent.
    #[error("Invalid job ID: {0}")]
    InvalidJobId(String),

    /// A poll failed to produce a snapshot. Polling continues.
    #[error("Status poll failed: {0}")]
    Transport(#[from] JobApiError),
}

/// How a tracking session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingOutcome {
    /// The first terminal snapshot seen.
    Terminal(JobStatus),
    /// Stopped before a terminal snapshot arrived.
    Cancelled,
}

/// Polls a single job on a fixed interval.
///
/// One job per tracker. Starting a new session stops the previous one.
/// Dropping the tracker cancels its session.
pub struct JobTracker {
    fetcher: Arc<dyn StatusFetcher>,
    interval: Duration,
    session: Option<TrackingSession>,
}

struct TrackingSession {
    job_id: JobId,
    cancel: CancellationToken,
    task_handle: JoinHandle<TrackingOutcome>,
}

impl JobTracker {
    pub fn new(fetcher: Arc<dyn StatusFetcher>, interval: Duration) -> Self {
        Self {
            fetcher,
            interval: interval.max(Duration::from_millis(1)),
            session: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Job of the current session, if any.
    pub fn job_id(&self) -> Option<&JobId> {
        self.session.as_ref().map(|s| &s.job_id)
    }

    /// True while a session exists and its polling task is still running.
    pub fn is_tracking(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.task_handle.is_finished())
    }

    /// Begin polling `job_id`, reporting to `observer`.
    ///
    /// An absent or blank identifier is reported through
    /// [`JobObserver::on_transport_error`] and returned as
    /// [`TrackerError::InvalidJobId`]; no request is made. Must be called
    /// from within a Tokio runtime.
    pub fn start_tracking<O: JobObserver>(
        &mut self,
        job_id: Option<&str>,
        mut observer: O,
    ) -> Result<(), TrackerError> {
        let job_id = match JobId::from_optional(job_id) {
            Ok(id) => id,
            Err(e) => {
                let err = TrackerError::InvalidJobId(e.to_string());
                tracing::warn!(error = %err, "Refusing to track job");
                observer.on_transport_error(&err);
                return Err(err);
            }
        };

        self.stop_tracking();

        let cancel = CancellationToken::new();
        let fetcher = Arc::clone(&self.fetcher);
        let interval = self.interval;
        let task_job_id = job_id.clone();
        let task_cancel = cancel.clone();

        let task_handle = tokio::spawn(async move {
            tracing::info!(job_id = %task_job_id, interval_ms = interval.as_millis() as u64, "Tracking job");
            let outcome =
                run_poll_loop(fetcher.as_ref(), &task_job_id, interval, &mut observer, &task_cancel)
                    .await;
            tracing::info!(job_id = %task_job_id, "Tracking task exited");
            outcome
        });

        self.session = Some(TrackingSession {
            job_id,
            cancel,
            task_handle,
        });
        Ok(())
    }

    /// Cancel the current session. Idempotent; a no-op before any start.
    ///
    /// A response that arrives after this call is discarded.
    pub fn stop_tracking(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(job_id = %session.job_id, "Stopping job tracking");
            session.cancel.cancel();
        }
    }

    /// Wait for the current session to end and return how it ended.
    ///
    /// Returns `None` when nothing is being tracked or the polling task
    /// panicked.
    pub async fn wait(&mut self) -> Option<TrackingOutcome> {
        let session = self.session.take()?;
        match session.task_handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!(job_id = %session.job_id, error = %e, "Tracking task failed");
                None
            }
        }
    }
}

impl Drop for JobTracker {
    fn drop(&mut self) {
        self.stop_tracking();
    }
}

/// Result of a single poll.
enum PollResult {
    Continue,
    Terminal(JobStatus),
    Cancelled,
}

/// Poll immediately, then on every grid deadline until terminal or
/// cancelled.
async fn run_poll_loop<O: JobObserver>(
    fetcher: &dyn StatusFetcher,
    job_id: &JobId,
    interval: Duration,
    observer: &mut O,
    cancel: &CancellationToken,
) -> TrackingOutcome {
    let mut deadline = Instant::now();
    let mut attempt = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return TrackingOutcome::Cancelled,
            _ = tokio::time::sleep_until(deadline) => {}
        }

        attempt += 1;
        match poll(fetcher, job_id, attempt, observer, cancel).await {
            PollResult::Continue => {}
            PollResult::Terminal(status) => return TrackingOutcome::Terminal(status),
            PollResult::Cancelled => return TrackingOutcome::Cancelled,
        }

        deadline = next_deadline(deadline, interval, Instant::now());
    }
}

/// Issue one status request and hand the result to the observer.
async fn poll<O: JobObserver>(
    fetcher: &dyn StatusFetcher,
    job_id: &JobId,
    attempt: u64,
    observer: &mut O,
    cancel: &CancellationToken,
) -> PollResult {
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!(job_id = %job_id, attempt, "Discarding in-flight poll");
            return PollResult::Cancelled;
        }
        result = fetcher.fetch_status(job_id) => result,
    };

    if cancel.is_cancelled() {
        return PollResult::Cancelled;
    }

    match result {
        Ok(status) => {
            tracing::debug!(
                job_id = %job_id,
                attempt,
                state = %status.state,
                progress = status.progress,
                "Job status received",
            );
            observer.on_update(&status);
            if status.is_terminal() {
                tracing::info!(job_id = %job_id, state = %status.state, attempt, "Job reached terminal state");
                PollResult::Terminal(status)
            } else {
                PollResult::Continue
            }
        }
        Err(e) => {
            tracing::warn!(job_id = %job_id, attempt, error = %e, "Status poll failed, retrying next tick");
            observer.on_transport_error(&TrackerError::Transport(e));
            PollResult::Continue
        }
    }
}

/// First grid point after `previous` that is not already in the past.
///
/// Deadlines that elapsed while a request was in flight are skipped.
pub fn next_deadline(previous: Instant, interval: Duration, now: Instant) -> Instant {
    let mut next = previous + interval;
    while next < now {
        next += interval;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn next_deadline_steps_one_interval() {
        let start = Instant::now();
        let interval = Duration::from_millis(500);
        let next = next_deadline(start, interval, start + Duration::from_millis(30));
        assert_eq!(next, start + interval);
    }

    #[tokio::test(start_paused = true)]
    async fn next_deadline_skips_elapsed_grid_points() {
        let start = Instant::now();
        let interval = Duration::from_millis(500);
        let next = next_deadline(start, interval, start + Duration::from_millis(1200));
        assert_eq!(next, start + Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn next_deadline_on_exact_grid_point() {
        let start = Instant::now();
        let interval = Duration::from_millis(500);
        let next = next_deadline(start, interval, start + interval);
        assert_eq!(next, start + interval);
    }

    #[test]
    fn zero_interval_is_raised() {
        struct Never;
        #[async_trait]
        impl StatusFetcher for Never {
            async fn fetch_status(&self, _: &JobId) -> Result<JobStatus, JobApiError> {
                Err(JobApiError::InvalidResponse("unused".into()))
            }
        }
        let tracker = JobTracker::new(Arc::new(Never), Duration::ZERO);
        assert_eq!(tracker.interval(), Duration::from_millis(1));
        assert!(!tracker.is_tracking());
        assert!(tracker.job_id().is_none());
    }
}
