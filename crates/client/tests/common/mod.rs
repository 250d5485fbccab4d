#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use jobtrack_client::api::JobApiError;
use jobtrack_client::observer::FnObserver;
use jobtrack_client::tracker::{StatusFetcher, TrackerError};
use jobtrack_core::job_status::{JobState, JobStatus};
use jobtrack_core::types::JobId;

/// Build a snapshot for `job_id` with empty optional fields.
pub fn snapshot(job_id: &str, state: JobState, progress: f64) -> JobStatus {
    JobStatus {
        id: JobId::parse(job_id).unwrap(),
        state,
        progress,
        message: String::new(),
        artifact_path: None,
        error_summary: None,
        error_detail: None,
        created_at: None,
        updated_at: None,
        metadata: None,
    }
}

/// One scripted poll response.
pub enum Step {
    Status(JobStatus),
    HttpError(u16),
}

/// A [`StatusFetcher`] that replays a fixed script, optionally after a
/// simulated network latency, and records every call.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Step>>,
    latency: Duration,
    calls: Mutex<Vec<(Instant, JobId)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        Self::with_latency(script, Duration::ZERO)
    }

    pub fn with_latency(script: Vec<Step>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            latency,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Offsets of every call relative to `start`.
    pub fn call_offsets(&self, start: Instant) -> Vec<Duration> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(at, _)| at.duration_since(start))
            .collect()
    }

    pub fn called_ids(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, id)| id.to_string())
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusFetcher for ScriptedFetcher {
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatus, JobApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), job_id.clone()));
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Status(mut status)) => {
                status.id = job_id.clone();
                Ok(status)
            }
            Some(Step::HttpError(status)) => Err(JobApiError::ApiError {
                status,
                body: "scripted failure".into(),
            }),
            None => Err(JobApiError::InvalidResponse("script exhausted".into())),
        }
    }
}

/// What an observer saw, in order.
#[derive(Debug, Clone)]
pub enum Seen {
    Update(JobStatus),
    TransportError(String),
}

pub type SeenLog = Arc<Mutex<Vec<Seen>>>;

/// An observer recording into a shared log.
pub fn recording_observer() -> (
    FnObserver<impl FnMut(&JobStatus) + Send + 'static, impl FnMut(&TrackerError) + Send + 'static>,
    SeenLog,
) {
    let log: SeenLog = Arc::new(Mutex::new(Vec::new()));
    let updates = Arc::clone(&log);
    let errors = Arc::clone(&log);
    let observer = FnObserver::new(
        move |status: &JobStatus| updates.lock().unwrap().push(Seen::Update(status.clone())),
        move |error: &TrackerError| {
            errors
                .lock()
                .unwrap()
                .push(Seen::TransportError(error.to_string()))
        },
    );
    (observer, log)
}

pub fn updates(log: &SeenLog) -> Vec<JobStatus> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|seen| match seen {
            Seen::Update(status) => Some(status.clone()),
            Seen::TransportError(_) => None,
        })
        .collect()
}

pub fn transport_errors(log: &SeenLog) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|seen| match seen {
            Seen::TransportError(msg) => Some(msg.clone()),
            Seen::Update(_) => None,
        })
        .collect()
}
