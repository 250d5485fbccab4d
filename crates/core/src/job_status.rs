//! Job status snapshots as reported by `GET /jobs/{id}`.
//!
//! A [`JobStatus`] is always replaced wholesale by the next snapshot;
//! fields are never merged across polls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// Job state
// ---------------------------------------------------------------------------

/// Job is accepted and waiting for a worker.
pub const STATE_QUEUED: &str = "queued";
/// Job is running.
pub const STATE_PROCESSING: &str = "processing";
/// Job finished successfully.
pub const STATE_DONE: &str = "done";
/// Job failed on the backend.
pub const STATE_ERROR: &str = "error";

/// Lifecycle state of a job.
///
/// Values outside the known set are kept verbatim in [`JobState::Unknown`]
/// so a newer backend never breaks deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    Queued,
    Processing,
    Done,
    Error,
    Unknown(String),
}

impl JobState {
    /// `done` and `error` end the lifecycle; nothing changes afterwards.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobState::Queued => STATE_QUEUED,
            JobState::Processing => STATE_PROCESSING,
            JobState::Done => STATE_DONE,
            JobState::Error => STATE_ERROR,
            JobState::Unknown(raw) => raw,
        }
    }
}

impl From<String> for JobState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            STATE_QUEUED => JobState::Queued,
            STATE_PROCESSING => JobState::Processing,
            STATE_DONE => JobState::Done,
            STATE_ERROR => JobState::Error,
            _ => JobState::Unknown(raw),
        }
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Optional bookkeeping the backend attaches to some jobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    #[serde(default)]
    pub universities: Option<Vec<String>>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// One retrieved snapshot of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(rename = "job_id")]
    pub id: JobId,
    #[serde(rename = "status")]
    pub state: JobState,
    /// Raw progress as sent. Nominally in `[0, 1]` but not guaranteed;
    /// see [`crate::progress`] for the display-safe value.
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub message: String,
    /// Absolute URL or bare/relative file path of the produced artifact.
    #[serde(rename = "output_path", default)]
    pub artifact_path: Option<String>,
    #[serde(rename = "error", default)]
    pub error_summary: Option<String>,
    #[serde(default)]
    pub error_detail: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub metadata: Option<JobMetadata>,
}

impl JobStatus {
    /// Decode a status body and check it belongs to `expected`.
    ///
    /// A snapshot for a different job is a protocol error, never a
    /// state transition.
    pub fn from_json(body: &str, expected: &JobId) -> Result<Self, CoreError> {
        let status: JobStatus = serde_json::from_str(body)
            .map_err(|e| CoreError::Validation(format!("Malformed job status: {e}")))?;
        status.ensure_job(expected)?;
        Ok(status)
    }

    /// Reject snapshots whose `job_id` differs from the tracked one.
    pub fn ensure_job(&self, expected: &JobId) -> Result<(), CoreError> {
        if &self.id != expected {
            return Err(CoreError::Validation(format!(
                "Status for job '{}' returned while tracking '{expected}'",
                self.id
            )));
        }
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn created_at_parsed(&self) -> Option<Timestamp> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn updated_at_parsed(&self) -> Option<Timestamp> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 and naive ISO 8601 (`2025-01-31T12:00:00.123456`),
/// the latter read as UTC. Returns `None` for anything else; timestamps
/// are display-only.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&chrono::Utc));
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Abbreviated job entry returned by `GET /jobs/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: JobId,
    pub status: JobState,
    /// Raw progress; the listing may send `null` for jobs not yet started.
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `GET /jobs/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobList {
    pub jobs: Vec<JobSummary>,
    pub total: usize,
}
