//! Presentation-neutral state of one tracked job.
//!
//! [`JobView`] folds tracker callbacks into the latest snapshot plus the
//! latest transport error; [`JobView::render`] derives everything a
//! status screen shows (label, colour tone, percentage, bar geometry,
//! download link, failure block). No styling lives here.

use jobtrack_core::job_status::{JobState, JobStatus};
use jobtrack_core::progress;
use jobtrack_core::types::JobId;

use crate::observer::TrackerEvent;
use crate::resolver::{ArtifactLink, ArtifactResolution, ArtifactResolver};

/// Colour family for a job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Danger,
    Active,
    Waiting,
    Neutral,
}

/// Failure block shown for a job in the `error` state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureView {
    /// Always shown.
    pub summary: String,
    /// Diagnostic text, if the backend sent one.
    pub detail: Option<String>,
    /// Whether the user asked to see `detail`.
    pub detail_expanded: bool,
}

/// What a finished (`done`) job offers for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadView {
    Ready(ArtifactLink),
    /// Finished, but the backend reported no artifact.
    Unavailable,
}

/// Snapshot-derived part of a rendered job.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub state_label: String,
    pub glyph: &'static str,
    pub tone: Tone,
    /// Rounded, clamped percentage.
    pub percent: u8,
    /// Bar width in percent, never below the visible floor.
    pub bar_width_percent: f64,
    pub label_inside_bar: bool,
    /// Queued or processing: an activity animation is appropriate.
    pub in_progress: bool,
    pub message: String,
    pub updated_at: Option<String>,
    pub download: Option<DownloadView>,
    pub failure: Option<FailureView>,
}

/// Everything a status screen draws for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedJob {
    pub job_id: JobId,
    /// `None` until the first snapshot arrives (loading indicator).
    pub status: Option<StatusView>,
    /// Latest transport error, cleared by the next successful update.
    pub transport_error: Option<String>,
}

/// Local view of one job, fed by tracker callbacks.
#[derive(Debug, Clone)]
pub struct JobView {
    job_id: JobId,
    current: Option<JobStatus>,
    transport_error: Option<String>,
    detail_expanded: bool,
}

impl JobView {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            current: None,
            transport_error: None,
            detail_expanded: false,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn current(&self) -> Option<&JobStatus> {
        self.current.as_ref()
    }

    pub fn transport_error(&self) -> Option<&str> {
        self.transport_error.as_deref()
    }

    /// Replace the current snapshot. Snapshots for other jobs are ignored.
    pub fn apply_update(&mut self, status: JobStatus) {
        if status.id != self.job_id {
            tracing::warn!(expected = %self.job_id, got = %status.id, "Ignoring snapshot for another job");
            return;
        }
        self.current = Some(status);
        self.transport_error = None;
    }

    pub fn apply_transport_error(&mut self, message: impl Into<String>) {
        self.transport_error = Some(message.into());
    }

    pub fn apply_event(&mut self, event: TrackerEvent) {
        match event {
            TrackerEvent::Update(status) => self.apply_update(status),
            TrackerEvent::TransportError(message) => self.apply_transport_error(message),
        }
    }

    /// Expand or collapse the failure detail.
    pub fn toggle_detail(&mut self) {
        self.detail_expanded = !self.detail_expanded;
    }

    pub fn render(&self, resolver: &ArtifactResolver) -> RenderedJob {
        RenderedJob {
            job_id: self.job_id.clone(),
            status: self
                .current
                .as_ref()
                .map(|status| render_status(status, resolver, self.detail_expanded)),
            transport_error: self.transport_error.clone(),
        }
    }
}

fn render_status(status: &JobStatus, resolver: &ArtifactResolver, detail_expanded: bool) -> StatusView {
    let download = match resolver.resolve(status) {
        ArtifactResolution::Ready(link) => Some(DownloadView::Ready(link)),
        ArtifactResolution::Unavailable => Some(DownloadView::Unavailable),
        ArtifactResolution::NotReady => None,
    };

    let failure = (status.state == JobState::Error).then(|| FailureView {
        summary: failure_summary(status),
        detail: status.error_detail.clone(),
        detail_expanded,
    });

    StatusView {
        state_label: status.state.as_str().to_uppercase(),
        glyph: state_glyph(&status.state),
        tone: state_tone(&status.state),
        percent: progress::percent(status.progress),
        bar_width_percent: progress::bar_width_percent(status.progress),
        label_inside_bar: progress::label_inside_bar(status.progress),
        in_progress: matches!(status.state, JobState::Queued | JobState::Processing),
        message: status.message.clone(),
        updated_at: status
            .updated_at_parsed()
            .map(|ts| ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
            .or_else(|| status.updated_at.clone()),
        download,
        failure,
    }
}

/// The backend's summary, else its message, else a generic line.
fn failure_summary(status: &JobStatus) -> String {
    [status.error_summary.as_deref(), Some(status.message.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("Job failed")
        .to_string()
}

pub fn state_tone(state: &JobState) -> Tone {
    match state {
        JobState::Done => Tone::Success,
        JobState::Error => Tone::Danger,
        JobState::Processing => Tone::Active,
        JobState::Queued => Tone::Waiting,
        JobState::Unknown(_) => Tone::Neutral,
    }
}

pub fn state_glyph(state: &JobState) -> &'static str {
    match state {
        JobState::Done => "✅",
        JobState::Error => "❌",
        JobState::Processing => "⏳",
        JobState::Queued => "⏰",
        JobState::Unknown(_) => "❓",
    }
}
