//! Follow one job in the terminal.
//!
//! Each tracker event is folded into a [`JobView`]; a status line is
//! printed whenever the rendered line changes. The terminal snapshot
//! decides the exit status.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};

use jobtrack_client::api::JobApi;
use jobtrack_client::observer;
use jobtrack_client::resolver::ArtifactResolver;
use jobtrack_client::tracker::{JobTracker, StatusFetcher, TrackingOutcome};
use jobtrack_client::view::{DownloadView, JobView, RenderedJob};
use jobtrack_core::types::JobId;

/// Character width of the textual progress bar.
const BAR_COLUMNS: usize = 20;

/// How a watched job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchExit {
    /// `done` with a downloadable artifact.
    Done,
    /// `error`.
    Failed,
    /// `done` but nothing to download.
    Incomplete,
}

impl WatchExit {
    pub fn code(self) -> u8 {
        match self {
            WatchExit::Done => 0,
            WatchExit::Failed => 1,
            WatchExit::Incomplete => 2,
        }
    }
}

/// Options for following one job.
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    pub interval: Duration,
    /// Print the failure detail along with the summary.
    pub show_detail: bool,
}

/// Poll `job_id` until it finishes, printing progress to stdout. Ctrl-C
/// stops tracking and returns an error.
pub async fn watch(api: Arc<JobApi>, job_id: &str, options: WatchOptions) -> Result<WatchExit> {
    let resolver = ArtifactResolver::from_base(api.base_url().clone());
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    watch_with(api, resolver, job_id, options, interrupt).await
}

/// [`watch`] over any status source, stopping early when `interrupt`
/// completes.
pub async fn watch_with<I>(
    fetcher: Arc<dyn StatusFetcher>,
    resolver: ArtifactResolver,
    job_id: &str,
    options: WatchOptions,
    interrupt: I,
) -> Result<WatchExit>
where
    I: Future<Output = ()>,
{
    let job_id = JobId::parse(job_id)?;
    let mut view = JobView::new(job_id.clone());
    if options.show_detail {
        view.toggle_detail();
    }
    let mut tracker = JobTracker::new(fetcher, options.interval);
    let (observer, mut events) = observer::channel();

    tracker.start_tracking(Some(job_id.as_str()), observer)?;

    tokio::pin!(interrupt);
    let mut last_line = String::new();
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                view.apply_event(event);
                let line = status_line(&view.render(&resolver));
                if line != last_line {
                    println!("{line}");
                    last_line = line;
                }
            }
            _ = &mut interrupt => {
                tracker.stop_tracking();
                bail!("Interrupted while watching job {job_id}");
            }
        }
    }

    match tracker.wait().await {
        Some(TrackingOutcome::Terminal(_)) => {}
        Some(TrackingOutcome::Cancelled) | None => {
            bail!("Tracking of job {job_id} ended before the job finished")
        }
    }

    match conclude(&view.render(&resolver)) {
        Some((exit, summary)) => {
            println!("{summary}");
            Ok(exit)
        }
        None => bail!("Job {job_id} ended without a terminal snapshot"),
    }
}

/// One line describing the current view.
pub fn status_line(rendered: &RenderedJob) -> String {
    let mut line = match &rendered.status {
        None => format!("{} waiting for first status...", rendered.job_id),
        Some(status) => {
            let mut line = format!(
                "{} {:<10} {} {:>3}%",
                status.glyph,
                status.state_label,
                text_bar(status.bar_width_percent),
                status.percent,
            );
            if !status.message.is_empty() {
                line.push_str("  ");
                line.push_str(&status.message);
            }
            line
        }
    };
    if let Some(err) = &rendered.transport_error {
        line.push_str(&format!("  (last poll failed: {err})"));
    }
    line
}

/// Final summary and exit status, or `None` while the job is still running.
pub fn conclude(rendered: &RenderedJob) -> Option<(WatchExit, String)> {
    let status = rendered.status.as_ref()?;

    if let Some(failure) = &status.failure {
        let mut summary = format!("Job failed: {}", failure.summary);
        match &failure.detail {
            Some(detail) if failure.detail_expanded => {
                summary.push('\n');
                summary.push_str(detail);
            }
            Some(_) => summary.push_str("\n(details hidden; rerun with --show-detail)"),
            None => {}
        }
        return Some((WatchExit::Failed, summary));
    }

    match status.download.as_ref()? {
        DownloadView::Ready(link) => Some((
            WatchExit::Done,
            format!("Download {}: {}", link.filename, link.url),
        )),
        DownloadView::Unavailable => Some((
            WatchExit::Incomplete,
            "Job finished but produced no downloadable file".to_string(),
        )),
    }
}

/// `[#####...............]` for a width in percent.
fn text_bar(width_percent: f64) -> String {
    let filled = ((width_percent / 100.0) * BAR_COLUMNS as f64).round() as usize;
    let filled = filled.min(BAR_COLUMNS);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_COLUMNS - filled))
}
