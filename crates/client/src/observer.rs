//! Callbacks through which a [`JobTracker`](crate::tracker::JobTracker)
//! reports what it sees.
//!
//! Updates and transport errors arrive on separate methods; a transport
//! error never implies the job itself failed.

use tokio::sync::mpsc;

use jobtrack_core::job_status::JobStatus;

use crate::tracker::TrackerError;

/// Receiver of tracker callbacks for one tracking session.
///
/// Callbacks run on the tracker's task and must not block.
pub trait JobObserver: Send + 'static {
    /// A new snapshot replaced the previous one.
    fn on_update(&mut self, status: &JobStatus);

    /// A poll failed to produce a snapshot, or the session could not start.
    fn on_transport_error(&mut self, error: &TrackerError);
}

/// Observer built from two closures.
pub struct FnObserver<U, E> {
    on_update: U,
    on_transport_error: E,
}

impl<U, E> FnObserver<U, E>
where
    U: FnMut(&JobStatus) + Send + 'static,
    E: FnMut(&TrackerError) + Send + 'static,
{
    pub fn new(on_update: U, on_transport_error: E) -> Self {
        Self {
            on_update,
            on_transport_error,
        }
    }
}

impl<U, E> JobObserver for FnObserver<U, E>
where
    U: FnMut(&JobStatus) + Send + 'static,
    E: FnMut(&TrackerError) + Send + 'static,
{
    fn on_update(&mut self, status: &JobStatus) {
        (self.on_update)(status)
    }

    fn on_transport_error(&mut self, error: &TrackerError) {
        (self.on_transport_error)(error)
    }
}

/// A tracker callback as a value.
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    Update(JobStatus),
    /// Rendered error message; the underlying error is not `Clone`.
    TransportError(String),
}

/// Forwards callbacks into an unbounded channel.
///
/// The receiver yields `None` once the tracking session has ended and the
/// observer has been dropped.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<TrackerEvent>,
}

/// Create a connected [`ChannelObserver`] and its receiver.
pub fn channel() -> (ChannelObserver, mpsc::UnboundedReceiver<TrackerEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelObserver { tx }, rx)
}

impl JobObserver for ChannelObserver {
    fn on_update(&mut self, status: &JobStatus) {
        // A dropped receiver means nobody is watching; nothing to do.
        let _ = self.tx.send(TrackerEvent::Update(status.clone()));
    }

    fn on_transport_error(&mut self, error: &TrackerError) {
        let _ = self.tx.send(TrackerEvent::TransportError(error.to_string()));
    }
}
