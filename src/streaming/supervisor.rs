//! Per-connection supervisor: runs the receiver and detector loops side by side,
//! stops both as soon as either one finishes, and reports the first outcome.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::data::{cancel_pair, frame_handoff};
use crate::detection_runners::SharedDetector;
use crate::streaming::detector_loop::detect_frames;
use crate::streaming::receiver_loop::receive_frames;
use crate::streaming::transport::{FrameSource, ResultSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activity {
    Receiver,
    Detector,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activity::Receiver => f.write_str("receiver"),
            Activity::Detector => f.write_str("detector"),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ConnectionCounters {
    accepted: AtomicU64,
    dropped: AtomicU64,
    sent: AtomicU64,
}

impl ConnectionCounters {
    pub(crate) fn frame_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn response_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    fn report(&self) -> ConnectionReport {
        ConnectionReport {
            frames_accepted: self.accepted.load(Ordering::Relaxed),
            frames_dropped: self.dropped.load(Ordering::Relaxed),
            responses_sent: self.sent.load(Ordering::Relaxed),
        }
    }
}

/// Frame accounting for one finished connection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionReport {
    pub frames_accepted: u64,
    pub frames_dropped: u64,
    pub responses_sent: u64,
}

impl fmt::Display for ConnectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accepted={} dropped={} sent={}",
            self.frames_accepted, self.frames_dropped, self.responses_sent
        )
    }
}

/// Drives one streaming connection to completion.
///
/// Both loops are always stopped, and the handoff and both transport halves released,
/// before this returns. A clean close by the peer is `Ok`; otherwise the error of
/// whichever loop finished first is returned. Errors raised by the other loop while it
/// shuts down are only logged.
pub async fn run_connection<S, K>(
    source: S,
    sink: K,
    detector: SharedDetector,
) -> anyhow::Result<ConnectionReport>
where
    S: FrameSource,
    K: ResultSink,
{
    let (offer, take) = frame_handoff();
    let (cancel_handle, cancel) = cancel_pair();
    let counters = Arc::new(ConnectionCounters::default());

    let mut activities = JoinSet::new();
    activities.spawn(tagged(
        Activity::Receiver,
        receive_frames(source, offer, cancel.clone(), Arc::clone(&counters)),
    ));
    activities.spawn(tagged(
        Activity::Detector,
        detect_frames(take, sink, detector, cancel, Arc::clone(&counters)),
    ));

    let first = activities.join_next().await;
    cancel_handle.cancel();

    while let Some(loser) = activities.join_next().await {
        match loser {
            Ok((_, Ok(()))) => {}
            Ok((activity, Err(err))) => log::debug!("{} failed while shutting down: {:#}", activity, err),
            Err(err) => log::debug!("connection task failed while shutting down: {}", err),
        }
    }

    let report = counters.report();
    match first {
        Some(Ok((activity, Ok(())))) => {
            log::debug!("{} finished first, connection closed ({})", activity, report);
            Ok(report)
        }
        Some(Ok((activity, Err(err)))) => Err(err.context(format!("{} loop failed", activity))),
        Some(Err(err)) => Err(anyhow::anyhow!("connection task panicked: {}", err)),
        None => Ok(report),
    }
}

async fn tagged<F>(activity: Activity, work: F) -> (Activity, anyhow::Result<()>)
where
    F: Future<Output = anyhow::Result<()>>,
{
    (activity, work.await)
}
