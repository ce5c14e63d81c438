use std::sync::Arc;
use anyhow::Context;
use crate::data::{CancelSignal, DetectedObjects, Frame, FrameTake};
use crate::detection_runners::SharedDetector;
use crate::streaming::supervisor::ConnectionCounters;
use crate::streaming::transport::ResultSink;

/// Takes frames from the handoff, runs decode + inference on the blocking pool and sends
/// one JSON message per frame. Decode, inference and send failures end the loop.
///
/// Cancellation is observed while waiting for a frame, before each send and while a send
/// is pending. An inference that has already started is allowed to finish; its result is
/// then discarded.
pub(crate) async fn detect_frames<K: ResultSink>(
    mut take: FrameTake,
    mut sink: K,
    detector: SharedDetector,
    mut cancel: CancelSignal,
    counters: Arc<ConnectionCounters>,
) -> anyhow::Result<()> {
    loop {
        let frame = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            frame = take.take() => frame,
        };

        let Some(frame) = frame else {
            // The receiver is gone; its outcome decides the connection, so wait to be cancelled.
            cancel.cancelled().await;
            return Ok(());
        };

        let worker_detector = Arc::clone(&detector);
        let detections = tokio::task::spawn_blocking(move || detect_frame(worker_detector, frame))
            .await
            .context("inference worker panicked")??;

        if cancel.is_cancelled() {
            log::debug!("connection closing, discarding {} detections", detections.len());
            return Ok(());
        }

        let message = DetectedObjects::from(&detections).to_json()?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::debug!("connection closing with a response still unsent");
                return Ok(());
            }
            sent = sink.send_text(message) => sent?,
        }
        counters.response_sent();
    }
}

fn detect_frame(detector: SharedDetector, frame: Frame) -> anyhow::Result<crate::common::DetectionSet> {
    let image = frame.decode()?;
    // the encoded bytes are not needed past this point
    drop(frame);
    crate::run_detection(detector.as_ref(), &image)
}
