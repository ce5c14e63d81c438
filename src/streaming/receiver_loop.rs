use std::sync::Arc;
use crate::data::{CancelSignal, FrameOffer, Offer};
use crate::streaming::supervisor::ConnectionCounters;
use crate::streaming::transport::FrameSource;

/// Drains the transport into the handoff until the peer closes, the transport fails,
/// or the supervisor cancels. Never inspects frame contents and never waits on the detector.
pub(crate) async fn receive_frames<S: FrameSource>(
    mut source: S,
    offer: FrameOffer,
    mut cancel: CancelSignal,
    counters: Arc<ConnectionCounters>,
) -> anyhow::Result<()> {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            next = source.next_frame() => next?,
        };

        let Some(frame) = next else {
            log::debug!("client closed the stream");
            return Ok(());
        };

        match offer.try_offer(frame) {
            Offer::Accepted => counters.frame_accepted(),
            Offer::Dropped => {
                counters.frame_dropped();
                log::trace!("detector busy, frame dropped");
            }
        }
    }
}
