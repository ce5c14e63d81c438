//! Single-slot handoff between a connection's receiver and detector loops.
//!
//! The offering side never waits: when the slot is already occupied the new
//! frame is thrown away and the queued one is kept. The taking side waits
//! until a frame is present.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use crate::data::Frame;

pub const HANDOFF_CAPACITY: usize = 1;

/// Result of offering a frame to the handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    Dropped,
}

/// Creates a connected offer/take pair sharing one slot.
pub fn frame_handoff() -> (FrameOffer, FrameTake) {
    let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);
    (FrameOffer { tx }, FrameTake { rx })
}

/// Producer half, owned by the receiver loop.
#[derive(Debug)]
pub struct FrameOffer {
    tx: mpsc::Sender<Frame>,
}

impl FrameOffer {
    /// Stores the frame if the slot is free. Never blocks; a full slot is not an error.
    pub fn try_offer(&self, frame: Frame) -> Offer {
        match self.tx.try_send(frame) {
            Ok(()) => Offer::Accepted,
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => Offer::Dropped,
        }
    }
}

/// Consumer half, owned by the detector loop.
#[derive(Debug)]
pub struct FrameTake {
    rx: mpsc::Receiver<Frame>,
}

impl FrameTake {
    /// Waits for a frame and frees the slot. Returns `None` once the offering half is gone
    /// and the slot is empty.
    pub async fn take(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }

    pub fn is_occupied(&self) -> bool {
        !self.rx.is_empty()
    }
}
