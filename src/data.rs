mod cancel_signal;
mod filesystem_access;
mod frame;
mod frame_handoff;
mod wire_messages;

pub use cancel_signal::{cancel_pair, CancelHandle, CancelSignal};
pub use filesystem_access::FsAccess;
pub use frame::Frame;
pub use frame_handoff::{frame_handoff, FrameOffer, FrameTake, Offer, HANDOFF_CAPACITY};
pub use wire_messages::{DetectedObject, DetectedObjects};
