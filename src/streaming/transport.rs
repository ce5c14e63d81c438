use std::future::Future;
use crate::data::Frame;

/// Inbound half of a streaming connection.
pub trait FrameSource: Send + 'static {
    /// Waits for the next complete frame. `Ok(None)` means the peer closed the stream;
    /// an error is a protocol or transport failure.
    fn next_frame(&mut self) -> impl Future<Output = anyhow::Result<Option<Frame>>> + Send;
}

/// Outbound half of a streaming connection.
pub trait ResultSink: Send + 'static {
    /// Sends one text message. Any failure is fatal for the connection.
    fn send_text(&mut self, text: String) -> impl Future<Output = anyhow::Result<()>> + Send;
}
