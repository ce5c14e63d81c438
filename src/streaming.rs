mod detector_loop;
mod receiver_loop;
mod supervisor;
mod transport;
mod ws_transport;

pub use supervisor::{run_connection, ConnectionReport};
pub use transport::{FrameSource, ResultSink};
pub use ws_transport::{WsFrameSource, WsResultSink};
