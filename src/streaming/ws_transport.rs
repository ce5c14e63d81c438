//! Websocket adapters for the connection pipeline, generic over the split halves of
//! an axum [`WebSocket`](axum::extract::ws::WebSocket).

use anyhow::Context;
use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use crate::data::Frame;
use crate::streaming::transport::{FrameSource, ResultSink};

pub struct WsFrameSource<S> {
    inner: S,
}

impl<S> WsFrameSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S> FrameSource for WsFrameSource<S>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin + Send + 'static,
{
    async fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        loop {
            match self.inner.next().await {
                None | Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(Message::Binary(bytes))) => return Ok(Some(Frame::from(bytes))),
                // pings are answered by the websocket layer itself
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Text(_))) => {
                    anyhow::bail!("expected a binary image frame, received a text message")
                }
                Some(Err(err)) => return Err(anyhow::Error::new(err).context("websocket receive failed")),
            }
        }
    }
}

pub struct WsResultSink<S> {
    inner: S,
}

impl<S> WsResultSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S> ResultSink for WsResultSink<S>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    async fn send_text(&mut self, text: String) -> anyhow::Result<()> {
        self.inner
            .send(Message::Text(text))
            .await
            .context("websocket send failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use futures::stream;

    fn source(messages: Vec<Result<Message, axum::Error>>) -> WsFrameSource<stream::Iter<std::vec::IntoIter<Result<Message, axum::Error>>>> {
        WsFrameSource::new(stream::iter(messages))
    }

    #[tokio::test]
    async fn binary_messages_become_frames_and_control_frames_are_skipped() {
        let mut source = source(vec![
            Ok(Message::Ping(vec![1])),
            Ok(Message::Binary(vec![7, 8, 9])),
            Ok(Message::Pong(vec![])),
            Ok(Message::Binary(vec![1])),
        ]);
        assert_eq!(source.next_frame().await.unwrap(), Some(Frame::new(vec![7, 8, 9])));
        assert_eq!(source.next_frame().await.unwrap(), Some(Frame::new(vec![1])));
        assert_eq!(source.next_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn close_message_ends_the_stream() {
        let mut source = source(vec![Ok(Message::Close(None)), Ok(Message::Binary(vec![1]))]);
        assert_eq!(source.next_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn text_and_transport_errors_are_failures() {
        let mut source = source(vec![Ok(Message::Text("hello".to_string()))]);
        assert!(source.next_frame().await.is_err());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let mut source = source_from_error(axum::Error::new(io));
        let err = source.next_frame().await.unwrap_err();
        assert!(format!("{err:#}").contains("websocket receive failed"));
    }

    fn source_from_error(err: axum::Error) -> WsFrameSource<stream::Iter<std::vec::IntoIter<Result<Message, axum::Error>>>> {
        source(vec![Err(err)])
    }

    #[tokio::test]
    async fn sink_sends_text_messages() {
        let (tx, mut rx) = mpsc::unbounded::<Message>();
        let mut sink = WsResultSink::new(tx);
        sink.send_text(r#"{"objects":[]}"#.to_string()).await.unwrap();

        match rx.next().await {
            Some(Message::Text(text)) => assert_eq!(text, r#"{"objects":[]}"#),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[tokio::test]
    async fn sink_reports_closed_peer() {
        let (tx, rx) = mpsc::unbounded::<Message>();
        drop(rx);
        let mut sink = WsResultSink::new(tx);
        assert!(sink.send_text("late".to_string()).await.is_err());
    }
}
