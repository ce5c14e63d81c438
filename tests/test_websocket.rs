use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use bvr_live_detect::data::DetectedObjects;
use bvr_live_detect::detection_runners::SharedDetector;
use bvr_live_detect::server::{router, AppState, DEFAULT_MAX_UPLOAD_BYTES};

use fake_detector::{png_bytes, FakeDetector, GatedDetector};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn serve(detector: SharedDetector) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AppState::new(detector, DEFAULT_MAX_UPLOAD_BYTES));
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}/object-detection", addr)).await.unwrap();
    client
}

async fn next_objects(client: &mut Client) -> DetectedObjects {
    loop {
        match tokio::time::timeout(WAIT, client.next()).await.unwrap() {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            other => panic!("expected a text reply, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn binary_frame_gets_json_reply() {
    let addr = serve(Arc::new(FakeDetector::new())).await;
    let mut client = connect(addr).await;

    client.send(Message::Binary(png_bytes(48, 36))).await.unwrap();
    let objects = next_objects(&mut client).await;
    assert_eq!(objects.objects.len(), 1);
    assert_eq!(objects.objects[0].label, "person");
    assert_eq!(objects.objects[0].bbox, [0., 0., 48., 36.]);

    client.close(None).await.unwrap();
}

#[tokio::test]
async fn burst_of_frames_during_inference_gets_at_most_two_replies() {
    let (detector, started, release) = GatedDetector::new();
    let addr = serve(Arc::new(detector)).await;
    let mut client = connect(addr).await;

    client.send(Message::Binary(png_bytes(10, 10))).await.unwrap();
    tokio::time::timeout(WAIT, started.notified()).await.unwrap();
    client.send(Message::Binary(png_bytes(20, 20))).await.unwrap();
    for _ in 0..9 {
        client.send(Message::Binary(png_bytes(30, 30))).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    release.send(()).unwrap();
    release.send(()).unwrap();

    assert_eq!(next_objects(&mut client).await.objects[0].bbox, [0., 0., 10., 10.]);
    assert_eq!(next_objects(&mut client).await.objects[0].bbox, [0., 0., 20., 20.]);
    assert!(tokio::time::timeout(Duration::from_millis(300), client.next()).await.is_err());
}

#[tokio::test]
async fn text_message_closes_the_connection() {
    let detector = Arc::new(FakeDetector::new());
    let shared: SharedDetector = detector.clone();
    let addr = serve(shared).await;
    let mut client = connect(addr).await;

    client.send(Message::Text("hello".to_string())).await.unwrap();
    if let Some(Ok(Message::Text(text))) = tokio::time::timeout(WAIT, client.next()).await.unwrap() {
        panic!("unexpected reply {}", text);
    }
    assert_eq!(detector.calls(), 0);
}
