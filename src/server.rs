//! HTTP surface: the streaming websocket route, the one-shot upload route and a health probe.

mod api_error;

use std::net::SocketAddr;
use std::time::Instant;

use anyhow::Context;
use axum::extract::multipart::MultipartRejection;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use futures::StreamExt;
use image::DynamicImage;

pub use api_error::ApiError;

use crate::common::DetectionSet;
use crate::data::{DetectedObjects, Frame};
use crate::detection_runners::SharedDetector;
use crate::streaming::{run_connection, WsFrameSource, WsResultSink};

pub const DETECTION_ROUTE: &str = "/object-detection";
pub const HEALTH_ROUTE: &str = "/health";
pub const IMAGE_FIELD: &str = "image";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self { bind_addr, ..Default::default() }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Shared by every request; the detector is initialized before the server starts.
#[derive(Clone)]
pub struct AppState {
    detector: SharedDetector,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(detector: SharedDetector, max_upload_bytes: usize) -> Self {
        Self { detector, max_upload_bytes }
    }

    pub fn detector(&self) -> &SharedDetector {
        &self.detector
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route(DETECTION_ROUTE, get(stream_detection).post(detect_upload))
        .route(HEALTH_ROUTE, get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Binds and serves until ctrl-c.
pub async fn serve(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}

async fn health() -> &'static str {
    "ok"
}

async fn stream_detection(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.detector))
}

async fn handle_socket(socket: WebSocket, detector: SharedDetector) {
    log::info!("Streaming connection opened");
    let (sender, receiver) = socket.split();

    match run_connection(WsFrameSource::new(receiver), WsResultSink::new(sender), detector).await {
        Ok(report) => log::info!("Streaming connection closed ({})", report),
        Err(err) => log::warn!("Streaming connection ended with error: {:#}", err),
    }
}

async fn detect_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectedObjects>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| ApiError::InvalidUpload(rejection.body_text()))?;
    let frame = read_image_field(&mut multipart).await?;

    let detector = state.detector.clone();
    let detections = tokio::task::spawn_blocking(move || -> Result<DetectionSet, ApiError> {
        let image = decode_upload(&frame)?;
        crate::run_detection(detector.as_ref(), &image).map_err(ApiError::Inference)
    })
    .await
    .map_err(|err| ApiError::Inference(anyhow::anyhow!("inference worker panicked: {}", err)))??;

    Ok(Json(DetectedObjects::from(&detections)))
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Frame, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let bytes = field.bytes().await?;
        return Ok(Frame::from(bytes.as_ref()));
    }
    Err(ApiError::MissingImage)
}

fn decode_upload(frame: &Frame) -> Result<DynamicImage, ApiError> {
    let now = Instant::now();
    let image = frame
        .decode()
        .map_err(|err| ApiError::InvalidImage(format!("{:#}", err)))?;
    log::trace!("decoded {}x{} upload in {:?}", image.width(), image.height(), now.elapsed());
    Ok(image)
}
