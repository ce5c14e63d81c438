mod utils;
pub mod common;
pub mod data;
pub mod detection_runners;
pub mod server;
pub mod streaming;

use std::time::Instant;
use image::DynamicImage;
use crate::common::{DetectionSet, ModelConfig};
use crate::detection_runners::{ObjectDetector, OrtYolo};

/// Loads the model described by `model_details` and runs one warm-up pass, so the
/// first real frame does not pay for session initialization.
pub fn init_detector(model_details: &ModelConfig) -> anyhow::Result<OrtYolo> {
    log::info!("Initializing ORT session with ({}) execution provider", model_details.inference_device);
    let yolo = OrtYolo::new(model_details)?;

    let size = yolo.input_size();
    let warmup = Instant::now();
    yolo.detect(&DynamicImage::new_rgb8(size, size))?;
    log::debug!("Warm-up inference took {:?}", warmup.elapsed());

    Ok(yolo)
}

/// Runs one blocking detection. Callers on the async runtime go through `spawn_blocking`.
pub fn run_detection(detector: &dyn ObjectDetector, image: &DynamicImage) -> anyhow::Result<DetectionSet> {
    let now = Instant::now();
    let detections = detector.detect(image)?;
    log::debug!(
        "{} detections on {}x{} image, processing time: {:?}",
        detections.len(), image.width(), image.height(), now.elapsed()
    );
    Ok(detections)
}
