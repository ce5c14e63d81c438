use std::sync::Arc;
use image::DynamicImage;
use crate::common::DetectionSet;

/// The inference collaborator: maps one decoded image to its labeled boxes.
///
/// Implementations block for the full duration of inference and apply their own
/// confidence threshold and label vocabulary. They are shared by every connection,
/// so any interior state must be synchronized.
pub trait ObjectDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> anyhow::Result<DetectionSet>;

    /// The fixed vocabulary every returned label is drawn from.
    fn labels(&self) -> &[String];
}

/// A fully initialized detector shared across connections and requests.
pub type SharedDetector = Arc<dyn ObjectDetector>;
