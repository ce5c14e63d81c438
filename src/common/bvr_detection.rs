use serde::{Deserialize, Serialize};
use crate::common::BvrBox;

/// One labeled bounding box produced by an object detector.
#[derive(Default, Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct BvrDetection {
    pub class_id: usize,
    pub bbox: BvrBox,
    pub label: String,
    pub confidence: f32,
}

impl BvrDetection {
    pub fn new(class_id: usize, bbox: BvrBox, label: &str, confidence: f32) -> Self {
        Self {
            class_id,
            bbox,
            label: label.to_string(),
            confidence,
        }
    }
}

/// The detections found in a single processed frame.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct DetectionSet(Vec<BvrDetection>);

impl DetectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BvrDetection> {
        self.0.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|d| d.label.as_str()).collect()
    }
}

impl From<Vec<BvrDetection>> for DetectionSet {
    fn from(detections: Vec<BvrDetection>) -> Self {
        Self(detections)
    }
}
