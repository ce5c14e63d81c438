use serde::{Deserialize, Serialize};
use crate::common::{BvrDetection, DetectionSet};

/// One object as it appears on the wire: `{"box": [xmin, ymin, xmax, ymax], "label": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    #[serde(rename = "box")]
    pub bbox: [f32; 4],
    pub label: String,
}

/// Response body for both the one-shot endpoint and each streamed frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedObjects {
    pub objects: Vec<DetectedObject>,
}

impl From<&BvrDetection> for DetectedObject {
    fn from(detection: &BvrDetection) -> Self {
        Self {
            bbox: detection.bbox.as_x1y1_x2y2(),
            label: detection.label.clone(),
        }
    }
}

impl From<&DetectionSet> for DetectedObjects {
    fn from(detections: &DetectionSet) -> Self {
        Self {
            objects: detections.iter().map(DetectedObject::from).collect(),
        }
    }
}

impl DetectedObjects {
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::BvrBox;

    #[test]
    fn serializes_to_objects_shape() {
        let detections = DetectionSet::from(vec![
            BvrDetection::new(0, BvrBox::new(1., 2., 3., 4.), "person", 0.9),
            BvrDetection::new(56, BvrBox::new(5.5, 6., 7., 8.), "chair", 0.8),
        ]);
        let json = DetectedObjects::from(&detections).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"objects":[{"box":[1.0,2.0,3.0,4.0],"label":"person"},{"box":[5.5,6.0,7.0,8.0],"label":"chair"}]}"#
        );
    }

    #[test]
    fn empty_set_has_empty_objects_list() {
        let json = DetectedObjects::from(&DetectionSet::new()).to_json().unwrap();
        assert_eq!(json, r#"{"objects":[]}"#);
    }
}
