use crate::common::BvrDetection;

pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
}

impl Nms for BvrDetection {
    /// Computes the intersection over union (IoU) between this bounding box and another.
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    /// Returns the confidence score of the bounding box.
    fn confidence(&self) -> f32 {
        self.confidence
    }
}

/// Greedy NMS: keeps boxes in descending confidence, dropping any that overlap a kept
/// box by more than `iou_threshold`.
pub fn nms<T: Nms>(boxes: &mut Vec<T>, iou_threshold: f32) {
    boxes.sort_by(|b1, b2| {
        b2.confidence()
            .partial_cmp(&b1.confidence())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut current_index = 0;
    for index in 0..boxes.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            let iou = boxes[prev_index].iou(&boxes[index]);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            boxes.swap(current_index, index);
            current_index += 1;
        }
    }
    boxes.truncate(current_index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::BvrBox;
    use rstest::rstest;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32) -> BvrDetection {
        BvrDetection::new(0, BvrBox::new(x1, y1, x2, y2), "person", confidence)
    }

    #[test]
    fn suppresses_overlapping_lower_confidence_box() {
        let mut dets = vec![det(5., 5., 105., 105., 0.8), det(0., 0., 100., 100., 0.9)];
        nms(&mut dets, 0.45);
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].confidence, 0.9);
    }

    #[test]
    fn keeps_disjoint_boxes_in_confidence_order() {
        let mut dets = vec![
            det(0., 0., 50., 50., 0.75),
            det(200., 200., 250., 250., 0.95),
            det(400., 0., 450., 50., 0.85),
        ];
        nms(&mut dets, 0.45);
        let confs: Vec<f32> = dets.iter().map(|d| d.confidence).collect();
        assert_eq!(confs, vec![0.95, 0.85, 0.75]);
    }

    #[rstest]
    #[case(0.2, 1)]
    #[case(0.5, 2)]
    fn threshold_controls_suppression(#[case] iou_threshold: f32, #[case] kept: usize) {
        // IoU of these two boxes is 1/3
        let mut dets = vec![det(0., 0., 10., 10., 0.9), det(5., 0., 15., 10., 0.8)];
        nms(&mut dets, iou_threshold);
        assert_eq!(dets.len(), kept);
    }

    #[test]
    fn empty_input_stays_empty() {
        let mut dets: Vec<BvrDetection> = Vec::new();
        nms(&mut dets, 0.45);
        assert!(dets.is_empty());
    }
}
