use anyhow::Context;
use crate::utils;

/// COCO class names, in the order YOLO models trained on COCO emit them.
pub const COCO_LABELS: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Loads the label vocabulary, one label per line, or the COCO set when no file is given.
pub fn load_labels(labels_path: Option<&str>) -> anyhow::Result<Vec<String>> {
    match labels_path {
        Some(path) => {
            let labels = utils::file_to_vec(path)
                .with_context(|| format!("failed to read labels file {path}"))?;
            if labels.is_empty() {
                anyhow::bail!("labels file {path} is empty");
            }
            Ok(labels)
        }
        None => Ok(COCO_LABELS.iter().map(|l| l.to_string()).collect()),
    }
}

/// Returns the label for a class id, or a numbered placeholder when the vocabulary is too short.
pub fn label_for(labels: &[String], class_id: usize) -> String {
    labels
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| format!("# {}", class_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_vocabulary_is_coco() {
        let labels = load_labels(None).unwrap();
        assert_eq!(labels.len(), 80);
        assert_eq!(labels[0], "person");
        assert_eq!(labels[60], "dining table");
    }

    #[test]
    fn unknown_class_gets_placeholder() {
        let labels = vec!["cat".to_string()];
        assert_eq!(label_for(&labels, 0), "cat");
        assert_eq!(label_for(&labels, 7), "# 7");
    }

    #[test]
    fn missing_labels_file_is_an_error() {
        assert!(load_labels(Some("/definitely/not/here/labels.txt")).is_err());
    }
}
