//! YOLOv8 / YOLOv11 object detector on ONNX Runtime.
//!
//! Output layout is `[1, 4 + nc, anchors]` (or its transpose): `cx, cy, w, h`
//! in letterboxed model pixels followed by one score per class.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::parallel::prelude::*;
use ndarray::{s, Array2, Array4, ArrayView2, Axis, Ix2};
use ort::session::Session;
use ort::value::{Tensor, ValueType};
use parking_lot::Mutex;

use crate::common::{label_for, load_labels, BvrBox, BvrDetection, DetectionSet, ModelConfig};
use crate::detection_runners::inference_process::ObjectDetector;
use crate::detection_runners::ort_detector::execution_provider::with_device;
use crate::detection_runners::ort_detector::image_ops::{letterbox, LetterboxTransform};
use crate::detection_runners::ort_detector::nms::nms;
use crate::utils;

fn ort_error(err: impl std::fmt::Display) -> anyhow::Error {
    anyhow::anyhow!("onnxruntime: {}", err)
}

pub struct OrtYolo {
    session: Mutex<Session>,
    labels: Vec<String>,
    input_size: u32,
    conf_threshold: f32,
    iou_threshold: f32,
}

impl OrtYolo {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        config.validate()?;

        // Without an explicit path ort loads the library named by ORT_DYLIB_PATH.
        if let Some(lib_path) = &config.ort_lib_path {
            let committed = ort::init_from(lib_path).map_err(ort_error)?.commit();
            log::debug!("ORT environment from {}: {:?}", lib_path, committed);
        }

        let weights = Path::new(&config.weights_path);
        if !weights.is_file() {
            anyhow::bail!("model weights not found at {}", weights.display());
        }

        let builder = Session::builder().map_err(ort_error)?;
        let session = with_device(builder, config.inference_device)?
            .commit_from_file(weights)
            .map_err(ort_error)
            .with_context(|| format!("failed to load model {}", weights.display()))?;

        let input_size = model_input_size(&session).unwrap_or(config.input_size);
        let labels = load_labels(config.labels_path.as_deref())?;

        log::info!(
            "YOLO model loaded | Input: {}x{} | Labels: {} | Device: {}",
            input_size, input_size, labels.len(), config.inference_device
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
            input_size,
            conf_threshold: config.conf_threshold,
            iou_threshold: config.iou_threshold,
        })
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    /// Pre-process the input image.
    fn preprocess(&self, image: &DynamicImage) -> Result<(Array4<f32>, LetterboxTransform)> {
        letterbox(image, self.input_size)
    }

    /// Runs the session and returns predictions as `[4 + nc, anchors]`.
    fn inference(&self, input: Array4<f32>) -> Result<Array2<f32>> {
        let input = Tensor::from_array(input).map_err(ort_error)?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input]).map_err(ort_error)?;
        if outputs.len() == 0 {
            anyhow::bail!("YOLO model produced no outputs");
        }
        let output = outputs[0].try_extract_array::<f32>().map_err(ort_error)?;
        if output.ndim() != 3 {
            anyhow::bail!("unexpected YOLO output shape {:?}", output.shape());
        }

        let preds = output
            .index_axis(Axis(0), 0)
            .into_dimensionality::<Ix2>()?
            .to_owned();

        // Anchors always outnumber features; transposed exports put anchors first.
        Ok(if preds.nrows() > preds.ncols() {
            preds.reversed_axes()
        } else {
            preds
        })
    }

    /// Post-process the model's output.
    fn postprocess(&self, preds: ArrayView2<f32>, transform: &LetterboxTransform) -> DetectionSet {
        if preds.nrows() <= 4 {
            return DetectionSet::new();
        }

        let mut detections: Vec<BvrDetection> = preds
            .axis_iter(Axis(1))
            .into_par_iter()
            .filter_map(|pred| {
                let (class_id, &confidence) = pred
                    .slice(s![4..])
                    .into_iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))?;

                // filtering low scores
                if confidence <= self.conf_threshold {
                    return None;
                }

                let bbox = BvrBox::default().with_cxcy_wh(pred[0], pred[1], pred[2], pred[3]);
                let bbox = transform.restore(bbox);
                if bbox.area() <= 0. {
                    return None;
                }

                Some(BvrDetection::new(class_id, bbox, &label_for(&self.labels, class_id), confidence))
            })
            .collect();

        nms(&mut detections, self.iou_threshold);
        DetectionSet::from(detections)
    }
}

impl ObjectDetector for OrtYolo {
    fn detect(&self, image: &DynamicImage) -> Result<DetectionSet> {
        let detect_time = Instant::now();

        let (input, transform) = self.preprocess(image)?;
        let mut _detect_elapsed = utils::trace("TIME", "Preprocessing input", detect_time, Duration::ZERO);

        let preds = self.inference(input)?;
        _detect_elapsed = utils::trace("TIME", "Detection run", detect_time, _detect_elapsed);

        let detections = self.postprocess(preds.view(), &transform);
        utils::trace("TIME", "Postprocessing", detect_time, _detect_elapsed);

        Ok(detections)
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Reads the square input size from an NCHW input shape, if the model fixes it.
fn model_input_size(session: &Session) -> Option<u32> {
    session.inputs().first().and_then(|input| {
        if let ValueType::Tensor { ref shape, .. } = input.dtype() {
            if shape.len() >= 4 && shape[2] > 0 {
                return Some(shape[2] as u32);
            }
        }
        None
    })
}
