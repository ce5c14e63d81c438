use std::fmt;
use crate::common::inference_device::InferenceDevice;

pub const DEFAULT_CONF_THRESHOLD: f32 = 0.7;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;
pub const DEFAULT_INPUT_SIZE: u32 = 640;
pub const MAX_INPUT_SIZE: u32 = 4096;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub weights_path: String,
    /// Path to the onnxruntime shared library. Falls back to `ORT_DYLIB_PATH`.
    pub ort_lib_path: Option<String>,
    /// One label per line. When absent the COCO vocabulary is used.
    pub labels_path: Option<String>,
    pub inference_device: InferenceDevice,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    /// Square model input side. Models with a fixed input shape override it.
    pub input_size: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: String::new(),
            ort_lib_path: None,
            labels_path: None,
            inference_device: InferenceDevice::default(),
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            input_size: DEFAULT_INPUT_SIZE,
        }
    }
}

impl ModelConfig {
    pub fn new(weights_path: String) -> Self {
        Self {
            weights_path,
            ..Default::default()
        }
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: Option<String>) -> Self {
        self.ort_lib_path = ort_lib_path;
        self
    }

    pub fn with_labels_path(mut self, labels_path: Option<String>) -> Self {
        self.labels_path = labels_path;
        self
    }

    pub fn with_device(mut self, device: InferenceDevice) -> Self {
        self.inference_device = device;
        self
    }

    pub fn with_conf_threshold(mut self, conf_threshold: f32) -> Self {
        self.conf_threshold = conf_threshold;
        self
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn with_input_size(mut self, size: u32) -> Self {
        self.input_size = size;
        self
    }

    pub fn get_threshold(&self) -> f32 {
        self.conf_threshold
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.weights_path.is_empty() {
            anyhow::bail!("no model weights path configured");
        }
        if !(0.0..1.0).contains(&self.conf_threshold) {
            anyhow::bail!("confidence threshold must be in [0, 1), got {}", self.conf_threshold);
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            anyhow::bail!("IoU threshold must be in [0, 1], got {}", self.iou_threshold);
        }
        if self.input_size == 0 || self.input_size > MAX_INPUT_SIZE {
            anyhow::bail!("model input size must be in 1..={}, got {}", MAX_INPUT_SIZE, self.input_size);
        }
        Ok(())
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Weights File Path: {}\n\
        Labels Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Model Input Resolution: {}x{}\n\
        Detection Threshold: {}\n\
        NMS IoU Threshold: {}",
               self.weights_path,
               self.labels_path.as_deref().unwrap_or("<builtin COCO>"),
               self.ort_lib_path.as_deref().unwrap_or("<ORT_DYLIB_PATH>"),
               self.inference_device,
               self.input_size, self.input_size,
               self.conf_threshold, self.iou_threshold)
    }
}
