mod execution_provider;
mod ort_yolo;
pub mod image_ops;
pub mod nms;

pub use ort_yolo::*;
