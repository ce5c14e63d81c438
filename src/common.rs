mod bvr_box;
mod bvr_detection;
mod inference_device;
mod labels;
mod model_config;

pub use bvr_box::*;
pub use bvr_detection::*;
pub use inference_device::*;
pub use labels::*;
pub use model_config::*;
