use anyhow::Result;
use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, CoreMLExecutionProvider,
    ExecutionProviderDispatch, TensorRTExecutionProvider,
};
use ort::session::builder::SessionBuilder;
use crate::common::InferenceDevice;

/// Registers the execution provider for `device` on the session builder. ORT falls back
/// to the CPU provider when the requested one is unavailable at runtime.
pub(crate) fn with_device(builder: SessionBuilder, device: InferenceDevice) -> Result<SessionBuilder> {
    let provider: ExecutionProviderDispatch = match device {
        InferenceDevice::CPU => CPUExecutionProvider::default().build(),
        InferenceDevice::CUDA(device_id) => CUDAExecutionProvider::default()
            .with_device_id(device_id as i32)
            .build(),
        InferenceDevice::TensorRT(device_id) => TensorRTExecutionProvider::default()
            .with_device_id(device_id as i32)
            .build(),
        InferenceDevice::CoreML => CoreMLExecutionProvider::default().build(),
    };

    log::info!("Registering ({}) execution provider", device);
    builder
        .with_execution_providers([provider])
        .map_err(|err| anyhow::anyhow!("failed to register {} execution provider: {}", device, err))
}
