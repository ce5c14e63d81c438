use std::fmt;
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InferenceDevice {
    #[default] CPU,
    CUDA(usize),
    TensorRT(usize),
    CoreML,
}

// Hardcoded device names. Storing the "proper" spelling and the lowercase version.
const CPU: [&str; 2] = ["CPU", "cpu"];
const CUDA: [&str; 2] = ["CUDA", "cuda"];
const TENSOR_RT: [&str; 2] = ["TensorRT", "tensorrt"];
const CORE_ML: [&str; 2] = ["CoreML", "coreml"];

impl InferenceDevice {
    pub fn from_name(device: &str, device_id: usize) -> Option<Self> {
        match device.to_lowercase().as_str() {
            "cpu" => Some(InferenceDevice::CPU),
            "cuda" => Some(InferenceDevice::CUDA(device_id)),
            "tensorrt" => Some(InferenceDevice::TensorRT(device_id)),
            "coreml" => Some(InferenceDevice::CoreML),
            _ => None,
        }
    }

    pub fn str(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => CPU[0],
            InferenceDevice::CUDA(_) => CUDA[0],
            InferenceDevice::TensorRT(_) => TENSOR_RT[0],
            InferenceDevice::CoreML => CORE_ML[0],
        }
    }

    pub fn str_lowercase(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => CPU[1],
            InferenceDevice::CUDA(_) => CUDA[1],
            InferenceDevice::TensorRT(_) => TENSOR_RT[1],
            InferenceDevice::CoreML => CORE_ML[1],
        }
    }

    pub fn device_id(&self) -> Option<usize> {
        match self {
            InferenceDevice::CUDA(id) | InferenceDevice::TensorRT(id) => Some(*id),
            InferenceDevice::CPU | InferenceDevice::CoreML => None,
        }
    }

    pub fn all_inference_devices() -> Vec<String> {
        vec![
            InferenceDevice::CPU.str_lowercase().to_string(),
            InferenceDevice::CUDA(0).str_lowercase().to_string(),
            InferenceDevice::TensorRT(0).str_lowercase().to_string(),
            InferenceDevice::CoreML.str_lowercase().to_string(),
        ]
    }
}

impl fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.device_id() {
            Some(id) => write!(f, "{}:{}", self.str(), id),
            None => f.write_str(self.str()),
        }
    }
}

/// Parses `cpu`, `coreml`, `cuda`, `cuda:1`, `tensorrt:0` and so on.
impl FromStr for InferenceDevice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (name, device_id) = match s.split_once(':') {
            Some((name, id)) => (name, id.trim().parse::<usize>()?),
            None => (s, 0),
        };
        InferenceDevice::from_name(name.trim(), device_id).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown inference device '{}', expected one of: {}",
                s,
                InferenceDevice::all_inference_devices().join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cpu", InferenceDevice::CPU)]
    #[case("CPU", InferenceDevice::CPU)]
    #[case("cuda", InferenceDevice::CUDA(0))]
    #[case("cuda:1", InferenceDevice::CUDA(1))]
    #[case("TensorRT:2", InferenceDevice::TensorRT(2))]
    #[case("coreml", InferenceDevice::CoreML)]
    fn parses_device_names(#[case] input: &str, #[case] expected: InferenceDevice) {
        assert_eq!(input.parse::<InferenceDevice>().unwrap(), expected);
    }

    #[rstest]
    #[case("rocm")]
    #[case("cuda:x")]
    #[case("")]
    fn rejects_unknown_devices(#[case] input: &str) {
        assert!(input.parse::<InferenceDevice>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let device = InferenceDevice::CUDA(3);
        assert_eq!(device.to_string(), "CUDA:3");
        assert_eq!(device.to_string().parse::<InferenceDevice>().unwrap(), device);
    }
}
