use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use bvr_live_detect::common::{InferenceDevice, ModelConfig, DEFAULT_CONF_THRESHOLD, DEFAULT_INPUT_SIZE, DEFAULT_IOU_THRESHOLD};
use bvr_live_detect::data::FsAccess;
use bvr_live_detect::server::{serve, AppState, ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use bvr_live_detect::{init_detector, detection_runners::SharedDetector};

const DEFAULT_MODEL_FILE: &str = "yolo11n.onnx";

#[derive(Parser, Debug)]
#[command(name = "bvr_live_detect", version, about = "Streaming object detection over websockets")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "BVR_BIND", default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// ONNX model weights (defaults to the bvr cache directory)
    #[arg(long, env = "BVR_MODEL")]
    model: Option<PathBuf>,

    /// Label file, one class name per line (defaults to COCO)
    #[arg(long, env = "BVR_LABELS")]
    labels: Option<PathBuf>,

    /// Path to the onnxruntime shared library
    #[arg(long, env = "BVR_ORT_LIB")]
    ort_lib: Option<PathBuf>,

    /// Execution provider: cpu, cuda[:id], tensorrt[:id] or coreml
    #[arg(long, env = "BVR_DEVICE", default_value = "cpu")]
    device: InferenceDevice,

    #[arg(long, default_value_t = DEFAULT_CONF_THRESHOLD)]
    confidence: f32,

    #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD)]
    iou: f32,

    #[arg(long, default_value_t = DEFAULT_INPUT_SIZE)]
    input_size: u32,

    /// Largest accepted one-shot upload, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,
}

impl Cli {
    fn model_config(&self) -> anyhow::Result<ModelConfig> {
        let weights_path = match &self.model {
            Some(path) => path.clone(),
            None => FsAccess::locate_model(DEFAULT_MODEL_FILE)?,
        };

        Ok(ModelConfig::new(weights_path.to_string_lossy().into_owned())
            .with_ort_lib_path(self.ort_lib.as_ref().map(|p| p.to_string_lossy().into_owned()))
            .with_labels_path(self.labels.as_ref().map(|p| p.to_string_lossy().into_owned()))
            .with_device(self.device)
            .with_conf_threshold(self.confidence)
            .with_iou_threshold(self.iou)
            .with_input_size(self.input_size))
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let model_config = cli.model_config()?;
    log::info!("{}", model_config);

    let detector: SharedDetector = Arc::new(init_detector(&model_config)?);
    let server_config = ServerConfig::new(cli.bind).with_max_upload_bytes(cli.max_upload_bytes);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    runtime.block_on(serve(&server_config, AppState::new(detector, server_config.max_upload_bytes)))
}
