//! Typed construction parameters, one variant per engine.

use std::path::{Path, PathBuf};

use infergate_inference::Device;

use crate::engine::EngineKind;

/// Everything an engine needs to load a model, and nothing it ignores.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterParams {
    OnnxRuntime {
        onnx_file: PathBuf,
        device: Device,
        output_names: Option<Vec<String>>,
    },
    TensorRt {
        engine_file: PathBuf,
        output_names: Option<Vec<String>>,
    },
    Pplnn {
        onnx_file: PathBuf,
        algo_file: Option<PathBuf>,
        device: Device,
        output_names: Option<Vec<String>>,
    },
    Ncnn {
        param_file: PathBuf,
        bin_file: PathBuf,
        output_names: Option<Vec<String>>,
        use_vulkan: bool,
    },
    OpenVino {
        ir_model_file: PathBuf,
        output_names: Option<Vec<String>>,
    },
    Sdk {
        model_path: PathBuf,
        task_class: String,
        device: Device,
    },
    TorchScript {
        model_file: PathBuf,
        input_names: Option<Vec<String>>,
        output_names: Option<Vec<String>>,
    },
    Ascend {
        model_file: PathBuf,
        device: Device,
    },
    Snpe {
        dlc_file: PathBuf,
        uri: Option<String>,
        output_names: Option<Vec<String>>,
    },
}

impl AdapterParams {
    pub fn kind(&self) -> EngineKind {
        match self {
            AdapterParams::OnnxRuntime { .. } => EngineKind::OnnxRuntime,
            AdapterParams::TensorRt { .. } => EngineKind::TensorRt,
            AdapterParams::Pplnn { .. } => EngineKind::Pplnn,
            AdapterParams::Ncnn { .. } => EngineKind::Ncnn,
            AdapterParams::OpenVino { .. } => EngineKind::OpenVino,
            AdapterParams::Sdk { .. } => EngineKind::Sdk,
            AdapterParams::TorchScript { .. } => EngineKind::TorchScript,
            AdapterParams::Ascend { .. } => EngineKind::Ascend,
            AdapterParams::Snpe { .. } => EngineKind::Snpe,
        }
    }

    /// The first, always-required artifact.
    pub fn primary_artifact(&self) -> &Path {
        match self {
            AdapterParams::OnnxRuntime { onnx_file, .. } => onnx_file,
            AdapterParams::TensorRt { engine_file, .. } => engine_file,
            AdapterParams::Pplnn { onnx_file, .. } => onnx_file,
            AdapterParams::Ncnn { param_file, .. } => param_file,
            AdapterParams::OpenVino { ir_model_file, .. } => ir_model_file,
            AdapterParams::Sdk { model_path, .. } => model_path,
            AdapterParams::TorchScript { model_file, .. } => model_file,
            AdapterParams::Ascend { model_file, .. } => model_file,
            AdapterParams::Snpe { dlc_file, .. } => dlc_file,
        }
    }

    /// Output names forwarded to the engine, if the engine accepts them.
    pub fn output_names(&self) -> Option<&[String]> {
        match self {
            AdapterParams::OnnxRuntime { output_names, .. }
            | AdapterParams::TensorRt { output_names, .. }
            | AdapterParams::Pplnn { output_names, .. }
            | AdapterParams::Ncnn { output_names, .. }
            | AdapterParams::OpenVino { output_names, .. }
            | AdapterParams::TorchScript { output_names, .. }
            | AdapterParams::Snpe { output_names, .. } => output_names.as_deref(),
            AdapterParams::Sdk { .. } | AdapterParams::Ascend { .. } => None,
        }
    }
}
