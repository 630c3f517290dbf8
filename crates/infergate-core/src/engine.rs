//! Supported inference engines and the model artifacts each one needs.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Inference runtime executing a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum EngineKind {
    OnnxRuntime,
    TensorRt,
    Pplnn,
    Ncnn,
    OpenVino,
    Sdk,
    TorchScript,
    Ascend,
    Snpe,
}

impl EngineKind {
    /// Every engine in the dispatch table.
    pub const ALL: [EngineKind; 9] = [
        EngineKind::OnnxRuntime,
        EngineKind::TensorRt,
        EngineKind::Pplnn,
        EngineKind::Ncnn,
        EngineKind::OpenVino,
        EngineKind::Sdk,
        EngineKind::TorchScript,
        EngineKind::Ascend,
        EngineKind::Snpe,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::OnnxRuntime => "onnxruntime",
            EngineKind::TensorRt => "tensorrt",
            EngineKind::Pplnn => "pplnn",
            EngineKind::Ncnn => "ncnn",
            EngineKind::OpenVino => "openvino",
            EngineKind::Sdk => "sdk",
            EngineKind::TorchScript => "torchscript",
            EngineKind::Ascend => "ascend",
            EngineKind::Snpe => "snpe",
        }
    }

    /// `(required, max)` number of artifacts.
    pub fn artifact_arity(&self) -> (usize, usize) {
        match self {
            EngineKind::Ncnn => (2, 2),
            EngineKind::Pplnn => (1, 2),
            _ => (1, 1),
        }
    }

    /// Human readable artifact layout, in order.
    pub fn artifact_layout(&self) -> &'static str {
        match self {
            EngineKind::OnnxRuntime => "model.onnx",
            EngineKind::TensorRt => "model.engine",
            EngineKind::Pplnn => "model.onnx [algo.json]",
            EngineKind::Ncnn => "model.param model.bin",
            EngineKind::OpenVino => "model.xml",
            EngineKind::Sdk => "model_dir",
            EngineKind::TorchScript => "model.pt",
            EngineKind::Ascend => "model.om",
            EngineKind::Snpe => "model.dlc",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        EngineKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| BridgeError::UnsupportedBackend(s.to_string()))
    }
}

impl TryFrom<String> for EngineKind {
    type Error = BridgeError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// Ordered model files for one engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet(Vec<PathBuf>);

impl ArtifactSet {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.0.get(index).map(PathBuf::as_path)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.0
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for ArtifactSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::new(iter)
    }
}
