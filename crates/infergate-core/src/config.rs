//! Deployment configuration: tensor names, engine settings and task type.
//!
//! Stored as JSON:
//! ```json
//! {
//!   "ir_config": { "input_names": ["input"], "output_names": ["dets", "labels"] },
//!   "backend_config": { "type": "ncnn", "use_vulkan": false },
//!   "codebase_config": { "task": "ObjectDetection" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::EngineKind;
use crate::error::{BridgeError, Result};

/// Deployment metadata for one exported model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Tensor names declared at export time.
    pub ir_config: IrConfig,

    /// Engine selection and engine-specific settings.
    pub backend_config: BackendConfig,

    /// Downstream codebase settings.
    pub codebase_config: CodebaseConfig,
}

/// Tensor names of the exported graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrConfig {
    /// Graph input names, in order.
    pub input_names: Vec<String>,

    /// Graph output names, in order.
    pub output_names: Vec<String>,
}

/// Engine settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Engine the model was exported for.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<EngineKind>,

    /// Vulkan compute toggle for ncnn. Absent means off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_vulkan: Option<bool>,

    /// Any other engine-specific keys, e.g. `uri` for snpe.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Downstream codebase settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodebaseConfig {
    /// Task name, e.g. `Classification`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
}

impl DeployConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| BridgeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn ir_config(&self) -> &IrConfig {
        &self.ir_config
    }

    pub fn backend_config(&self) -> &BackendConfig {
        &self.backend_config
    }

    /// Parsed task type, `None` when no task is declared.
    pub fn task_type(&self) -> Result<Option<TaskType>> {
        self.codebase_config
            .task
            .as_deref()
            .map(str::parse)
            .transpose()
    }

    /// GPU acceleration flag for the mobile engine, off unless set.
    pub fn use_vulkan(&self) -> bool {
        self.backend_config.use_vulkan.unwrap_or(false)
    }
}

/// Downstream task a model was exported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    Classification,
    ObjectDetection,
    InstanceSegmentation,
    Segmentation,
    TextDetection,
    TextRecognition,
    SuperResolution,
    PoseDetection,
    RotatedDetection,
}

impl TaskType {
    const ALL: [TaskType; 9] = [
        TaskType::Classification,
        TaskType::ObjectDetection,
        TaskType::InstanceSegmentation,
        TaskType::Segmentation,
        TaskType::TextDetection,
        TaskType::TextRecognition,
        TaskType::SuperResolution,
        TaskType::PoseDetection,
        TaskType::RotatedDetection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Classification => "Classification",
            TaskType::ObjectDetection => "ObjectDetection",
            TaskType::InstanceSegmentation => "InstanceSegmentation",
            TaskType::Segmentation => "Segmentation",
            TaskType::TextDetection => "TextDetection",
            TaskType::TextRecognition => "TextRecognition",
            TaskType::SuperResolution => "SuperResolution",
            TaskType::PoseDetection => "PoseDetection",
            TaskType::RotatedDetection => "RotatedDetection",
        }
    }

    /// Class the SDK runtime instantiates for this task.
    pub fn sdk_class(&self) -> &'static str {
        match self {
            TaskType::Classification => "Classifier",
            TaskType::ObjectDetection => "Detector",
            TaskType::InstanceSegmentation => "InstanceSegmentation",
            TaskType::Segmentation => "Segmentor",
            TaskType::TextDetection => "TextDetector",
            TaskType::TextRecognition => "TextRecognizer",
            TaskType::SuperResolution => "Restorer",
            TaskType::PoseDetection => "PoseDetector",
            TaskType::RotatedDetection => "RotatedDetector",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        TaskType::ALL
            .into_iter()
            .find(|task| task.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                BridgeError::MissingConfiguration(format!("no SDK class for task '{}'", s))
            })
    }
}
