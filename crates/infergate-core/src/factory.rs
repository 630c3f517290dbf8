//! Backend factory: turns an engine kind plus artifacts into a live adapter.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use infergate_inference::{Device, EngineAdapter, InferenceError};

use crate::config::DeployConfig;
use crate::engine::{ArtifactSet, EngineKind};
use crate::error::{BridgeError, Result};
use crate::names::ensure_unique;
use crate::params::AdapterParams;

/// Extra engine options, e.g. `uri` for snpe.
pub type EngineOptions = BTreeMap<String, serde_json::Value>;

/// Loads adapters for the engines it has linked.
///
/// Vendor SDK integrations implement this trait; the factory only decides
/// which parameters each engine receives.
pub trait AdapterProvider {
    /// Whether an adapter for `kind` is available.
    fn supports(&self, kind: EngineKind) -> bool;

    /// Load a fresh adapter.
    fn load(&self, params: AdapterParams) -> infergate_inference::Result<Box<dyn EngineAdapter>>;
}

impl<P: AdapterProvider + ?Sized> AdapterProvider for Box<P> {
    fn supports(&self, kind: EngineKind) -> bool {
        (**self).supports(kind)
    }

    fn load(&self, params: AdapterParams) -> infergate_inference::Result<Box<dyn EngineAdapter>> {
        (**self).load(params)
    }
}

/// Arguments for one [`BackendFactory::build`] call.
#[derive(Debug, Clone)]
pub struct BuildRequest<'a> {
    kind: EngineKind,
    artifacts: ArtifactSet,
    device: Device,
    input_names: Option<Vec<String>>,
    output_names: Option<Vec<String>>,
    pub(crate) deploy_config: Option<&'a DeployConfig>,
    options: EngineOptions,
}

impl<'a> BuildRequest<'a> {
    /// Create a request for `kind` on the CPU.
    pub fn new(kind: EngineKind, artifacts: ArtifactSet) -> Self {
        Self {
            kind,
            artifacts,
            device: Device::cpu(),
            input_names: None,
            output_names: None,
            deploy_config: None,
            options: EngineOptions::new(),
        }
    }

    /// Create a request from an engine name.
    ///
    /// Unknown names fail with [`BridgeError::UnsupportedBackend`].
    pub fn named(kind: &str, artifacts: ArtifactSet) -> Result<Self> {
        Ok(Self::new(kind.parse()?, artifacts))
    }

    pub fn with_device(mut self, device: impl Into<Device>) -> Self {
        self.device = device.into();
        self
    }

    pub fn with_input_names(mut self, names: Vec<String>) -> Self {
        self.input_names = Some(names);
        self
    }

    pub fn with_output_names(mut self, names: Vec<String>) -> Self {
        self.output_names = Some(names);
        self
    }

    pub fn with_deploy_config(mut self, config: &'a DeployConfig) -> Self {
        self.deploy_config = Some(config);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options.extend(options);
        self
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    /// Option from the request, then from `backend_config` of the deploy config.
    fn option_str(&self, key: &str) -> Option<String> {
        self.options
            .get(key)
            .or_else(|| {
                self.deploy_config
                    .and_then(|cfg| cfg.backend_config().extra.get(key))
            })
            .and_then(|value| match value {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
    }
}

/// Builds adapters through a closed per-engine branch table.
///
/// Holds no cache: each [`build`](Self::build) asks the provider for a new
/// adapter.
pub struct BackendFactory<P> {
    provider: P,
}

impl<P: AdapterProvider> BackendFactory<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Whether the provider has an adapter linked for `kind`.
    pub fn is_available(&self, kind: EngineKind) -> bool {
        self.provider.supports(kind)
    }

    /// Build a fresh adapter.
    pub fn build(&self, request: BuildRequest<'_>) -> Result<Box<dyn EngineAdapter>> {
        let kind = request.kind;
        let params = resolve_params(&request)?;

        if !self.provider.supports(kind) {
            return Err(BridgeError::UnsupportedBackend(format!(
                "{} (no adapter linked)",
                kind
            )));
        }

        info!(
            "Building {} adapter from {}",
            kind,
            params.primary_artifact().display()
        );

        self.provider.load(params).map_err(|e| match e {
            InferenceError::Unsupported(name) => BridgeError::UnsupportedBackend(name),
            source => BridgeError::AdapterConstruction { kind, source },
        })
    }
}

/// The branch table: which artifacts and settings each engine receives.
pub fn resolve_params(request: &BuildRequest<'_>) -> Result<AdapterParams> {
    let kind = request.kind;
    let artifacts = &request.artifacts;
    let (required, max) = kind.artifact_arity();

    if artifacts.len() < required {
        return Err(BridgeError::MissingArtifact {
            kind,
            required,
            supplied: artifacts.len(),
        });
    }
    if artifacts.len() > max {
        warn!(
            "{} uses {} artifact(s), ignoring {} extra",
            kind,
            max,
            artifacts.len() - max
        );
    }

    for names in [&request.input_names, &request.output_names].into_iter().flatten() {
        ensure_unique(names)?;
    }

    let artifact = |idx: usize| artifacts.paths()[idx].clone();
    let device = request.device.clone();
    let output_names = request.output_names.clone();

    let params = match kind {
        EngineKind::OnnxRuntime => AdapterParams::OnnxRuntime {
            onnx_file: artifact(0),
            device,
            output_names,
        },
        EngineKind::TensorRt => AdapterParams::TensorRt {
            engine_file: artifact(0),
            output_names,
        },
        EngineKind::Pplnn => AdapterParams::Pplnn {
            onnx_file: artifact(0),
            algo_file: artifacts.get(1).map(Into::into),
            device,
            output_names,
        },
        EngineKind::Ncnn => AdapterParams::Ncnn {
            param_file: artifact(0),
            bin_file: artifact(1),
            output_names,
            // No deploy config means no Vulkan.
            use_vulkan: request
                .deploy_config
                .map(DeployConfig::use_vulkan)
                .unwrap_or(false),
        },
        EngineKind::OpenVino => AdapterParams::OpenVino {
            ir_model_file: artifact(0),
            output_names,
        },
        EngineKind::Sdk => {
            let config = request.deploy_config.ok_or_else(|| {
                BridgeError::MissingConfiguration("sdk backend requires a deploy config".to_string())
            })?;
            let task = config.task_type()?.ok_or_else(|| {
                BridgeError::MissingConfiguration(
                    "sdk backend requires codebase_config.task".to_string(),
                )
            })?;
            AdapterParams::Sdk {
                model_path: artifact(0),
                task_class: task.sdk_class().to_string(),
                device,
            }
        }
        EngineKind::TorchScript => AdapterParams::TorchScript {
            model_file: artifact(0),
            input_names: request.input_names.clone(),
            output_names,
        },
        EngineKind::Ascend => AdapterParams::Ascend {
            model_file: artifact(0),
            device,
        },
        EngineKind::Snpe => AdapterParams::Snpe {
            dlc_file: artifact(0),
            uri: request.option_str("uri"),
            output_names,
        },
    };

    debug!("Resolved {} params: {:?}", kind, params);
    Ok(params)
}
