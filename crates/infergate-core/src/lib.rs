//! Backend selection and a uniform inference facade.
//!
//! This crate provides:
//! - [`EngineKind`]: the closed set of supported inference engines
//! - [`BackendFactory`]: the per-engine branch table building adapters
//! - [`InferenceFacade`]: resolved tensor names plus one owned adapter
//! - [`BackendModel`]: the contract downstream model families implement
//!
//! Vendor engines plug in through [`AdapterProvider`]; [`NativeProvider`]
//! covers the ONNX adapters linked into this build.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod facade;
pub mod factory;
pub mod model;
pub mod names;
pub mod params;
pub mod provider;

#[cfg(test)]
mod mock;

pub use classifier::{ClassificationModel, Prediction};
pub use config::{BackendConfig, CodebaseConfig, DeployConfig, IrConfig, TaskType};
pub use engine::{ArtifactSet, EngineKind};
pub use error::{BridgeError, Result};
pub use facade::{FacadeState, InferenceFacade};
pub use factory::{resolve_params, AdapterProvider, BackendFactory, BuildRequest, EngineOptions};
pub use model::BackendModel;
pub use names::{ResolvedNames, TensorNames, DEFAULT_INPUT_NAME, DEFAULT_OUTPUT_NAME};
pub use params::AdapterParams;
pub use provider::NativeProvider;

/// Re-export adapter layer types.
pub use infergate_inference::{
    Device, EngineAdapter, InferenceError, NamedTensor, Releasable, Tensor, TensorType,
};
