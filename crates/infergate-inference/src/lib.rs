//! Engine adapter layer for infergate.
//!
//! Every inference runtime is reached through the [`EngineAdapter`] trait:
//! named tensors in, named tensors out. Adapters that own releasable engine
//! resources also implement [`Releasable`] and expose it through
//! [`EngineAdapter::as_releasable`].
//!
//! Two adapters are built in:
//! - `ort` (ONNX Runtime with XNNPACK) behind the `native` feature
//! - `tract` (pure Rust ONNX) behind the `tract` feature

mod adapter;
mod device;
mod error;
mod tensor;

pub use adapter::{select_outputs, EngineAdapter, Releasable};
pub use device::Device;
pub use error::InferenceError;
pub use tensor::{NamedTensor, Tensor, TensorType};

#[cfg(feature = "native")]
pub use adapter::ort::OrtAdapter;

#[cfg(feature = "tract")]
pub use adapter::tract::TractAdapter;

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
