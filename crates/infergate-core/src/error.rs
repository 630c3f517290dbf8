//! Error types for the infergate-core library.

use thiserror::Error;

use crate::engine::EngineKind;
use infergate_inference::InferenceError;

/// Main error type for backend selection and invocation.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The engine is not in the dispatch table, or no adapter is linked for it.
    #[error("unsupported backend: {0}")]
    UnsupportedBackend(String),

    /// Fewer artifacts were supplied than the engine requires.
    #[error("{kind} requires {required} artifact(s), {supplied} supplied")]
    MissingArtifact {
        kind: EngineKind,
        required: usize,
        supplied: usize,
    },

    /// A kind-specific deployment setting is absent.
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    /// The engine failed to load or initialise the model.
    #[error("failed to construct {kind} adapter: {source}")]
    AdapterConstruction {
        kind: EngineKind,
        #[source]
        source: InferenceError,
    },

    /// The adapter failed while running inference.
    #[error("invocation failed: {0}")]
    Invocation(#[source] InferenceError),

    /// The facade was already torn down.
    #[error("adapter has been destroyed")]
    AdapterDestroyed,

    /// Rebuild was requested while an adapter is still bound.
    #[error("facade already holds a live adapter, destroy it first")]
    AlreadyBound,

    /// A tensor name appears twice in the same sequence.
    #[error("duplicate tensor name: {0}")]
    DuplicateTensorName(String),

    /// Malformed deployment configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the infergate-core library.
pub type Result<T> = std::result::Result<T, BridgeError>;
