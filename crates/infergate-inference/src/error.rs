//! Error types for the adapter layer.

use thiserror::Error;

/// Errors raised by engine adapters while loading or running a model.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The engine could not load the model artifact.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The engine loaded the model but could not create a runnable session.
    #[error("failed to create session: {0}")]
    SessionCreate(String),

    /// No adapter is linked for the requested engine.
    #[error("no adapter available for engine '{0}'")]
    Unsupported(String),

    /// Invalid input tensor shape, type or name.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Inference execution failed.
    #[error("inference failed: {0}")]
    InferenceFailed(String),

    /// Output tensor extraction failed.
    #[error("failed to extract output: {0}")]
    OutputExtraction(String),

    /// A requested output name is not produced by the model.
    #[error("model has no output named '{0}'")]
    UnknownOutput(String),

    /// I/O error when reading model files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
