//! Dynamically shaped tensors exchanged with engine adapters.

use ndarray::{ArrayD, IxDyn};

use crate::{InferenceError, Result};

/// Element type of a [`Tensor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorType {
    Float32,
    Float64,
    Int32,
    Int64,
    Uint8,
}

impl TensorType {
    /// Short lowercase name, as used by ONNX tooling.
    pub fn as_str(&self) -> &'static str {
        match self {
            TensorType::Float32 => "float32",
            TensorType::Float64 => "float64",
            TensorType::Int32 => "int32",
            TensorType::Int64 => "int64",
            TensorType::Uint8 => "uint8",
        }
    }
}

impl std::fmt::Display for TensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tensor passed to or returned from an engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    Uint8(ArrayD<u8>),
}

/// A tensor together with the graph name it binds to.
pub type NamedTensor = (String, Tensor);

macro_rules! each_variant {
    ($value:expr, $arr:ident => $body:expr) => {
        match $value {
            Tensor::Float32($arr) => $body,
            Tensor::Float64($arr) => $body,
            Tensor::Int32($arr) => $body,
            Tensor::Int64($arr) => $body,
            Tensor::Uint8($arr) => $body,
        }
    };
}

impl Tensor {
    /// Shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        each_variant!(self, arr => arr.shape())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        each_variant!(self, arr => arr.len())
    }

    /// Whether the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type of the tensor.
    pub fn dtype(&self) -> TensorType {
        match self {
            Tensor::Float32(_) => TensorType::Float32,
            Tensor::Float64(_) => TensorType::Float64,
            Tensor::Int32(_) => TensorType::Int32,
            Tensor::Int64(_) => TensorType::Int64,
            Tensor::Uint8(_) => TensorType::Uint8,
        }
    }

    /// Build a Float32 tensor from flat data and a shape.
    pub fn from_f32(data: Vec<f32>, shape: &[usize]) -> Result<Self> {
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(Tensor::Float32)
            .map_err(|e| InferenceError::InvalidInput(e.to_string()))
    }

    /// Build a Uint8 tensor from flat data and a shape.
    pub fn from_u8(data: Vec<u8>, shape: &[usize]) -> Result<Self> {
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(Tensor::Uint8)
            .map_err(|e| InferenceError::InvalidInput(e.to_string()))
    }

    /// Borrow the inner Float32 array.
    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            Tensor::Float32(arr) => Some(arr),
            _ => None,
        }
    }

    /// Copy the elements out as `f64`, whatever the element type.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Tensor::Float32(arr) => arr.iter().map(|&v| v as f64).collect(),
            Tensor::Float64(arr) => arr.iter().copied().collect(),
            Tensor::Int32(arr) => arr.iter().map(|&v| v as f64).collect(),
            Tensor::Int64(arr) => arr.iter().map(|&v| v as f64).collect(),
            Tensor::Uint8(arr) => arr.iter().map(|&v| v as f64).collect(),
        }
    }
}

impl From<ArrayD<f32>> for Tensor {
    fn from(arr: ArrayD<f32>) -> Self {
        Tensor::Float32(arr)
    }
}
