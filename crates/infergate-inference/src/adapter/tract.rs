//! Tract adapter for pure Rust ONNX inference.

use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use tract_onnx::prelude::*;
use tracing::debug;

use crate::adapter::{bind_output_names, find_input, select_outputs, EngineAdapter};
use crate::{InferenceError, NamedTensor, Result, Tensor};

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Default input shape (batch=1, channels=3, height=224, width=224).
pub const DEFAULT_INPUT_SHAPE: [usize; 4] = [1, 3, 224, 224];

/// Adapter running ONNX models through tract.
///
/// Tract needs concrete input shapes to optimise the graph, so the model is
/// typed against a fixed shape at load time.
pub struct TractAdapter {
    model: RunnableModel,
    input_names: Vec<String>,
    graph_outputs: Vec<String>,
    output_names: Vec<String>,
}

impl TractAdapter {
    /// Load a model file with [`DEFAULT_INPUT_SHAPE`].
    pub fn from_file<P: AsRef<Path>>(path: P, output_names: Option<&[String]>) -> Result<Self> {
        Self::from_file_with_shape(path, &DEFAULT_INPUT_SHAPE, output_names)
    }

    /// Load a model file, fixing the first input to `input_shape`.
    pub fn from_file_with_shape<P: AsRef<Path>>(
        path: P,
        input_shape: &[usize],
        output_names: Option<&[String]>,
    ) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading ONNX model with tract from: {}", path.display());

        let bytes = std::fs::read(path)?;
        Self::from_bytes_with_shape(&bytes, input_shape, output_names)
    }

    /// Load a model from memory, fixing the first input to `input_shape`.
    pub fn from_bytes_with_shape(
        bytes: &[u8],
        input_shape: &[usize],
        output_names: Option<&[String]>,
    ) -> Result<Self> {
        debug!("Loading ONNX model with tract from {} bytes", bytes.len());

        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(bytes))
            .map_err(|e| InferenceError::ModelLoad(format!("failed to load model: {}", e)))?;

        Self::from_inference_model(model, input_shape, output_names)
    }

    fn from_inference_model(
        mut model: InferenceModel,
        input_shape: &[usize],
        output_names: Option<&[String]>,
    ) -> Result<Self> {
        let input_names: Vec<String> = model
            .input_outlets()
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?
            .iter()
            .map(|outlet| model.node(outlet.node).name.clone())
            .collect();

        let graph_outputs: Vec<String> = model
            .output_outlets()
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?
            .iter()
            .map(|outlet| model.node(outlet.node).name.clone())
            .collect();

        model
            .set_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), input_shape))
            .map_err(|e| InferenceError::ModelLoad(format!("failed to set input shape: {}", e)))?;

        let model = model
            .into_typed()
            .map_err(|e| InferenceError::ModelLoad(format!("failed to type model: {}", e)))?
            .into_optimized()
            .map_err(|e| InferenceError::ModelLoad(format!("failed to optimize: {}", e)))?
            .into_runnable()
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?;

        let output_names = bind_output_names(graph_outputs.clone(), output_names)?;

        debug!("Model inputs: {:?}", input_names);
        debug!("Model outputs: {:?}", output_names);

        Ok(Self {
            model,
            input_names,
            graph_outputs,
            output_names,
        })
    }

    fn convert_input(tensor: &Tensor) -> Result<TValue> {
        macro_rules! to_tract {
            ($arr:expr) => {{
                let data: Vec<_> = $arr.iter().cloned().collect();
                tract_ndarray::ArrayD::from_shape_vec(tract_ndarray::IxDyn($arr.shape()), data)
                    .map(|a| a.into_tvalue())
                    .map_err(|e| InferenceError::InvalidInput(e.to_string()))
            }};
        }

        match tensor {
            Tensor::Float32(arr) => to_tract!(arr),
            Tensor::Float64(arr) => to_tract!(arr),
            Tensor::Int32(arr) => to_tract!(arr),
            Tensor::Int64(arr) => to_tract!(arr),
            Tensor::Uint8(arr) => to_tract!(arr),
        }
    }
}

fn from_view<T: Clone>(view: tract_ndarray::ArrayViewD<'_, T>) -> Result<ArrayD<T>> {
    let shape = view.shape().to_vec();
    let data: Vec<T> = view.iter().cloned().collect();
    ArrayD::from_shape_vec(IxDyn(&shape), data)
        .map_err(|e| InferenceError::OutputExtraction(e.to_string()))
}

impl EngineAdapter for TractAdapter {
    fn run(&mut self, inputs: &[(&str, Tensor)]) -> Result<Vec<NamedTensor>> {
        // Tract binds inputs by position; reorder by the graph's input names.
        let tract_inputs: TVec<TValue> = self
            .input_names
            .iter()
            .enumerate()
            .map(|(idx, name)| Self::convert_input(find_input(inputs, name, idx)?))
            .collect::<Result<TVec<_>>>()?;

        let outputs = self
            .model
            .run(tract_inputs)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let mut results = Vec::with_capacity(outputs.len());

        for (name, output) in self.graph_outputs.iter().zip(outputs.iter()) {
            let tensor = if let Ok(view) = output.to_array_view::<f32>() {
                Tensor::Float32(from_view(view)?)
            } else if let Ok(view) = output.to_array_view::<i64>() {
                Tensor::Int64(from_view(view)?)
            } else if let Ok(view) = output.to_array_view::<i32>() {
                Tensor::Int32(from_view(view)?)
            } else if let Ok(view) = output.to_array_view::<f64>() {
                Tensor::Float64(from_view(view)?)
            } else if let Ok(view) = output.to_array_view::<u8>() {
                Tensor::Uint8(from_view(view)?)
            } else {
                return Err(InferenceError::OutputExtraction(format!(
                    "unsupported output type for '{}'",
                    name
                )));
            };

            results.push((name.clone(), tensor));
        }

        select_outputs(results, &self.output_names)
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TractAdapter::from_file("/nonexistent/model.onnx", None)
            .err()
            .unwrap();
        assert!(matches!(err, InferenceError::Io(_)));
    }

    #[test]
    fn test_garbage_bytes_fail_to_load() {
        let err = TractAdapter::from_bytes_with_shape(b"not an onnx graph", &DEFAULT_INPUT_SHAPE, None)
            .err()
            .unwrap();
        assert!(matches!(err, InferenceError::ModelLoad(_)));
    }
}
