//! ONNX Runtime (ort) adapter with the XNNPACK execution provider.

use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use ort::ep::XNNPACK;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::{Session, SessionInputValue};
use ort::value::Tensor as OrtTensor;
use tracing::{debug, warn};

use crate::adapter::{bind_output_names, select_outputs, EngineAdapter, Releasable};
use crate::{Device, InferenceError, NamedTensor, Result, Tensor};

const INTRA_THREADS: usize = 4;

/// Adapter running ONNX models through ONNX Runtime.
pub struct OrtAdapter {
    session: Option<Session>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl OrtAdapter {
    /// Load a model file.
    ///
    /// When `output_names` is `None` the names are read from the model graph.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        device: &Device,
        output_names: Option<&[String]>,
    ) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading ONNX model for ort from: {}", path.display());

        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, device, output_names)
    }

    /// Load a model from memory.
    pub fn from_bytes(
        bytes: &[u8],
        device: &Device,
        output_names: Option<&[String]>,
    ) -> Result<Self> {
        debug!("Loading ONNX model from {} bytes on {}", bytes.len(), device);

        if !device.is_cpu() {
            warn!(
                "ort adapter is built with the XNNPACK provider only, running '{}' model on cpu",
                device
            );
        }

        let session = Session::builder()
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .with_execution_providers([XNNPACK::default().build()])
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .with_intra_threads(INTRA_THREADS)
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .commit_from_memory(bytes)
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|i| i.name().to_string())
            .collect();

        let graph_outputs: Vec<String> = session
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .collect();

        let output_names = bind_output_names(graph_outputs, output_names)?;

        debug!("Model inputs: {:?}", input_names);
        debug!("Model outputs: {:?}", output_names);

        Ok(Self {
            session: Some(session),
            input_names,
            output_names,
        })
    }

    fn convert_input(tensor: &Tensor) -> Result<SessionInputValue<'static>> {
        macro_rules! to_ort {
            ($arr:expr) => {{
                let shape: Vec<i64> = $arr.shape().iter().map(|&s| s as i64).collect();
                let data: Vec<_> = $arr.iter().cloned().collect();
                OrtTensor::from_array((shape, data))
                    .map(Into::into)
                    .map_err(|e| InferenceError::InvalidInput(e.to_string()))
            }};
        }

        match tensor {
            Tensor::Float32(arr) => to_ort!(arr),
            Tensor::Float64(arr) => to_ort!(arr),
            Tensor::Int32(arr) => to_ort!(arr),
            Tensor::Int64(arr) => to_ort!(arr),
            Tensor::Uint8(arr) => to_ort!(arr),
        }
    }
}

fn to_array<'a, T: Clone>(
    shape: impl Iterator<Item = &'a i64>,
    data: &[T],
) -> Result<ArrayD<T>> {
    let shape: Vec<usize> = shape.map(|&s| s as usize).collect();
    ArrayD::from_shape_vec(IxDyn(&shape), data.to_vec())
        .map_err(|e| InferenceError::OutputExtraction(e.to_string()))
}

impl EngineAdapter for OrtAdapter {
    fn run(&mut self, inputs: &[(&str, Tensor)]) -> Result<Vec<NamedTensor>> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| InferenceError::InferenceFailed("session already released".to_string()))?;

        let ort_inputs: Vec<(&str, SessionInputValue<'static>)> = inputs
            .iter()
            .map(|(name, tensor)| Ok((*name, Self::convert_input(tensor)?)))
            .collect::<Result<Vec<_>>>()?;

        let outputs = session
            .run(ort_inputs)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let mut results = Vec::with_capacity(outputs.len());

        for (name, value) in outputs.iter() {
            let tensor = if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
                Tensor::Float32(to_array(shape.iter(), data)?)
            } else if let Ok((shape, data)) = value.try_extract_tensor::<i64>() {
                Tensor::Int64(to_array(shape.iter(), data)?)
            } else if let Ok((shape, data)) = value.try_extract_tensor::<i32>() {
                Tensor::Int32(to_array(shape.iter(), data)?)
            } else if let Ok((shape, data)) = value.try_extract_tensor::<f64>() {
                Tensor::Float64(to_array(shape.iter(), data)?)
            } else if let Ok((shape, data)) = value.try_extract_tensor::<u8>() {
                Tensor::Uint8(to_array(shape.iter(), data)?)
            } else {
                return Err(InferenceError::OutputExtraction(format!(
                    "unsupported output type for '{}'",
                    name
                )));
            };

            results.push((name.to_string(), tensor));
        }

        select_outputs(results, &self.output_names)
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }

    fn as_releasable(&mut self) -> Option<&mut dyn Releasable> {
        Some(self)
    }
}

impl Releasable for OrtAdapter {
    fn release(&mut self) {
        if self.session.take().is_some() {
            debug!("Released ort session");
        }
    }
}
