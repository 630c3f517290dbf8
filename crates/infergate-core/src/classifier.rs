//! Image classification on any engine.

use std::io::Write;

use ndarray::{Array4, ArrayView1, Axis};
use serde::Serialize;
use tracing::debug;

use infergate_inference::{InferenceError, NamedTensor, Tensor};

use crate::error::{BridgeError, Result};
use crate::facade::InferenceFacade;
use crate::model::BackendModel;

const DEFAULT_TOP_K: usize = 5;

/// One ranked class for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub class_id: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub score: f32,
}

/// Classifier taking NCHW float images and returning top-k classes per image.
#[derive(Debug)]
pub struct ClassificationModel {
    facade: InferenceFacade,
    labels: Vec<String>,
    top_k: usize,
}

impl ClassificationModel {
    pub fn new(facade: InferenceFacade) -> Self {
        Self {
            facade,
            labels: Vec::new(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Class labels, indexed by class id.
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Pick the score tensor: the first declared output, else whatever came first.
    fn score_tensor(&self, outputs: Vec<NamedTensor>) -> Result<Tensor> {
        let wanted = self.facade.output_names().first();
        let mut fallback = None;

        for (name, tensor) in outputs {
            if Some(&name) == wanted {
                return Ok(tensor);
            }
            fallback.get_or_insert(tensor);
        }

        fallback.ok_or_else(|| {
            BridgeError::Invocation(InferenceError::OutputExtraction(
                "classifier produced no outputs".to_string(),
            ))
        })
    }

    fn rank(&self, row: ArrayView1<'_, f32>) -> Vec<Prediction> {
        let probs = normalize(row);
        let mut order: Vec<usize> = (0..probs.len()).collect();
        order.sort_by(|&a, &b| probs[b].total_cmp(&probs[a]));

        order
            .into_iter()
            .take(self.top_k)
            .map(|class_id| Prediction {
                class_id,
                label: self.labels.get(class_id).cloned(),
                score: probs[class_id],
            })
            .collect()
    }
}

/// Softmax unless the row already is a probability distribution.
fn normalize(row: ArrayView1<'_, f32>) -> Vec<f32> {
    let sum: f32 = row.sum();
    if row.iter().all(|&v| (0.0..=1.0).contains(&v)) && (sum - 1.0).abs() < 1e-3 {
        return row.to_vec();
    }

    let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    let exps: Vec<f32> = row.iter().map(|&v| (v - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl BackendModel for ClassificationModel {
    type Input = Array4<f32>;
    type Output = Vec<Vec<Prediction>>;

    fn facade(&self) -> &InferenceFacade {
        &self.facade
    }

    fn facade_mut(&mut self) -> &mut InferenceFacade {
        &mut self.facade
    }

    fn forward(&mut self, input: Array4<f32>) -> Result<Self::Output> {
        let batch = input.shape()[0];
        let outputs = self.facade.invoke_input(Tensor::from(input.into_dyn()))?;
        let scores = self.score_tensor(outputs)?;

        let scores = scores.as_f32().ok_or_else(|| {
            BridgeError::Invocation(InferenceError::OutputExtraction(format!(
                "expected float32 scores, got {}",
                scores.dtype()
            )))
        })?;

        let per_image = scores.len() / batch.max(1);
        let rows = scores
            .to_shape((batch, per_image))
            .map_err(|e| BridgeError::Invocation(InferenceError::OutputExtraction(e.to_string())))?;

        debug!("Classifying {} image(s) over {} classes", batch, per_image);

        Ok(rows.axis_iter(Axis(0)).map(|row| self.rank(row)).collect())
    }

    fn show_result(&self, output: &Self::Output, out: &mut dyn Write) -> Result<()> {
        for (image, predictions) in output.iter().enumerate() {
            writeln!(out, "image {}:", image)?;
            for p in predictions {
                match &p.label {
                    Some(label) => writeln!(out, "  {:>5}  {:.4}  {}", p.class_id, p.score, label)?,
                    None => writeln!(out, "  {:>5}  {:.4}", p.class_id, p.score)?,
                }
            }
        }
        Ok(())
    }
}
