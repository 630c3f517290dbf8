//! Engine adapter contract and the built-in adapters.

#[cfg(feature = "native")]
pub mod ort;

#[cfg(feature = "tract")]
pub mod tract;

use std::fmt;

use crate::{InferenceError, NamedTensor, Result, Tensor};

/// A loaded model bound to one inference engine.
///
/// Adapters are driven by one caller at a time, hence `&mut self` on
/// [`run`](Self::run) and no `Sync` bound. Run several adapters to get
/// parallel inference.
pub trait EngineAdapter: Send {
    /// Run inference with the given named inputs.
    ///
    /// # Arguments
    /// * `inputs` - Named input tensors
    ///
    /// # Returns
    /// Named output tensors, in the order of [`output_names`](Self::output_names)
    fn run(&mut self, inputs: &[(&str, Tensor)]) -> Result<Vec<NamedTensor>>;

    /// Input names the model expects.
    fn input_names(&self) -> &[String];

    /// Output names the adapter returns.
    fn output_names(&self) -> &[String];

    /// The release capability, for adapters that hold engine resources
    /// needing explicit teardown.
    fn as_releasable(&mut self) -> Option<&mut dyn Releasable> {
        None
    }
}

impl fmt::Debug for dyn EngineAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineAdapter")
            .field("inputs", &self.input_names())
            .field("outputs", &self.output_names())
            .finish()
    }
}

/// Optional capability: explicit teardown of engine resources.
pub trait Releasable {
    /// Free the engine resources held by the adapter.
    ///
    /// The adapter must not be run afterwards.
    fn release(&mut self);
}

/// Reorder engine outputs to match `wanted`.
///
/// An empty `wanted` keeps everything the engine produced.
pub fn select_outputs(produced: Vec<NamedTensor>, wanted: &[String]) -> Result<Vec<NamedTensor>> {
    if wanted.is_empty() {
        return Ok(produced);
    }

    let mut produced: Vec<Option<NamedTensor>> = produced.into_iter().map(Some).collect();
    wanted
        .iter()
        .map(|name| {
            produced
                .iter_mut()
                .find(|slot| matches!(slot, Some((n, _)) if n == name))
                .and_then(Option::take)
                .ok_or_else(|| InferenceError::UnknownOutput(name.clone()))
        })
        .collect()
}

/// Output names an adapter binds to.
///
/// Requested names must all exist in the graph; `None` or an empty list
/// binds every graph output in graph order.
#[cfg_attr(not(any(feature = "native", feature = "tract")), allow(dead_code))]
pub(crate) fn bind_output_names(
    graph_outputs: Vec<String>,
    requested: Option<&[String]>,
) -> Result<Vec<String>> {
    match requested {
        Some(names) if !names.is_empty() => {
            if let Some(missing) = names.iter().find(|n| !graph_outputs.contains(*n)) {
                return Err(InferenceError::UnknownOutput(missing.clone()));
            }
            Ok(names.to_vec())
        }
        _ => Ok(graph_outputs),
    }
}

/// Look up a named input, falling back to position for unnamed engines.
#[cfg_attr(not(feature = "tract"), allow(dead_code))]
pub(crate) fn find_input<'a>(
    inputs: &'a [(&str, Tensor)],
    name: &str,
    position: usize,
) -> Result<&'a Tensor> {
    inputs
        .iter()
        .find(|(n, _)| *n == name)
        .or_else(|| inputs.get(position))
        .map(|(_, t)| t)
        .ok_or_else(|| InferenceError::InvalidInput(format!("missing input '{}'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scalar(v: f32) -> Tensor {
        Tensor::from_f32(vec![v], &[1]).unwrap()
    }

    #[test]
    fn test_select_outputs_reorders() {
        let produced = vec![
            ("dets".to_string(), scalar(1.0)),
            ("labels".to_string(), scalar(2.0)),
        ];
        let wanted = vec!["labels".to_string(), "dets".to_string()];
        let selected = select_outputs(produced, &wanted).unwrap();
        let names: Vec<&str> = selected.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["labels", "dets"]);
    }

    #[test]
    fn test_select_outputs_empty_keeps_all() {
        let produced = vec![("a".to_string(), scalar(1.0))];
        let selected = select_outputs(produced.clone(), &[]).unwrap();
        assert_eq!(selected, produced);
    }

    #[test]
    fn test_select_outputs_unknown_name() {
        let produced = vec![("a".to_string(), scalar(1.0))];
        let err = select_outputs(produced, &["b".to_string()]).unwrap_err();
        assert!(matches!(err, InferenceError::UnknownOutput(name) if name == "b"));
    }

    #[test]
    fn test_bind_output_names() {
        let graph = vec!["dets".to_string(), "labels".to_string()];
        assert_eq!(bind_output_names(graph.clone(), None).unwrap(), graph);
        assert_eq!(bind_output_names(graph.clone(), Some(&[][..])).unwrap(), graph);

        let wanted = vec!["labels".to_string()];
        assert_eq!(bind_output_names(graph.clone(), Some(wanted.as_slice())).unwrap(), wanted);

        // A default single name does not silently match a multi-output graph.
        let default = vec!["output".to_string()];
        let err = bind_output_names(graph, Some(default.as_slice())).unwrap_err();
        assert!(matches!(err, InferenceError::UnknownOutput(name) if name == "output"));
    }

    struct NamedOnly {
        inputs: Vec<String>,
        outputs: Vec<String>,
    }

    impl EngineAdapter for NamedOnly {
        fn run(&mut self, _inputs: &[(&str, Tensor)]) -> Result<Vec<NamedTensor>> {
            Ok(vec![])
        }

        fn input_names(&self) -> &[String] {
            &self.inputs
        }

        fn output_names(&self) -> &[String] {
            &self.outputs
        }
    }

    #[test]
    fn test_boxed_adapter_debug_lists_names() {
        let built: Result<Box<dyn EngineAdapter>> = Ok(Box::new(NamedOnly {
            inputs: vec!["img".to_string()],
            outputs: vec!["probs".to_string()],
        }));
        let adapter = built.unwrap();
        assert_eq!(
            format!("{:?}", adapter),
            "EngineAdapter { inputs: [\"img\"], outputs: [\"probs\"] }"
        );

        let failed: Result<Box<dyn EngineAdapter>> =
            Err(InferenceError::ModelLoad("bad".to_string()));
        assert!(matches!(failed.unwrap_err(), InferenceError::ModelLoad(_)));
    }

    #[test]
    fn test_find_input_by_name_then_position() {
        let inputs = [("x", scalar(1.0)), ("y", scalar(2.0))];
        assert_eq!(find_input(&inputs, "y", 0).unwrap(), &scalar(2.0));
        assert_eq!(find_input(&inputs, "missing", 1).unwrap(), &scalar(2.0));
        assert!(find_input(&inputs, "missing", 5).is_err());
    }
}
