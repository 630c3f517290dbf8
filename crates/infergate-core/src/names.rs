//! Input and output tensor names.

use std::collections::HashSet;

use tracing::debug;

use crate::config::IrConfig;
use crate::error::{BridgeError, Result};

/// Input name used when the deployment declares none.
pub const DEFAULT_INPUT_NAME: &str = "input";

/// Output name used when the deployment declares none.
///
/// Only correct for single-output models; multi-output models must declare
/// their names in `ir_config.output_names`.
pub const DEFAULT_OUTPUT_NAME: &str = "output";

/// Ordered input and output names, unique within each sequence.
///
/// Either sequence may be empty, meaning "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TensorNames {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl TensorNames {
    pub fn new(inputs: Vec<String>, outputs: Vec<String>) -> Result<Self> {
        ensure_unique(&inputs)?;
        ensure_unique(&outputs)?;
        Ok(Self { inputs, outputs })
    }

    pub fn from_ir_config(ir: &IrConfig) -> Result<Self> {
        Self::new(ir.input_names.clone(), ir.output_names.clone())
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Fill unknown sequences with the single-name defaults.
    pub fn resolve(&self) -> ResolvedNames {
        let input_names = if self.inputs.is_empty() {
            vec![DEFAULT_INPUT_NAME.to_string()]
        } else {
            self.inputs.clone()
        };

        let output_names = if self.outputs.is_empty() {
            vec![DEFAULT_OUTPUT_NAME.to_string()]
        } else {
            self.outputs.clone()
        };

        let resolved = ResolvedNames {
            input_name: input_names[0].clone(),
            input_names,
            output_names,
        };
        debug!(
            "Resolved tensor names: input={} outputs={:?}",
            resolved.input_name, resolved.output_names
        );
        resolved
    }
}

/// Names held by a facade after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    /// Primary input, the first declared name.
    pub input_name: String,

    /// All declared inputs, never empty.
    pub input_names: Vec<String>,

    /// Declared outputs, never empty.
    pub output_names: Vec<String>,
}

pub(crate) fn ensure_unique(names: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(names.len());
    match names.iter().find(|name| !seen.insert(name.as_str())) {
        Some(dup) => Err(BridgeError::DuplicateTensorName(dup.clone())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults_when_unknown() {
        let resolved = TensorNames::default().resolve();
        assert_eq!(resolved.input_name, "input");
        assert_eq!(resolved.input_names, names(&["input"]));
        assert_eq!(resolved.output_names, names(&["output"]));
    }

    #[test]
    fn test_first_input_is_primary() {
        let resolved = TensorNames::new(names(&["x", "y"]), vec![]).unwrap().resolve();
        assert_eq!(resolved.input_name, "x");
        assert_eq!(resolved.input_names, names(&["x", "y"]));
        assert_eq!(resolved.output_names, names(&["output"]));
    }

    #[test]
    fn test_declared_outputs_kept_in_order() {
        let resolved = TensorNames::new(vec![], names(&["dets", "labels"]))
            .unwrap()
            .resolve();
        assert_eq!(resolved.input_name, "input");
        assert_eq!(resolved.output_names, names(&["dets", "labels"]));
    }

    #[test]
    fn test_duplicate_input_rejected() {
        let err = TensorNames::new(names(&["x", "x"]), vec![]).unwrap_err();
        assert!(matches!(err, BridgeError::DuplicateTensorName(name) if name == "x"));
    }

    #[test]
    fn test_duplicate_output_rejected() {
        let err = TensorNames::new(vec![], names(&["a", "b", "a"])).unwrap_err();
        assert!(matches!(err, BridgeError::DuplicateTensorName(name) if name == "a"));
    }
}
