//! Adapters linked into this build.

#[cfg(any(feature = "native", feature = "tract"))]
use tracing::debug;

use infergate_inference::{EngineAdapter, InferenceError};

use crate::engine::EngineKind;
use crate::factory::AdapterProvider;
use crate::params::AdapterParams;

/// Provider for the in-tree ONNX adapters.
///
/// With the `native` feature ONNX models run on ort; with only `tract`
/// they run on tract. Every other engine is reported as unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeProvider;

impl NativeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl AdapterProvider for NativeProvider {
    fn supports(&self, kind: EngineKind) -> bool {
        matches!(kind, EngineKind::OnnxRuntime) && cfg!(any(feature = "native", feature = "tract"))
    }

    fn load(&self, params: AdapterParams) -> infergate_inference::Result<Box<dyn EngineAdapter>> {
        match params {
            #[cfg(feature = "native")]
            AdapterParams::OnnxRuntime {
                onnx_file,
                device,
                output_names,
            } => {
                debug!("Using ort for {}", onnx_file.display());
                let adapter = infergate_inference::OrtAdapter::from_file(
                    &onnx_file,
                    &device,
                    output_names.as_deref(),
                )?;
                Ok(Box::new(adapter))
            }
            #[cfg(all(feature = "tract", not(feature = "native")))]
            AdapterParams::OnnxRuntime {
                onnx_file,
                output_names,
                ..
            } => {
                debug!("Using tract for {}", onnx_file.display());
                let adapter =
                    infergate_inference::TractAdapter::from_file(&onnx_file, output_names.as_deref())?;
                Ok(Box::new(adapter))
            }
            other => Err(InferenceError::Unsupported(other.kind().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ArtifactSet;
    use crate::error::BridgeError;
    use crate::factory::{BackendFactory, BuildRequest};

    #[test]
    fn test_vendor_engines_are_not_linked() {
        let factory = BackendFactory::new(NativeProvider::new());
        for kind in [EngineKind::TensorRt, EngineKind::Ncnn, EngineKind::Snpe] {
            assert!(!factory.is_available(kind));
            let (required, _) = kind.artifact_arity();
            let artifacts: ArtifactSet = (0..required).map(|i| format!("m{}", i)).collect();
            let err = factory.build(BuildRequest::new(kind, artifacts)).unwrap_err();
            assert!(matches!(err, BridgeError::UnsupportedBackend(_)));
        }
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_missing_onnx_file_is_construction_failure() {
        let factory = BackendFactory::new(NativeProvider::new());
        let request = BuildRequest::new(
            EngineKind::OnnxRuntime,
            ArtifactSet::new(["/nonexistent/model.onnx"]),
        );
        let err = factory.build(request).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::AdapterConstruction { kind: EngineKind::OnnxRuntime, .. }
        ));
    }
}
