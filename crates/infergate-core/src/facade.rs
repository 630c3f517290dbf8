//! Inference facade: one adapter behind a fixed invoke/destroy contract.

use tracing::{debug, info};

use infergate_inference::{EngineAdapter, NamedTensor, Tensor};

use crate::engine::EngineKind;
use crate::error::{BridgeError, Result};
use crate::factory::{AdapterProvider, BackendFactory, BuildRequest};
use crate::names::{ResolvedNames, TensorNames};

/// Lifecycle of a facade.
///
/// There is no unbuilt state: construction either binds an adapter or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacadeState {
    Bound,
    Destroyed,
}

/// Uniform front for a model running on any engine.
///
/// Owns its adapter exclusively. The adapter is released exactly once,
/// either by [`destroy`](Self::destroy) or when the facade is dropped.
pub struct InferenceFacade {
    kind: EngineKind,
    names: ResolvedNames,
    adapter: Option<Box<dyn EngineAdapter>>,
}

impl InferenceFacade {
    /// Resolve tensor names and build the adapter.
    ///
    /// Names come from the request's deploy config (`ir_config`) only; any
    /// names already set on the request are replaced by the resolved ones.
    pub fn new<P: AdapterProvider>(
        factory: &BackendFactory<P>,
        request: BuildRequest<'_>,
    ) -> Result<Self> {
        let declared = match request.deploy_config {
            Some(config) => TensorNames::from_ir_config(config.ir_config())?,
            None => TensorNames::default(),
        };
        let names = declared.resolve();
        let kind = request.kind();

        let request = request
            .with_input_names(names.input_names.clone())
            .with_output_names(names.output_names.clone());
        let adapter = factory.build(request)?;

        info!("Bound {} adapter, input '{}'", kind, names.input_name);

        Ok(Self {
            kind,
            names,
            adapter: Some(adapter),
        })
    }

    /// Build a new adapter into a destroyed facade.
    pub fn rebuild<P: AdapterProvider>(
        &mut self,
        factory: &BackendFactory<P>,
        request: BuildRequest<'_>,
    ) -> Result<()> {
        if self.adapter.is_some() {
            return Err(BridgeError::AlreadyBound);
        }
        *self = Self::new(factory, request)?;
        Ok(())
    }

    /// Forward named inputs to the adapter, once.
    pub fn invoke(&mut self, inputs: &[(&str, Tensor)]) -> Result<Vec<NamedTensor>> {
        let adapter = self.adapter.as_mut().ok_or(BridgeError::AdapterDestroyed)?;
        debug!("Invoking {} adapter with {} input(s)", self.kind, inputs.len());
        adapter.run(inputs).map_err(BridgeError::Invocation)
    }

    /// Invoke with a single tensor bound to the primary input name.
    pub fn invoke_input(&mut self, tensor: Tensor) -> Result<Vec<NamedTensor>> {
        let name = self.names.input_name.clone();
        self.invoke(&[(name.as_str(), tensor)])
    }

    /// Tear down the adapter.
    ///
    /// Runs the adapter's release capability if it has one. Safe to call
    /// any number of times.
    pub fn destroy(&mut self) {
        let Some(mut adapter) = self.adapter.take() else {
            return;
        };

        match adapter.as_releasable() {
            Some(releasable) => {
                releasable.release();
                info!("Destroyed {} adapter", self.kind);
            }
            None => debug!("{} adapter has nothing to release", self.kind),
        }
    }

    pub fn state(&self) -> FacadeState {
        if self.adapter.is_some() {
            FacadeState::Bound
        } else {
            FacadeState::Destroyed
        }
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    /// Primary input name.
    pub fn input_name(&self) -> &str {
        &self.names.input_name
    }

    pub fn input_names(&self) -> &[String] {
        &self.names.input_names
    }

    pub fn output_names(&self) -> &[String] {
        &self.names.output_names
    }
}

impl Drop for InferenceFacade {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for InferenceFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceFacade")
            .field("kind", &self.kind)
            .field("names", &self.names)
            .field("state", &self.state())
            .finish()
    }
}
