//! In-memory provider standing in for vendor SDKs in tests.

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use infergate_inference::{EngineAdapter, InferenceError, NamedTensor, Releasable, Tensor};

use crate::engine::EngineKind;
use crate::factory::AdapterProvider;
use crate::names::DEFAULT_OUTPUT_NAME;
use crate::params::AdapterParams;

/// Call counters shared between a provider and the adapters it hands out.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    runs: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl Counters {
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

/// Records every load request and returns echoing adapters.
pub struct RecordingProvider {
    supported: Vec<EngineKind>,
    releasable: bool,
    fail_load: bool,
    fail_run: bool,
    outputs: Option<Vec<NamedTensor>>,
    loads: RefCell<Vec<AdapterParams>>,
    counters: Counters,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self {
            supported: EngineKind::ALL.to_vec(),
            releasable: true,
            fail_load: false,
            fail_run: false,
            outputs: None,
            loads: RefCell::new(Vec::new()),
            counters: Counters::default(),
        }
    }

    pub fn only(kinds: &[EngineKind]) -> Self {
        Self {
            supported: kinds.to_vec(),
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_load: true,
            ..Self::new()
        }
    }

    /// Adapters without the release capability.
    pub fn without_release(mut self) -> Self {
        self.releasable = false;
        self
    }

    /// Adapters whose `run` always fails.
    pub fn failing_runs(mut self) -> Self {
        self.fail_run = true;
        self
    }

    /// Adapters returning fixed outputs instead of echoing the input.
    pub fn with_outputs(mut self, outputs: Vec<NamedTensor>) -> Self {
        self.outputs = Some(outputs);
        self
    }

    pub fn loads(&self) -> Vec<AdapterParams> {
        self.loads.borrow().clone()
    }

    pub fn counters(&self) -> Counters {
        self.counters.clone()
    }
}

impl AdapterProvider for RecordingProvider {
    fn supports(&self, kind: EngineKind) -> bool {
        self.supported.contains(&kind)
    }

    fn load(&self, params: AdapterParams) -> infergate_inference::Result<Box<dyn EngineAdapter>> {
        self.loads.borrow_mut().push(params.clone());

        if self.fail_load {
            return Err(InferenceError::ModelLoad(format!(
                "corrupt model file {}",
                params.primary_artifact().display()
            )));
        }

        let output_names = params
            .output_names()
            .map(<[String]>::to_vec)
            .unwrap_or_else(|| vec![DEFAULT_OUTPUT_NAME.to_string()]);

        Ok(Box::new(MockAdapter {
            input_names: Vec::new(),
            output_names,
            releasable: self.releasable,
            fail_run: self.fail_run,
            outputs: self.outputs.clone(),
            released: false,
            counters: self.counters.clone(),
        }))
    }
}

struct MockAdapter {
    input_names: Vec<String>,
    output_names: Vec<String>,
    releasable: bool,
    fail_run: bool,
    outputs: Option<Vec<NamedTensor>>,
    released: bool,
    counters: Counters,
}

impl EngineAdapter for MockAdapter {
    fn run(&mut self, inputs: &[(&str, Tensor)]) -> infergate_inference::Result<Vec<NamedTensor>> {
        assert!(!self.released, "adapter used after release");
        self.counters.runs.fetch_add(1, Ordering::SeqCst);

        if self.fail_run {
            return Err(InferenceError::InferenceFailed("device lost".to_string()));
        }
        if let Some(outputs) = &self.outputs {
            return Ok(outputs.clone());
        }

        let (_, first) = inputs
            .first()
            .ok_or_else(|| InferenceError::InvalidInput("no inputs".to_string()))?;
        Ok(self
            .output_names
            .iter()
            .map(|name| (name.clone(), first.clone()))
            .collect())
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }

    fn as_releasable(&mut self) -> Option<&mut dyn Releasable> {
        if self.releasable { Some(self) } else { None }
    }
}

impl Releasable for MockAdapter {
    fn release(&mut self) {
        self.released = true;
        self.counters.releases.fetch_add(1, Ordering::SeqCst);
    }
}
