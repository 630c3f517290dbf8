//! Model families built on top of the facade.

use std::io::Write;

use crate::error::Result;
use crate::facade::InferenceFacade;

/// A downstream model family (classifier, detector, ...).
///
/// Each family owns one [`InferenceFacade`] and defines its own tensor
/// layout and post-processing. The facade itself knows nothing about them.
pub trait BackendModel {
    /// Pre-processed model input.
    type Input;

    /// Post-processed result.
    type Output;

    fn facade(&self) -> &InferenceFacade;

    fn facade_mut(&mut self) -> &mut InferenceFacade;

    /// Run the model once on `input`.
    fn forward(&mut self, input: Self::Input) -> Result<Self::Output>;

    /// Render `output` in human readable form.
    fn show_result(&self, output: &Self::Output, out: &mut dyn Write) -> Result<()>;

    /// Release the underlying engine. Idempotent.
    fn destroy(&mut self) {
        self.facade_mut().destroy();
    }
}
