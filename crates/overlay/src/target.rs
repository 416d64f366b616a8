//! The seam between the orchestrator and whatever actually draws overlays

use thiserror::Error;

use crate::kind::{OverlayId, OverlayKind};
use crate::options::OverlayOptions;
use crate::presentation::Presentation;

/// Failure reported by a render target
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RenderError(pub String);

impl RenderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Everything a target needs to draw one overlay
#[derive(Debug)]
pub struct OverlayView<'a, C> {
    pub id: OverlayId,
    pub content: C,
    pub options: &'a OverlayOptions,
    pub presentation: &'a Presentation,
}

impl<C> OverlayView<'_, C> {
    pub fn kind(&self) -> OverlayKind {
        self.options.kind()
    }
}

/// Host-side renderer. The orchestrator never interprets content.
///
/// Methods are called with the orchestrator's state locked; implementations
/// must not call back into the orchestrator from inside them.
pub trait RenderTarget<C>: Send {
    /// Draw a new overlay on top of the stack
    fn mount(&mut self, view: OverlayView<'_, C>) -> Result<(), RenderError>;

    /// Swap the overlay `previous` for `view` at the same stack position
    fn replace(&mut self, previous: OverlayId, view: OverlayView<'_, C>) -> Result<(), RenderError>;

    fn unmount(&mut self, id: OverlayId);
}
