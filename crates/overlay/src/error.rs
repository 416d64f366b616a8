//! Error types for overlay orchestration

use thiserror::Error;

use crate::kind::OverlayId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    /// The render target could not display an overlay's content. The
    /// overlay has already been dropped from the stack.
    #[error("Overlay {id} failed to render: {reason}")]
    ContentRenderFailure { id: OverlayId, reason: String },

    #[error("Render target already attached")]
    AlreadyAttached,
}

pub type OverlayResult<T> = Result<T, OverlayError>;
