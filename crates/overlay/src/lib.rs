//! # vswap overlay
//!
//! A single registry deciding which modal, drawer and toast overlays are
//! visible. UI handlers and background service code both reach it through a
//! cheap cloneable [`Overlays`] handle, without holding a reference to any
//! rendered component.
//!
//! Calls made before a [`RenderTarget`] is attached are queued and replayed
//! in order once it is. After that, calls apply synchronously.

pub mod config;
pub mod error;
pub mod kind;
pub mod options;
pub mod orchestrator;
pub mod presentation;
pub mod target;

pub use config::OverlayConfig;
pub use error::{OverlayError, OverlayResult};
pub use kind::{OverlayId, OverlayKind};
pub use options::{
    Callback, DrawerHeight, DrawerOptions, Hooks, ModalOptions, OverlayOptions, OverlayRequest,
    ToastLevel, ToastOptions,
};
pub use orchestrator::{OverlaySummary, Overlays};
pub use presentation::{Presentation, PresentationUpdate, StyleMap};
pub use target::{OverlayView, RenderError, RenderTarget};
