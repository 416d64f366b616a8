//! Per-kind overlay options
//!
//! Each overlay kind carries its own options type, so a drawer height can
//! never end up on a toast.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::kind::OverlayKind;

/// Callback fired when an overlay leaves the stack
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Lifecycle callbacks shared by every overlay kind
#[derive(Clone, Default)]
pub struct Hooks {
    /// Runs when the overlay is hidden, expires, or is dismissed by a mask
    /// click. Not run on in-place replacement or on `complete`.
    pub on_close: Option<Callback>,
    /// Runs when the overlay is completed
    pub on_success: Option<Callback>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_close", &self.on_close.is_some())
            .field("on_success", &self.on_success.is_some())
            .finish()
    }
}

macro_rules! hook_builders {
    ($ty:ty) => {
        impl $ty {
            pub fn on_close<F>(mut self, f: F) -> Self
            where
                F: Fn() + Send + Sync + 'static,
            {
                self.hooks.on_close = Some(Arc::new(f));
                self
            }

            pub fn on_success<F>(mut self, f: F) -> Self
            where
                F: Fn() + Send + Sync + 'static,
            {
                self.hooks.on_success = Some(Arc::new(f));
                self
            }

            pub fn title(mut self, title: impl Into<String>) -> Self {
                self.title = Some(title.into());
                self
            }

            pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
                self.class_name = Some(class_name.into());
                self
            }
        }
    };
}

#[derive(Debug, Clone, Default)]
pub struct ModalOptions {
    pub title: Option<String>,
    pub class_name: Option<String>,
    /// Replace an active modal with the same tag instead of stacking
    pub unique: bool,
    pub tag: Option<String>,
    pub hooks: Hooks,
}

impl ModalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the modal unique under `tag`
    pub fn unique(mut self, tag: impl Into<String>) -> Self {
        self.unique = true;
        self.tag = Some(tag.into());
        self
    }
}

hook_builders!(ModalOptions);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawerHeight {
    Full,
    #[default]
    Half,
    Pixels(u32),
}

/// Drawer options. At most one drawer is shown, so there is no unique flag.
#[derive(Debug, Clone, Default)]
pub struct DrawerOptions {
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub class_name: Option<String>,
    pub height: DrawerHeight,
    pub hooks: Hooks,
}

impl DrawerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sub_title(mut self, sub_title: impl Into<String>) -> Self {
        self.sub_title = Some(sub_title.into());
        self
    }

    pub fn height(mut self, height: DrawerHeight) -> Self {
        self.height = height;
        self
    }
}

hook_builders!(DrawerOptions);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    #[default]
    Success,
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct ToastOptions {
    pub level: ToastLevel,
    /// `None` uses the configured default, `Duration::ZERO` keeps the
    /// toast until it is hidden
    pub duration: Option<Duration>,
    pub show_close: bool,
    pub unique: bool,
    pub tag: Option<String>,
    pub hooks: Hooks,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self {
            level: ToastLevel::default(),
            duration: None,
            show_close: true,
            unique: false,
            tag: None,
            hooks: Hooks::default(),
        }
    }
}

impl ToastOptions {
    pub fn new(level: ToastLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn sticky(self) -> Self {
        self.duration(Duration::ZERO)
    }

    pub fn show_close(mut self, show_close: bool) -> Self {
        self.show_close = show_close;
        self
    }

    pub fn unique(mut self, tag: impl Into<String>) -> Self {
        self.unique = true;
        self.tag = Some(tag.into());
        self
    }

    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.on_close = Some(Arc::new(f));
        self
    }
}

#[derive(Debug, Clone)]
pub enum OverlayOptions {
    Modal(ModalOptions),
    Drawer(DrawerOptions),
    Toast(ToastOptions),
}

impl OverlayOptions {
    pub fn kind(&self) -> OverlayKind {
        match self {
            OverlayOptions::Modal(_) => OverlayKind::Modal,
            OverlayOptions::Drawer(_) => OverlayKind::Drawer,
            OverlayOptions::Toast(_) => OverlayKind::Toast,
        }
    }

    /// Whether this request replaces an active overlay of its kind
    pub fn unique(&self) -> bool {
        match self {
            OverlayOptions::Modal(o) => o.unique,
            OverlayOptions::Drawer(_) => true,
            OverlayOptions::Toast(o) => o.unique,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            OverlayOptions::Modal(o) => o.tag.as_deref(),
            OverlayOptions::Drawer(_) => None,
            OverlayOptions::Toast(o) => o.tag.as_deref(),
        }
    }

    pub fn hooks(&self) -> &Hooks {
        match self {
            OverlayOptions::Modal(o) => &o.hooks,
            OverlayOptions::Drawer(o) => &o.hooks,
            OverlayOptions::Toast(o) => &o.hooks,
        }
    }
}

/// Content plus options, as handed to `Overlays::show`
#[derive(Debug)]
pub struct OverlayRequest<C> {
    pub content: C,
    pub options: OverlayOptions,
}

impl<C> OverlayRequest<C> {
    pub fn modal(content: C, options: ModalOptions) -> Self {
        Self {
            content,
            options: OverlayOptions::Modal(options),
        }
    }

    pub fn drawer(content: C, options: DrawerOptions) -> Self {
        Self {
            content,
            options: OverlayOptions::Drawer(options),
        }
    }

    pub fn toast(content: C, options: ToastOptions) -> Self {
        Self {
            content,
            options: OverlayOptions::Toast(options),
        }
    }

    pub fn kind(&self) -> OverlayKind {
        self.options.kind()
    }
}
