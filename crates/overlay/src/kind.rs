use std::fmt;

use serde::{Deserialize, Serialize};

/// Overlay families. Each keeps its own presentation defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Modal,
    Drawer,
    Toast,
}

impl OverlayKind {
    pub const ALL: [OverlayKind; 3] = [OverlayKind::Modal, OverlayKind::Drawer, OverlayKind::Toast];

    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayKind::Modal => "modal",
            OverlayKind::Drawer => "drawer",
            OverlayKind::Toast => "toast",
        }
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by `show`, usable for a later `hide` or `complete`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub(crate) u64);

impl OverlayId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
