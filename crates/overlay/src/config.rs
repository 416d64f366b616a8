use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::kind::OverlayKind;
use crate::presentation::Presentation;

/// Default toast lifetime in milliseconds
pub const DEFAULT_TOAST_DURATION_MS: u64 = 6666;

/// Overlay defaults, embeddable in a larger TOML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Lifetime of toasts that do not set their own duration; 0 keeps them
    /// until hidden
    pub toast_duration_ms: u64,
    pub modal: Presentation,
    pub drawer: Presentation,
    pub toast: Presentation,
}

impl OverlayConfig {
    pub fn presentation(&self, kind: OverlayKind) -> &Presentation {
        match kind {
            OverlayKind::Modal => &self.modal,
            OverlayKind::Drawer => &self.drawer,
            OverlayKind::Toast => &self.toast,
        }
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
            modal: Presentation {
                mask_closable: true,
                list_class_name: Some("modal-wrapper".to_string()),
                ..Presentation::default()
            },
            drawer: Presentation {
                mask_closable: true,
                list_class_name: Some("drawer-wrapper".to_string()),
                ..Presentation::default()
            },
            toast: Presentation {
                list_class_name: Some("toast-wrapper".to_string()),
                item_wrapper_class_name: Some("toast-item-wrapper".to_string()),
                animated_size: true,
                ..Presentation::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OverlayConfig::default();
        assert_eq!(config.toast_duration(), Duration::from_millis(6666));
        assert!(config.presentation(OverlayKind::Toast).animated_size);
        assert!(!config.presentation(OverlayKind::Toast).mask_closable);
        assert!(config.presentation(OverlayKind::Modal).mask_closable);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: OverlayConfig = toml::from_str(
            r#"
            toast_duration_ms = 3000

            [modal]
            mask_closable = false
            "#,
        )
        .unwrap();

        assert_eq!(config.toast_duration_ms, 3000);
        assert!(!config.modal.mask_closable);
        // Sections present in the file replace the whole section
        assert_eq!(config.modal.list_class_name, None);
        assert_eq!(config.toast, OverlayConfig::default().toast);
    }
}
