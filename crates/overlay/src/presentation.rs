//! Per-kind presentation defaults (mask, list and item wrapper styling)
//!
//! Each shown overlay keeps the presentation that was current when it was
//! shown; later updates only affect overlays shown afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// CSS-like property map, ordered for stable output
pub type StyleMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presentation {
    pub mask_style: StyleMap,
    pub mask_class_name: Option<String>,
    /// Clicking the mask hides the topmost overlay
    pub mask_closable: bool,
    pub list_style: StyleMap,
    pub list_class_name: Option<String>,
    pub item_wrapper_style: StyleMap,
    pub item_wrapper_class_name: Option<String>,
    /// Animate the item wrapper's size as overlays enter and leave
    pub animated_size: bool,
}

/// One presentation field change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationUpdate {
    MaskStyle(StyleMap),
    MaskClassName(Option<String>),
    MaskClosable(bool),
    ListStyle(StyleMap),
    ListClassName(Option<String>),
    ItemWrapperStyle(StyleMap),
    ItemWrapperClassName(Option<String>),
    AnimatedSize(bool),
}

impl Presentation {
    pub fn apply(&mut self, update: PresentationUpdate) {
        match update {
            PresentationUpdate::MaskStyle(style) => self.mask_style = style,
            PresentationUpdate::MaskClassName(name) => self.mask_class_name = name,
            PresentationUpdate::MaskClosable(closable) => self.mask_closable = closable,
            PresentationUpdate::ListStyle(style) => self.list_style = style,
            PresentationUpdate::ListClassName(name) => self.list_class_name = name,
            PresentationUpdate::ItemWrapperStyle(style) => self.item_wrapper_style = style,
            PresentationUpdate::ItemWrapperClassName(name) => self.item_wrapper_class_name = name,
            PresentationUpdate::AnimatedSize(animated) => self.animated_size = animated,
        }
    }
}
