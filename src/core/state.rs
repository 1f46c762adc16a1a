//! # Application State
//!
//! Core navigation state. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── config: ResolvedConfig            // resolved settings
//! ├── viewport: Viewport                // logical px, drives the class
//! ├── disclosure: DisclosureController  // panel open/preview + chrome auto-hide
//! ├── overflow: OverflowLayout          // mobile sheet partition + snap points
//! ├── tree: NavigationTree              // expansion, focus, traversal
//! ├── store: NavStore                   // shared active item (same handle as tree)
//! ├── owner_open: bool                  // the host's copy in controlled mode
//! ├── status_message: String            // status bar text
//! └── location: Option<String>          // last href navigated to
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::core::config::ResolvedConfig;
use crate::core::disclosure::{DisclosureController, Outcome, Trigger};
use crate::core::nav::{Section, flatten_compact};
use crate::core::overflow::OverflowLayout;
use crate::core::store::NavStore;
use crate::core::tree::NavigationTree;
use crate::core::viewport::{Viewport, ViewportClass};

pub struct App {
    pub config: ResolvedConfig,
    pub viewport: Viewport,
    pub disclosure: DisclosureController,
    pub overflow: OverflowLayout,
    pub tree: NavigationTree,
    pub store: NavStore,
    /// Host-side source of truth when the panel is controlled.
    pub owner_open: bool,
    pub status_message: String,
    pub location: Option<String>,
}

impl App {
    /// Mount the navigation chrome for `sections` at the given viewport.
    pub fn new(config: ResolvedConfig, sections: Vec<Section>, viewport: Viewport) -> Self {
        let store = NavStore::new();
        let compact = flatten_compact(&sections);
        let overflow = OverflowLayout::new(config.overflow, compact, viewport.height as f32);
        let tree = NavigationTree::new(sections, store.clone());

        let mut disclosure = DisclosureController::new(config.disclosure);
        // The first resize sample is the mount: it applies the mobile
        // auto-collapse if the host starts narrow. As owner, the host accepts.
        if let Outcome::Requested { open } = disclosure.dispatch(Trigger::Resize(viewport.width)) {
            disclosure.set_external(open);
        }
        let owner_open = disclosure.is_open();
        let status_message = format!("Press {} to toggle navigation", config.disclosure.shortcut);

        Self {
            config,
            viewport,
            disclosure,
            overflow,
            tree,
            store,
            owner_open,
            status_message,
            location: None,
        }
    }

    pub fn viewport_class(&self) -> ViewportClass {
        self.viewport.class()
    }

    pub fn sections(&self) -> &[Section] {
        self.tree.sections()
    }
}
