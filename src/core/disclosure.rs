//! # Disclosure Controller
//!
//! Decides how much navigational chrome is visible.
//!
//! ```text
//!              toggle / shortcut
//!   ┌───────────┐ ───────────────▶ ┌──────────┐
//!   │ collapsed │                  │ expanded │
//!   └───────────┘ ◀─────────────── └──────────┘
//!     │      ▲     toggle / shortcut / resize→mobile
//!     │      │
//!  pointer  pointer leave, resize→mobile
//!  enter     │
//!     ▼      │
//!   ┌──────────────┐
//!   │ intermediate │ ── toggle ──▶ expanded
//!   └──────────────┘
//! ```
//!
//! The open flag has exactly one owner, picked by [`Ownership`]. In
//! uncontrolled mode the controller mutates its local copy; in controlled
//! mode it only reports [`Outcome::Requested`] and waits for the owner to
//! call [`DisclosureController::set_external`]. The hover preview is always
//! local. [`effective_state`] folds the three inputs into one state.
//!
//! Separately, [`ChromeAutoHide`] tracks whether the top chrome is visible
//! based on scroll samples.

use log::{debug, trace, warn};
use serde::Deserialize;

use crate::core::viewport::ViewportClass;

pub const DEFAULT_SHORTCUT: char = '/';
pub const DEFAULT_AUTO_HIDE_THRESHOLD: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisclosureState {
    Collapsed,
    Intermediate,
    #[default]
    Expanded,
}

impl DisclosureState {
    pub fn label(self) -> &'static str {
        match self {
            DisclosureState::Collapsed => "collapsed",
            DisclosureState::Intermediate => "intermediate",
            DisclosureState::Expanded => "expanded",
        }
    }
}

/// Who owns the open flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    /// An external owner holds the source of truth.
    Controlled,
    #[default]
    Uncontrolled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoHideConfig {
    pub enabled: bool,
    /// Cumulative downward scroll (logical px) before the chrome hides.
    pub threshold: u32,
}

impl Default for AutoHideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_AUTO_HIDE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisclosureConfig {
    pub ownership: Ownership,
    /// Starting state. `Intermediate` is treated as collapsed at mount.
    pub initial: DisclosureState,
    pub shortcut: char,
    pub auto_hide: AutoHideConfig,
}

impl Default for DisclosureConfig {
    fn default() -> Self {
        Self {
            ownership: Ownership::Uncontrolled,
            initial: DisclosureState::Expanded,
            shortcut: DEFAULT_SHORTCUT,
            auto_hide: AutoHideConfig::default(),
        }
    }
}

/// Input events understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Toggle,
    PointerEnter,
    PointerLeave,
    /// New viewport width in logical px.
    Resize(u32),
    KeyShortcut { key: char, in_text_entry: bool },
}

impl Trigger {
    /// Higher wins when triggers arrive together.
    pub fn precedence(&self) -> u8 {
        match self {
            Trigger::Resize(_) => 2,
            Trigger::Toggle | Trigger::KeyShortcut { .. } => 1,
            Trigger::PointerEnter | Trigger::PointerLeave => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    /// Local state changed; the new effective state.
    Applied(DisclosureState),
    /// Controlled mode: the owner is asked to set `open`. Nothing changed
    /// locally.
    Requested { open: bool },
}

impl Outcome {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Outcome::Unchanged)
    }
}

/// Pure fold of (external override, local state, ownership) plus the local
/// hover preview.
pub fn effective_state(
    ownership: Ownership,
    external_open: Option<bool>,
    local_open: bool,
    hover: bool,
) -> DisclosureState {
    let open = match ownership {
        Ownership::Controlled => external_open.unwrap_or(false),
        Ownership::Uncontrolled => local_open,
    };
    if open {
        DisclosureState::Expanded
    } else if hover {
        DisclosureState::Intermediate
    } else {
        DisclosureState::Collapsed
    }
}

#[derive(Debug, Clone)]
pub struct DisclosureController {
    config: DisclosureConfig,
    local_open: bool,
    external_open: Option<bool>,
    hover: bool,
    /// `None` until the first resize sample arrives.
    viewport: Option<ViewportClass>,
    chrome: ChromeAutoHide,
}

impl DisclosureController {
    pub fn new(config: DisclosureConfig) -> Self {
        let initial_open = config.initial == DisclosureState::Expanded;
        let external_open = match config.ownership {
            Ownership::Controlled => Some(initial_open),
            Ownership::Uncontrolled => None,
        };
        Self {
            local_open: initial_open,
            external_open,
            hover: false,
            viewport: None,
            chrome: ChromeAutoHide::new(config.auto_hide),
            config,
        }
    }

    pub fn config(&self) -> &DisclosureConfig {
        &self.config
    }

    pub fn ownership(&self) -> Ownership {
        self.config.ownership
    }

    pub fn state(&self) -> DisclosureState {
        effective_state(
            self.config.ownership,
            self.external_open,
            self.local_open,
            self.hover,
        )
    }

    pub fn is_open(&self) -> bool {
        self.state() == DisclosureState::Expanded
    }

    pub fn viewport(&self) -> Option<ViewportClass> {
        self.viewport
    }

    fn is_mobile(&self) -> bool {
        self.viewport == Some(ViewportClass::Mobile)
    }

    /// Feed the owner's decision back in controlled mode.
    pub fn set_external(&mut self, open: bool) -> Outcome {
        if self.config.ownership == Ownership::Uncontrolled {
            warn!("set_external({open}) ignored: controller owns its state");
            return Outcome::Unchanged;
        }
        if self.external_open == Some(open) {
            return Outcome::Unchanged;
        }
        self.external_open = Some(open);
        if open {
            self.hover = false;
        }
        debug!("Disclosure owner set open={open} -> {}", self.state().label());
        Outcome::Applied(self.state())
    }

    pub fn dispatch(&mut self, trigger: Trigger) -> Outcome {
        let outcome = match trigger {
            Trigger::Toggle => self.toggle(),
            Trigger::KeyShortcut { key, in_text_entry } => {
                if key != self.config.shortcut {
                    Outcome::Unchanged
                } else if in_text_entry || self.is_mobile() {
                    trace!("Shortcut {key:?} suppressed (text entry: {in_text_entry})");
                    Outcome::Unchanged
                } else {
                    self.toggle()
                }
            }
            Trigger::PointerEnter => self.pointer_enter(),
            Trigger::PointerLeave => self.pointer_leave(),
            Trigger::Resize(width) => self.resize(width),
        };
        if !outcome.is_unchanged() {
            debug!("Disclosure {:?} -> {:?}", trigger, outcome);
        }
        outcome
    }

    /// Apply triggers that arrived together. Resize beats toggle beats
    /// hover; the first trigger that changes anything wins and the rest
    /// are dropped. A resize landing on mobile ends the batch even when
    /// nothing else changed.
    pub fn dispatch_all(&mut self, triggers: &[Trigger]) -> Outcome {
        let mut ordered = triggers.to_vec();
        ordered.sort_by_key(|t| std::cmp::Reverse(t.precedence()));
        for (i, trigger) in ordered.iter().enumerate() {
            let outcome = self.dispatch(*trigger);
            let lands_mobile = matches!(trigger, Trigger::Resize(_)) && self.is_mobile();
            if !outcome.is_unchanged() || lands_mobile {
                let dropped = &ordered[i + 1..];
                if !dropped.is_empty() {
                    trace!("Dropped {dropped:?} behind {trigger:?}");
                }
                return outcome;
            }
        }
        Outcome::Unchanged
    }

    fn owned_open(&self) -> bool {
        match self.config.ownership {
            Ownership::Controlled => self.external_open.unwrap_or(false),
            Ownership::Uncontrolled => self.local_open,
        }
    }

    fn toggle(&mut self) -> Outcome {
        let target = !self.owned_open();
        let had_hover = self.hover;
        self.hover = false;
        match self.config.ownership {
            Ownership::Uncontrolled => {
                self.local_open = target;
                Outcome::Applied(self.state())
            }
            Ownership::Controlled => {
                if had_hover {
                    trace!("Hover preview cleared while awaiting owner");
                }
                Outcome::Requested { open: target }
            }
        }
    }

    fn pointer_enter(&mut self) -> Outcome {
        if self.is_mobile() || self.owned_open() || self.hover {
            return Outcome::Unchanged;
        }
        self.hover = true;
        Outcome::Applied(DisclosureState::Intermediate)
    }

    fn pointer_leave(&mut self) -> Outcome {
        if !self.hover {
            return Outcome::Unchanged;
        }
        self.hover = false;
        Outcome::Applied(self.state())
    }

    fn resize(&mut self, width: u32) -> Outcome {
        let class = ViewportClass::from_width(width);
        let previous = self.viewport.replace(class);
        if class != ViewportClass::Mobile || previous == Some(ViewportClass::Mobile) {
            return Outcome::Unchanged;
        }

        // Hover is cleared in the same step as the collapse so nothing can
        // observe a preview under the mobile class.
        let had_hover = std::mem::take(&mut self.hover);
        match self.config.ownership {
            Ownership::Uncontrolled => {
                if self.local_open || had_hover {
                    self.local_open = false;
                    Outcome::Applied(DisclosureState::Collapsed)
                } else {
                    Outcome::Unchanged
                }
            }
            Ownership::Controlled => {
                if self.owned_open() {
                    Outcome::Requested { open: false }
                } else if had_hover {
                    Outcome::Applied(DisclosureState::Collapsed)
                } else {
                    Outcome::Unchanged
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Top chrome auto-hide
    // ------------------------------------------------------------------

    pub fn scroll(&mut self, offset: u32) -> ChromeVisibility {
        self.chrome.on_scroll(offset)
    }

    pub fn chrome_visibility(&self) -> ChromeVisibility {
        self.chrome.visibility()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromeVisibility {
    #[default]
    Visible,
    Hidden,
}

/// Hides the top chrome after enough downward scrolling and shows it again
/// on any upward movement. Re-evaluated on every sample; nothing is
/// scheduled.
#[derive(Debug, Clone)]
pub struct ChromeAutoHide {
    config: AutoHideConfig,
    last_offset: u32,
    accumulated: u32,
    visibility: ChromeVisibility,
}

impl ChromeAutoHide {
    pub fn new(config: AutoHideConfig) -> Self {
        Self {
            config,
            last_offset: 0,
            accumulated: 0,
            visibility: ChromeVisibility::Visible,
        }
    }

    pub fn visibility(&self) -> ChromeVisibility {
        self.visibility
    }

    pub fn on_scroll(&mut self, offset: u32) -> ChromeVisibility {
        let previous = std::mem::replace(&mut self.last_offset, offset);
        if !self.config.enabled {
            return ChromeVisibility::Visible;
        }
        if offset < previous {
            self.accumulated = 0;
            self.visibility = ChromeVisibility::Visible;
        } else if offset > previous {
            self.accumulated = self.accumulated.saturating_add(offset - previous);
            if self.accumulated > self.config.threshold {
                self.visibility = ChromeVisibility::Hidden;
            }
        }
        self.visibility
    }
}
