//! # Actions
//!
//! Everything that can happen to the navigation chrome becomes an `Action`.
//! The terminal shrinks? That's `Action::Resize`. User presses `/`?
//! That's `Action::KeyShortcut`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an [`Effect`] for the host to carry out. No I/O
//! happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! A resize is applied in one `update()` call: viewport class, disclosure
//! collapse, hover clearing and the overflow recompute all land together.

use log::{debug, info};

use crate::core::disclosure::{Outcome, Ownership, Trigger};
use crate::core::nav::{ItemKey, Section, flatten_compact};
use crate::core::overflow::Selection;
use crate::core::state::App;
use crate::core::tree::{TreeKey, TreeOutcome};
use crate::core::viewport::Viewport;

#[derive(Debug, Clone)]
pub enum Action {
    Resize(Viewport),
    /// Content scroll offset in logical px.
    Scroll(u32),
    PointerEnter,
    PointerLeave,
    TogglePanel,
    KeyShortcut {
        key: char,
        in_text_entry: bool,
    },
    /// Controlled mode: the owner's answer to an open-change request.
    OwnerDecided(bool),
    Tree(TreeKey),
    /// Pointer activation of a panel row.
    ActivateItem(ItemKey),
    /// Selection from the mobile sheet.
    SelectCompact(ItemKey),
    ToggleMore,
    SnapTo(usize),
    /// The sheet primitive asked to open or close.
    SheetOpenChanged(bool),
    LoadSections(Vec<Section>),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    /// Controlled mode: ask the owner to open or close the panel.
    OpenChangeRequested(bool),
    Navigate(String),
    Activated(ItemKey),
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Resize(viewport) => {
            app.viewport = viewport;
            let outcome = app.disclosure.dispatch(Trigger::Resize(viewport.width));
            app.overflow.resize(viewport.height as f32);
            disclosure_effect(app, outcome)
        }
        Action::Scroll(offset) => {
            app.disclosure.scroll(offset);
            Effect::None
        }
        Action::PointerEnter => {
            let outcome = app.disclosure.dispatch(Trigger::PointerEnter);
            disclosure_effect(app, outcome)
        }
        Action::PointerLeave => {
            let outcome = app.disclosure.dispatch(Trigger::PointerLeave);
            disclosure_effect(app, outcome)
        }
        Action::TogglePanel => {
            let outcome = app.disclosure.dispatch(Trigger::Toggle);
            disclosure_effect(app, outcome)
        }
        Action::KeyShortcut { key, in_text_entry } => {
            let outcome = app
                .disclosure
                .dispatch(Trigger::KeyShortcut { key, in_text_entry });
            disclosure_effect(app, outcome)
        }
        Action::OwnerDecided(open) => {
            app.owner_open = open;
            let outcome = app.disclosure.set_external(open);
            disclosure_effect(app, outcome)
        }
        Action::Tree(key) => {
            let outcome = app.tree.handle_key(key);
            tree_effect(app, outcome)
        }
        Action::ActivateItem(key) => {
            let outcome = match app.tree.item(&key) {
                Some(item) if item.has_children() => {
                    let expanded = !app.tree.is_expanded(&key);
                    app.tree.set_expanded(&key, expanded);
                    TreeOutcome::ItemToggled { path: key, expanded }
                }
                Some(_) => app.tree.activate(&key),
                None => TreeOutcome::Ignored,
            };
            tree_effect(app, outcome)
        }
        Action::SelectCompact(key) => {
            match app.overflow.select(&key) {
                Selection::Unknown => return Effect::None,
                Selection::Promoted { demoted } => {
                    debug!("{key} promoted, {demoted} demoted");
                }
                Selection::Unchanged => {}
            }
            app.tree.reveal(&key);
            let outcome = app.tree.activate(&key);
            tree_effect(app, outcome)
        }
        Action::ToggleMore => {
            app.overflow.toggle_more();
            Effect::None
        }
        Action::SnapTo(index) => {
            app.overflow.on_snap_point_change(index);
            Effect::None
        }
        Action::SheetOpenChanged(open) => {
            app.overflow.on_open_change(open);
            Effect::None
        }
        Action::LoadSections(sections) => {
            app.overflow.set_items(flatten_compact(&sections));
            app.tree.set_sections(sections);
            app.status_message = format!("Loaded {} sections", app.tree.sections().len());
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn disclosure_effect(app: &mut App, outcome: Outcome) -> Effect {
    match outcome {
        Outcome::Unchanged => Effect::None,
        Outcome::Applied(state) => {
            if app.disclosure.ownership() == Ownership::Uncontrolled {
                app.owner_open = app.disclosure.is_open();
            }
            app.status_message = format!("Navigation {}", state.label());
            Effect::None
        }
        Outcome::Requested { open } => Effect::OpenChangeRequested(open),
    }
}

fn tree_effect(app: &mut App, outcome: TreeOutcome) -> Effect {
    match outcome {
        TreeOutcome::Activated { key, href } => {
            let label = app
                .tree
                .item(&key)
                .map(|i| i.label.clone())
                .unwrap_or_default();
            app.status_message = format!("Selected {label}");
            match href {
                Some(href) => {
                    info!("Navigating to {href}");
                    app.location = Some(href.clone());
                    Effect::Navigate(href)
                }
                None => Effect::Activated(key),
            }
        }
        TreeOutcome::SectionToggled { section, open } => {
            let label = app
                .tree
                .sections()
                .get(section)
                .map(|s| s.label.as_str())
                .unwrap_or_default();
            app.status_message = format!("{label} {}", if open { "opened" } else { "closed" });
            Effect::None
        }
        TreeOutcome::Ignored | TreeOutcome::FocusMoved(_) | TreeOutcome::ItemToggled { .. } => {
            Effect::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{CliOverrides, NavConfig, ResolvedConfig, resolve_with_env};
    use crate::core::disclosure::DisclosureState;
    use crate::core::nav::{FocusKey, NodePath};
    use crate::test_support::{compact_items, nested_sections, two_sections};

    fn config(controlled: bool) -> ResolvedConfig {
        let cli = CliOverrides {
            controlled,
            ..Default::default()
        };
        resolve_with_env(&NavConfig::default(), &cli, |_| None)
    }

    fn desktop() -> Viewport {
        Viewport::new(1280, 800)
    }

    fn x(i: usize) -> ItemKey {
        NodePath::from_indices([0, i - 1])
    }

    #[test]
    fn test_uncontrolled_resize_collapses_in_one_step() {
        let mut app = App::new(config(false), two_sections(), desktop());
        update(&mut app, Action::TogglePanel);
        update(&mut app, Action::PointerEnter);
        assert_eq!(app.disclosure.state(), DisclosureState::Intermediate);

        let effect = update(&mut app, Action::Resize(Viewport::new(700, 500)));
        assert_eq!(effect, Effect::None);
        assert_eq!(app.disclosure.state(), DisclosureState::Collapsed);
    }

    #[test]
    fn test_controlled_round_trip() {
        let mut app = App::new(config(true), two_sections(), desktop());
        assert!(app.owner_open);

        let effect = update(&mut app, Action::Resize(Viewport::new(700, 500)));
        assert_eq!(effect, Effect::OpenChangeRequested(false));
        assert_eq!(app.disclosure.state(), DisclosureState::Expanded);

        update(&mut app, Action::OwnerDecided(false));
        assert_eq!(app.disclosure.state(), DisclosureState::Collapsed);
        assert!(!app.owner_open);
    }

    #[test]
    fn test_shortcut_suppressed_in_text_entry() {
        let mut app = App::new(config(false), two_sections(), desktop());
        let effect = update(
            &mut app,
            Action::KeyShortcut { key: '/', in_text_entry: true },
        );
        assert_eq!(effect, Effect::None);
        assert!(app.disclosure.is_open());

        update(&mut app, Action::KeyShortcut { key: '/', in_text_entry: false });
        assert!(!app.disclosure.is_open());
        assert!(!app.owner_open);
    }

    #[test]
    fn test_select_compact_promotes_and_marks_active() {
        let mut app = App::new(config(false), compact_items(7), Viewport::new(600, 900));
        update(&mut app, Action::ToggleMore);
        assert!(app.overflow.is_expanded());

        let effect = update(&mut app, Action::SelectCompact(x(6)));
        assert_eq!(effect, Effect::Activated(x(6)));
        assert_eq!(app.overflow.partition().primary, vec![x(1), x(2), x(3), x(6)]);
        assert_eq!(app.overflow.partition().secondary, vec![x(5), x(4), x(7)]);
        assert!(!app.overflow.is_expanded());
        assert!(app.tree.is_active(&x(6)));
    }

    #[test]
    fn test_tree_activation_navigates() {
        let mut app = App::new(config(false), nested_sections(), desktop());
        app.tree.focus(&FocusKey::Item(NodePath::from_indices([0, 0])));
        let effect = update(&mut app, Action::Tree(TreeKey::Enter));
        assert_eq!(effect, Effect::Navigate("/".to_string()));
        assert_eq!(app.location.as_deref(), Some("/"));
    }

    #[test]
    fn test_activate_item_toggles_parents() {
        let mut app = App::new(config(false), nested_sections(), desktop());
        let parent = NodePath::from_indices([0, 1]);
        assert_eq!(update(&mut app, Action::ActivateItem(parent.clone())), Effect::None);
        assert!(app.tree.is_expanded(&parent));
        assert!(app.store.active().is_none());
    }

    #[test]
    fn test_load_sections_resets_layout() {
        let mut app = App::new(config(false), compact_items(7), Viewport::new(600, 900));
        update(&mut app, Action::LoadSections(compact_items(3)));
        assert!(!app.overflow.partition().has_overflow);
        assert_eq!(app.overflow.snap_points().len(), 1);
        assert_eq!(app.status_message, "Loaded 1 sections");
    }

    #[test]
    fn test_sheet_close_request_collapses() {
        let mut app = App::new(config(false), compact_items(7), Viewport::new(600, 900));
        update(&mut app, Action::SnapTo(1));
        assert!(app.overflow.is_expanded());
        update(&mut app, Action::SheetOpenChanged(false));
        assert!(app.overflow.sheet().open);
        assert!(!app.overflow.is_expanded());
    }

    #[test]
    fn test_quit() {
        let mut app = App::new(config(false), two_sections(), desktop());
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
