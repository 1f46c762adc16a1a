//! # Navigation Tree
//!
//! Per-node expansion, the shared active item, and keyboard traversal over
//! `Section → NavItem → NavItem …` of any depth.
//!
//! Traversal is index arithmetic over a flattened *focus flow*: the
//! document-order list of visible items, where a section with nothing
//! visible (collapsed or empty) contributes its header instead. Crossing a
//! section boundary is therefore just `index ± 1`.
//!
//! ```text
//!  rendered rows          focus flow
//!  ─────────────          ──────────
//!  [A]                    .
//!    a1                   a1
//!    a2 ▸ (closed)        a2
//!  [B] (collapsed)        [B]
//!  [C]                    .
//!    c1                   c1
//! ```
//!
//! Every rendered row registers a focus handle in the [`NavStore`] on
//! rebuild; hidden rows are dropped from the registry, so focus can only
//! land on something visible.

use log::{debug, trace};
use std::collections::HashSet;

use crate::core::nav::{FocusKey, ItemKey, NavItem, NodePath, Section, item_at};
use crate::core::store::{FocusHandle, NavStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKey {
    Enter,
    Space,
    Left,
    Right,
    Up,
    Down,
    /// Jump to the header of the focused node's section.
    Home,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOutcome {
    /// Nothing to do: leaf expansion keys, list boundaries, unknown nodes.
    Ignored,
    FocusMoved(FocusKey),
    ItemToggled { path: NodePath, expanded: bool },
    SectionToggled { section: usize, open: bool },
    Activated { key: ItemKey, href: Option<String> },
}

/// One rendered line of the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow<'a> {
    pub key: FocusKey,
    pub label: &'a str,
    pub icon: Option<&'a str>,
    /// 0 for headers and root items.
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub active: bool,
    pub focused: bool,
}

pub struct NavigationTree {
    sections: Vec<Section>,
    section_open: Vec<bool>,
    expanded: HashSet<NodePath>,
    store: NavStore,
    focus_hook: FocusHandle,
    flow: Vec<FocusKey>,
}

impl NavigationTree {
    pub fn new(sections: Vec<Section>, store: NavStore) -> Self {
        let section_open = initial_section_state(&sections);
        let mut tree = Self {
            sections,
            section_open,
            expanded: HashSet::new(),
            store,
            focus_hook: FocusHandle::noop(),
            flow: Vec::new(),
        };
        tree.rebuild();
        tree
    }

    /// Replace the handle registered for every rendered row.
    pub fn with_focus_hook(mut self, hook: FocusHandle) -> Self {
        self.focus_hook = hook;
        self.store.retain_focus(|_| false);
        self.rebuild();
        self
    }

    /// Swap in a new tree. Expansion resets; the active item survives only
    /// if its path still resolves.
    pub fn set_sections(&mut self, sections: Vec<Section>) {
        self.section_open = initial_section_state(&sections);
        self.sections = sections;
        self.expanded.clear();
        if let Some(active) = self.store.active()
            && item_at(&self.sections, &active).is_none()
        {
            self.store.set_active(None);
        }
        self.rebuild();
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn store(&self) -> &NavStore {
        &self.store
    }

    pub fn item(&self, path: &NodePath) -> Option<&NavItem> {
        item_at(&self.sections, path)
    }

    pub fn flow(&self) -> &[FocusKey] {
        &self.flow
    }

    pub fn focused(&self) -> Option<FocusKey> {
        self.store.focused()
    }

    // ------------------------------------------------------------------
    // Expansion
    // ------------------------------------------------------------------

    pub fn is_section_open(&self, section: usize) -> bool {
        self.section_open.get(section).copied().unwrap_or(false)
    }

    pub fn is_expanded(&self, path: &NodePath) -> bool {
        self.expanded.contains(path)
    }

    /// Returns `false` for leaves and unknown paths.
    pub fn set_expanded(&mut self, path: &NodePath, expanded: bool) -> bool {
        if !self.item(path).is_some_and(NavItem::has_children) {
            return false;
        }
        let changed = if expanded {
            self.expanded.insert(path.clone())
        } else {
            self.expanded.remove(path)
        };
        if changed {
            trace!("Item {path} expanded={expanded}");
            self.rebuild();
        }
        changed
    }

    /// Non-collapsible sections are always open.
    pub fn set_section_open(&mut self, section: usize, open: bool) -> bool {
        let Some(current) = self.section_open.get(section).copied() else {
            return false;
        };
        if current == open || !self.sections[section].collapsible {
            return false;
        }
        self.section_open[section] = open;
        trace!("Section {section} open={open}");
        self.rebuild();
        true
    }

    /// Open the section and every ancestor so `path` is rendered.
    pub fn reveal(&mut self, path: &NodePath) {
        let section = path.section_index();
        if let Some(open) = self.section_open.get_mut(section) {
            *open = true;
        }
        let mut ancestor = path.parent_item();
        while let Some(parent) = ancestor {
            ancestor = parent.parent_item();
            self.expanded.insert(parent);
        }
        self.rebuild();
    }

    // ------------------------------------------------------------------
    // Active item
    // ------------------------------------------------------------------

    /// A node's own `selected` override beats the shared register.
    pub fn is_active(&self, path: &NodePath) -> bool {
        match self.item(path) {
            Some(item) => item.selected.unwrap_or_else(|| self.store.is_active(path)),
            None => false,
        }
    }

    /// Mark a leaf active and run its callback.
    pub fn activate(&mut self, path: &NodePath) -> TreeOutcome {
        let Some(item) = item_at(&self.sections, path) else {
            return TreeOutcome::Ignored;
        };
        let href = item.href.clone();
        let callback = item.on_activate.clone();
        self.store.set_active(Some(path.clone()));
        if let Some(callback) = callback {
            callback.call(path);
        }
        debug!("Activated {path} (href: {href:?})");
        TreeOutcome::Activated {
            key: path.clone(),
            href,
        }
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    pub fn focus(&self, key: &FocusKey) -> bool {
        self.store.focus(key)
    }

    fn move_focus(&self, key: FocusKey) -> TreeOutcome {
        if self.store.focus(&key) {
            TreeOutcome::FocusMoved(key)
        } else {
            TreeOutcome::Ignored
        }
    }

    /// Handle a key against the focused node. With nothing focused, Down
    /// and Up enter the flow at its first or last entry.
    pub fn handle_key(&mut self, key: TreeKey) -> TreeOutcome {
        match self.store.focused() {
            Some(FocusKey::Section(section)) => self.handle_section_key(section, key),
            Some(FocusKey::Item(path)) => self.handle_item_key(&path, key),
            None => {
                let entry = match key {
                    TreeKey::Down => self.flow.first().cloned(),
                    TreeKey::Up => self.flow.last().cloned(),
                    TreeKey::Home if !self.sections.is_empty() => Some(FocusKey::Section(0)),
                    _ => None,
                };
                entry.map_or(TreeOutcome::Ignored, |k| self.move_focus(k))
            }
        }
    }

    fn handle_item_key(&mut self, path: &NodePath, key: TreeKey) -> TreeOutcome {
        let Some(has_children) = self.item(path).map(NavItem::has_children) else {
            return TreeOutcome::Ignored;
        };
        match key {
            TreeKey::Enter | TreeKey::Space => {
                if has_children {
                    let expanded = !self.is_expanded(path);
                    self.set_expanded(path, expanded);
                    TreeOutcome::ItemToggled {
                        path: path.clone(),
                        expanded,
                    }
                } else {
                    self.activate(path)
                }
            }
            TreeKey::Right => {
                if has_children && self.set_expanded(path, true) {
                    TreeOutcome::ItemToggled {
                        path: path.clone(),
                        expanded: true,
                    }
                } else {
                    TreeOutcome::Ignored
                }
            }
            TreeKey::Left => {
                if has_children && self.set_expanded(path, false) {
                    TreeOutcome::ItemToggled {
                        path: path.clone(),
                        expanded: false,
                    }
                } else {
                    TreeOutcome::Ignored
                }
            }
            TreeKey::Down => self.step(&FocusKey::Item(path.clone()), 1),
            TreeKey::Up => self.step(&FocusKey::Item(path.clone()), -1),
            TreeKey::Home => self.move_focus(FocusKey::Section(path.section_index())),
        }
    }

    fn handle_section_key(&mut self, section: usize, key: TreeKey) -> TreeOutcome {
        let Some(item_count) = self.sections.get(section).map(|s| s.items.len()) else {
            return TreeOutcome::Ignored;
        };
        match key {
            TreeKey::Enter | TreeKey::Space => {
                let open = !self.is_section_open(section);
                if self.set_section_open(section, open) {
                    TreeOutcome::SectionToggled { section, open }
                } else {
                    TreeOutcome::Ignored
                }
            }
            TreeKey::Down => {
                if item_count > 0 {
                    if !self.is_section_open(section) {
                        self.section_open[section] = true;
                        self.rebuild();
                    }
                    self.move_focus(FocusKey::Item(NodePath::from_indices([section, 0])))
                } else if section + 1 < self.sections.len() {
                    self.move_focus(FocusKey::Section(section + 1))
                } else {
                    TreeOutcome::Ignored
                }
            }
            TreeKey::Up => {
                if section > 0 {
                    self.move_focus(FocusKey::Section(section - 1))
                } else {
                    TreeOutcome::Ignored
                }
            }
            TreeKey::Left | TreeKey::Right | TreeKey::Home => TreeOutcome::Ignored,
        }
    }

    /// Move along the flow, clamped at both ends.
    fn step(&self, from: &FocusKey, delta: isize) -> TreeOutcome {
        let Some(index) = self.flow.iter().position(|k| k == from) else {
            return TreeOutcome::Ignored;
        };
        let Some(target) = index
            .checked_add_signed(delta)
            .and_then(|i| self.flow.get(i))
            .cloned()
        else {
            trace!("Focus at flow boundary ({from})");
            return TreeOutcome::Ignored;
        };
        self.move_focus(target)
    }

    // ------------------------------------------------------------------
    // Flattening
    // ------------------------------------------------------------------

    fn push_visible(&self, item: &NavItem, path: NodePath, out: &mut Vec<NodePath>) {
        let open = item.has_children() && self.expanded.contains(&path);
        out.push(path.clone());
        if open {
            for (index, child) in item.children.iter().enumerate() {
                self.push_visible(child, path.child(index), out);
            }
        }
    }

    fn visible_items(&self, section: usize) -> Vec<NodePath> {
        let mut out = Vec::new();
        if !self.is_section_open(section) {
            return out;
        }
        let root = NodePath::section(section);
        for (index, item) in self.sections[section].items.iter().enumerate() {
            self.push_visible(item, root.child(index), &mut out);
        }
        out
    }

    /// Every rendered row, headers included, in document order.
    pub fn visible_rows(&self) -> Vec<TreeRow<'_>> {
        let focused = self.store.focused();
        let mut rows = Vec::new();
        for (index, section) in self.sections.iter().enumerate() {
            let header = FocusKey::Section(index);
            rows.push(TreeRow {
                focused: focused.as_ref() == Some(&header),
                key: header,
                label: &section.label,
                icon: None,
                depth: 0,
                has_children: section.collapsible,
                expanded: self.is_section_open(index),
                active: false,
            });
            for path in self.visible_items(index) {
                let Some(item) = self.item(&path) else {
                    continue;
                };
                let key = FocusKey::Item(path.clone());
                rows.push(TreeRow {
                    focused: focused.as_ref() == Some(&key),
                    key,
                    label: &item.label,
                    icon: item.icon.as_deref(),
                    depth: path.depth(),
                    has_children: item.has_children(),
                    expanded: self.is_expanded(&path),
                    active: self.is_active(&path),
                });
            }
        }
        rows
    }

    fn rebuild(&mut self) {
        let mut flow = Vec::new();
        let mut rendered: HashSet<FocusKey> = HashSet::new();
        for section in 0..self.sections.len() {
            rendered.insert(FocusKey::Section(section));
            let items = self.visible_items(section);
            if items.is_empty() {
                flow.push(FocusKey::Section(section));
            }
            for path in items {
                rendered.insert(FocusKey::Item(path.clone()));
                flow.push(FocusKey::Item(path));
            }
        }
        self.flow = flow;

        let focused_before = self.store.focused();
        self.store.retain_focus(|k| rendered.contains(k));
        for key in rendered {
            if !self.store.is_registered(&key) {
                self.store.register_focus(key, self.focus_hook.clone());
            }
        }

        // Focus hidden by a collapse moves to the nearest visible ancestor.
        if let Some(lost) = focused_before
            && !self.store.is_registered(&lost)
            && let FocusKey::Item(path) = lost
        {
            let mut fallback = FocusKey::Section(path.section_index());
            let mut ancestor = path.parent_item();
            while let Some(parent) = ancestor {
                let key = FocusKey::Item(parent.clone());
                if self.store.is_registered(&key) {
                    fallback = key;
                    break;
                }
                ancestor = parent.parent_item();
            }
            trace!("Focus {path} hidden, moving to {fallback}");
            self.store.focus(&fallback);
        }
    }
}

fn initial_section_state(sections: &[Section]) -> Vec<bool> {
    sections
        .iter()
        .map(|s| !s.collapsible || s.default_open)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{nested_sections, two_sections};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn item(indices: &[usize]) -> FocusKey {
        FocusKey::Item(NodePath::from_indices(indices.to_vec()))
    }

    fn tree(sections: Vec<Section>) -> NavigationTree {
        NavigationTree::new(sections, NavStore::new())
    }

    #[test]
    fn test_cross_section_traversal() {
        let mut t = tree(two_sections());
        assert!(t.focus(&FocusKey::Section(0)));
        assert_eq!(t.handle_key(TreeKey::Down), TreeOutcome::FocusMoved(item(&[0, 0])));

        t.focus(&item(&[0, 1]));
        assert_eq!(t.handle_key(TreeKey::Down), TreeOutcome::FocusMoved(item(&[1, 0])));
        assert_eq!(t.handle_key(TreeKey::Up), TreeOutcome::FocusMoved(item(&[0, 1])));
    }

    #[test]
    fn test_boundaries_are_clamped() {
        let mut t = tree(two_sections());
        t.focus(&item(&[0, 0]));
        assert_eq!(t.handle_key(TreeKey::Up), TreeOutcome::Ignored);
        t.focus(&item(&[1, 0]));
        assert_eq!(t.handle_key(TreeKey::Down), TreeOutcome::Ignored);
        assert_eq!(t.focused(), Some(item(&[1, 0])));
    }

    #[test]
    fn test_enter_with_nothing_focused() {
        let mut t = tree(two_sections());
        assert_eq!(t.handle_key(TreeKey::Enter), TreeOutcome::Ignored);
        assert_eq!(t.handle_key(TreeKey::Down), TreeOutcome::FocusMoved(item(&[0, 0])));
    }

    #[test]
    fn test_expand_collapse_keys() {
        let mut t = tree(nested_sections());
        let parent = NodePath::from_indices([0, 1]);
        t.focus(&FocusKey::Item(parent.clone()));

        assert_eq!(t.handle_key(TreeKey::Left), TreeOutcome::Ignored);
        assert_eq!(
            t.handle_key(TreeKey::Right),
            TreeOutcome::ItemToggled { path: parent.clone(), expanded: true }
        );
        assert_eq!(t.handle_key(TreeKey::Right), TreeOutcome::Ignored);
        assert_eq!(t.handle_key(TreeKey::Down), TreeOutcome::FocusMoved(item(&[0, 1, 0])));
        assert_eq!(t.handle_key(TreeKey::Right), TreeOutcome::Ignored);

        t.focus(&FocusKey::Item(parent.clone()));
        assert_eq!(
            t.handle_key(TreeKey::Enter),
            TreeOutcome::ItemToggled { path: parent, expanded: false }
        );
    }

    #[test]
    fn test_traversal_enters_expanded_children() {
        let mut t = tree(nested_sections());
        t.set_expanded(&NodePath::from_indices([0, 1]), true);
        t.set_expanded(&NodePath::from_indices([0, 1, 1]), true);
        t.focus(&item(&[0, 1, 1, 0]));
        assert_eq!(t.handle_key(TreeKey::Down), TreeOutcome::FocusMoved(item(&[0, 2])));
        assert_eq!(t.handle_key(TreeKey::Up), TreeOutcome::FocusMoved(item(&[0, 1, 1, 0])));
    }

    #[test]
    fn test_collapse_moves_hidden_focus_to_ancestor() {
        let mut t = tree(nested_sections());
        let parent = NodePath::from_indices([0, 1]);
        t.set_expanded(&parent, true);
        t.focus(&item(&[0, 1, 0]));
        t.set_expanded(&parent, false);
        assert_eq!(t.focused(), Some(FocusKey::Item(parent)));
    }

    #[test]
    fn test_leaf_activation_sets_active_and_runs_callback() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        let sections = vec![Section::new(
            "S",
            vec![
                NavItem::new("Home").with_href("/"),
                NavItem::new("Act").on_activate(move |k| sink.borrow_mut().push(k.clone())),
            ],
        )];
        let mut t = tree(sections);

        t.focus(&item(&[0, 1]));
        let outcome = t.handle_key(TreeKey::Space);
        assert_eq!(
            outcome,
            TreeOutcome::Activated { key: NodePath::from_indices([0, 1]), href: None }
        );
        assert_eq!(calls.borrow().len(), 1);
        assert!(t.is_active(&NodePath::from_indices([0, 1])));

        t.focus(&item(&[0, 0]));
        assert_eq!(
            t.handle_key(TreeKey::Enter),
            TreeOutcome::Activated {
                key: NodePath::from_indices([0, 0]),
                href: Some("/".to_string())
            }
        );
        assert!(!t.is_active(&NodePath::from_indices([0, 1])));
    }

    #[test]
    fn test_selected_override_wins() {
        let sections = vec![Section::new(
            "S",
            vec![NavItem::new("pinned").selected(true), NavItem::new("never").selected(false)],
        )];
        let mut t = tree(sections);
        t.activate(&NodePath::from_indices([0, 1]));
        assert!(t.is_active(&NodePath::from_indices([0, 0])));
        assert!(!t.is_active(&NodePath::from_indices([0, 1])));
    }

    #[test]
    fn test_duplicate_labels_stay_distinct() {
        let sections = vec![Section::new("S", vec![NavItem::new("Same"), NavItem::new("Same")])];
        let mut t = tree(sections);
        t.activate(&NodePath::from_indices([0, 1]));
        assert!(!t.is_active(&NodePath::from_indices([0, 0])));
        assert!(t.is_active(&NodePath::from_indices([0, 1])));
    }

    #[test]
    fn test_section_header_protocol() {
        let mut t = tree(nested_sections());
        // Section 1 is collapsible and starts closed.
        assert!(!t.is_section_open(1));
        assert!(t.flow().contains(&FocusKey::Section(1)));

        t.focus(&FocusKey::Section(1));
        assert_eq!(t.handle_key(TreeKey::Down), TreeOutcome::FocusMoved(item(&[1, 0])));
        assert!(t.is_section_open(1));

        t.focus(&FocusKey::Section(1));
        assert_eq!(
            t.handle_key(TreeKey::Enter),
            TreeOutcome::SectionToggled { section: 1, open: false }
        );
        assert_eq!(t.handle_key(TreeKey::Up), TreeOutcome::FocusMoved(FocusKey::Section(0)));
        assert_eq!(t.handle_key(TreeKey::Up), TreeOutcome::Ignored);
        // Non-collapsible header ignores Enter.
        assert_eq!(t.handle_key(TreeKey::Enter), TreeOutcome::Ignored);
    }

    #[test]
    fn test_empty_section_header_moves_to_next_section() {
        let mut t = tree(nested_sections());
        t.focus(&FocusKey::Section(2));
        assert_eq!(t.handle_key(TreeKey::Down), TreeOutcome::FocusMoved(FocusKey::Section(3)));
        assert_eq!(t.handle_key(TreeKey::Down), TreeOutcome::FocusMoved(item(&[3, 0])));
    }

    #[test]
    fn test_closing_section_hides_focus_to_header() {
        let mut t = tree(nested_sections());
        t.set_section_open(1, true);
        t.focus(&item(&[1, 0]));
        t.set_section_open(1, false);
        assert_eq!(t.focused(), Some(FocusKey::Section(1)));
        assert!(!t.store().is_registered(&item(&[1, 0])));
    }

    #[test]
    fn test_reveal_opens_ancestors() {
        let mut t = tree(nested_sections());
        let deep = NodePath::from_indices([0, 1, 1, 0]);
        t.reveal(&deep);
        assert!(t.flow().contains(&FocusKey::Item(deep)));
    }

    #[test]
    fn test_visible_rows_mark_state() {
        let mut t = tree(two_sections());
        t.activate(&NodePath::from_indices([1, 0]));
        t.focus(&item(&[0, 1]));
        let rows = t.visible_rows();
        let labels: Vec<&str> = rows.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["A", "a1", "a2", "B", "b1"]);
        assert!(rows[4].active);
        assert!(rows[2].focused);
        assert!(!rows[1].focused);
    }

    #[test]
    fn test_focus_hook_runs_on_moves() {
        let moves = Rc::new(RefCell::new(Vec::new()));
        let sink = moves.clone();
        let mut t = NavigationTree::new(two_sections(), NavStore::new())
            .with_focus_hook(FocusHandle::new(move |k| sink.borrow_mut().push(k.clone())));
        t.handle_key(TreeKey::Down);
        t.handle_key(TreeKey::Down);
        assert_eq!(*moves.borrow(), vec![item(&[0, 0]), item(&[0, 1])]);
    }

    #[test]
    fn test_set_sections_drops_stale_active() {
        let mut t = tree(nested_sections());
        t.activate(&NodePath::from_indices([3, 0]));
        t.set_sections(two_sections());
        assert!(t.store().active().is_none());
    }

    #[test]
    fn test_home_reaches_open_section_header() {
        let mut t = tree(vec![
            Section::new("A", vec![NavItem::new("a1")]),
            Section::new("B", vec![NavItem::new("b1"), NavItem::new("b2")]).collapsible(true),
        ]);
        assert!(!t.flow().contains(&FocusKey::Section(1)));

        for _ in 0..3 {
            t.handle_key(TreeKey::Down);
        }
        assert_eq!(t.focused(), Some(item(&[1, 1])));

        assert_eq!(t.handle_key(TreeKey::Home), TreeOutcome::FocusMoved(FocusKey::Section(1)));
        assert_eq!(
            t.handle_key(TreeKey::Enter),
            TreeOutcome::SectionToggled { section: 1, open: false }
        );
        assert_eq!(t.flow(), &[item(&[0, 0]), FocusKey::Section(1)]);
        assert_eq!(t.handle_key(TreeKey::Home), TreeOutcome::Ignored);
    }

    #[test]
    fn test_home_with_nothing_focused_enters_first_header() {
        let mut t = tree(two_sections());
        assert_eq!(t.handle_key(TreeKey::Home), TreeOutcome::FocusMoved(FocusKey::Section(0)));
    }
}
