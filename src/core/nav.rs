//! # Navigation Model
//!
//! The host-supplied input contract: an ordered list of [`Section`]s, each
//! holding a recursive [`NavItem`] tree.
//!
//! ```text
//! Section "Workspace"            path [0]
//! ├── NavItem "Inbox"            path [0, 0]
//! └── NavItem "Projects"         path [0, 1]
//!     ├── NavItem "Alpha"        path [0, 1, 0]
//!     └── NavItem "Beta"         path [0, 1, 1]
//! ```
//!
//! Nodes are identified by their [`NodePath`], never by label. Labels are
//! only display text, so two siblings sharing a label stay distinct.
//!
//! Trees can be loaded from TOML or JSON files; runtime callbacks
//! ([`Activation`]) are attached in code after loading.

use log::{debug, info};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

// ============================================================================
// Identifiers
// ============================================================================

/// Stable position of a node: section index followed by child indices.
///
/// `[s]` is a section, `[s, i]` a root item of that section, `[s, i, j]` a
/// child of that item, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn section(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn from_indices(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Parent item path, or `None` for section roots and section paths.
    pub fn parent_item(&self) -> Option<NodePath> {
        if self.0.len() > 2 {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        } else {
            None
        }
    }

    pub fn section_index(&self) -> usize {
        self.0.first().copied().unwrap_or(0)
    }

    /// Nesting depth below the section: 0 for root items.
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(2)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Key of the active-item register.
pub type ItemKey = NodePath;

/// Anything that can hold keyboard focus inside the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FocusKey {
    Section(usize),
    Item(NodePath),
}

impl fmt::Display for FocusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusKey::Section(index) => write!(f, "section:{index}"),
            FocusKey::Item(path) => write!(f, "item:{path}"),
        }
    }
}

// ============================================================================
// Items and Sections
// ============================================================================

/// Callback invoked when a leaf item is activated.
#[derive(Clone)]
pub struct Activation(Rc<dyn Fn(&ItemKey)>);

impl Activation {
    pub fn new(callback: impl Fn(&ItemKey) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    pub fn call(&self, key: &ItemKey) {
        (self.0)(key)
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Activation(..)")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavItem {
    pub label: String,
    #[serde(default)]
    pub children: Vec<NavItem>,
    /// Decoration handle. Opaque to the core, rendered by the host.
    pub icon: Option<String>,
    /// Present for navigation links, absent for pure actions.
    pub href: Option<String>,
    /// External override of the active flag.
    pub selected: Option<bool>,
    /// Opt-in to the mobile overflow surface.
    #[serde(default)]
    pub compact: bool,
    #[serde(skip)]
    pub on_activate: Option<Activation>,
}

impl NavItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<NavItem>) -> Self {
        self.children = children;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn compact(mut self) -> Self {
        self.compact = true;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    pub fn on_activate(mut self, callback: impl Fn(&ItemKey) + 'static) -> Self {
        self.on_activate = Some(Activation::new(callback));
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

fn default_open() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub label: String,
    #[serde(default)]
    pub collapsible: bool,
    #[serde(default = "default_open")]
    pub default_open: bool,
    #[serde(default)]
    pub items: Vec<NavItem>,
}

impl Section {
    pub fn new(label: impl Into<String>, items: Vec<NavItem>) -> Self {
        Self {
            label: label.into(),
            collapsible: false,
            default_open: true,
            items,
        }
    }

    pub fn collapsible(mut self, default_open: bool) -> Self {
        self.collapsible = true;
        self.default_open = default_open;
        self
    }
}

/// Resolve an item by path. Section paths and stale paths yield `None`.
pub fn item_at<'a>(sections: &'a [Section], path: &NodePath) -> Option<&'a NavItem> {
    let (section_index, rest) = path.indices().split_first()?;
    let (first, rest) = rest.split_first()?;
    let mut item = sections.get(*section_index)?.items.get(*first)?;
    for index in rest {
        item = item.children.get(*index)?;
    }
    Some(item)
}

/// Depth-first, document-order list of items opted into the compact surface.
///
/// Falls back to every section's root items when nothing opts in.
pub fn flatten_compact(sections: &[Section]) -> Vec<ItemKey> {
    fn walk(item: &NavItem, path: NodePath, out: &mut Vec<ItemKey>) {
        if item.compact {
            out.push(path.clone());
        }
        for (index, child) in item.children.iter().enumerate() {
            walk(child, path.child(index), out);
        }
    }

    let mut flagged = Vec::new();
    for (section_index, section) in sections.iter().enumerate() {
        let root = NodePath::section(section_index);
        for (index, item) in section.items.iter().enumerate() {
            walk(item, root.child(index), &mut flagged);
        }
    }
    if !flagged.is_empty() {
        return flagged;
    }

    sections
        .iter()
        .enumerate()
        .flat_map(|(section_index, section)| {
            (0..section.items.len()).map(move |index| NodePath::from_indices([section_index, index]))
        })
        .collect()
}

// ============================================================================
// Tree Files
// ============================================================================

#[derive(Debug, Deserialize)]
struct TreeFile {
    #[serde(default)]
    sections: Vec<Section>,
}

#[derive(Debug)]
pub enum TreeFileError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
    UnsupportedFormat(String),
}

impl fmt::Display for TreeFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeFileError::Io(e) => write!(f, "tree file I/O error: {e}"),
            TreeFileError::Toml(e) => write!(f, "tree file TOML error: {e}"),
            TreeFileError::Json(e) => write!(f, "tree file JSON error: {e}"),
            TreeFileError::UnsupportedFormat(ext) => {
                write!(f, "unsupported tree file format: {ext:?} (expected .toml or .json)")
            }
        }
    }
}

impl std::error::Error for TreeFileError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeFormat {
    Toml,
    Json,
}

pub fn parse_tree(contents: &str, format: TreeFormat) -> Result<Vec<Section>, TreeFileError> {
    let file: TreeFile = match format {
        TreeFormat::Toml => toml::from_str(contents).map_err(TreeFileError::Toml)?,
        TreeFormat::Json => serde_json::from_str(contents).map_err(TreeFileError::Json)?,
    };
    debug!("Parsed {} sections ({:?})", file.sections.len(), format);
    Ok(file.sections)
}

/// Load sections from a `.toml` or `.json` file, picked by extension.
pub fn load_tree_file(path: &Path) -> Result<Vec<Section>, TreeFileError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let format = match ext.as_str() {
        "toml" => TreeFormat::Toml,
        "json" => TreeFormat::Json,
        _ => return Err(TreeFileError::UnsupportedFormat(ext)),
    };
    let contents = fs::read_to_string(path).map_err(TreeFileError::Io)?;
    let sections = parse_tree(&contents, format)?;
    info!("Loaded navigation tree from {}", path.display());
    Ok(sections)
}

/// Built-in tree used when no tree file is configured.
pub fn sample_sections() -> Vec<Section> {
    vec![
        Section::new(
            "Workspace",
            vec![
                NavItem::new("Home").with_icon("⌂").with_href("/").compact(),
                NavItem::new("Inbox").with_icon("✉").with_href("/inbox").compact(),
                NavItem::new("Projects").with_icon("▣").with_children(vec![
                    NavItem::new("Alpha").with_href("/projects/alpha").compact(),
                    NavItem::new("Beta").with_href("/projects/beta").compact(),
                    NavItem::new("Archive").with_children(vec![
                        NavItem::new("2023").with_href("/projects/archive/2023"),
                        NavItem::new("2024").with_href("/projects/archive/2024"),
                    ]),
                ]),
                NavItem::new("Calendar").with_icon("◷").with_href("/calendar").compact(),
            ],
        ),
        Section::new(
            "Library",
            vec![
                NavItem::new("Documents").with_icon("≡").with_href("/docs").compact(),
                NavItem::new("Media").with_icon("♫").with_href("/media").compact(),
            ],
        )
        .collapsible(true),
        Section::new(
            "Account",
            vec![
                NavItem::new("Settings").with_icon("⚙").with_href("/settings").compact(),
                NavItem::new("Sign out").with_icon("⏻"),
            ],
        )
        .collapsible(false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_path_relations() {
        let path = NodePath::from_indices([1, 2, 3]);
        assert_eq!(path.section_index(), 1);
        assert_eq!(path.depth(), 1);
        assert_eq!(path.parent_item(), Some(NodePath::from_indices([1, 2])));
        assert_eq!(NodePath::from_indices([1, 2]).parent_item(), None);
        assert_eq!(path.to_string(), "1.2.3");
    }

    #[test]
    fn test_item_at_resolves_nested_and_rejects_stale() {
        let sections = sample_sections();
        let alpha = item_at(&sections, &NodePath::from_indices([0, 2, 0])).map(|i| i.label.as_str());
        assert_eq!(alpha, Some("Alpha"));
        assert!(item_at(&sections, &NodePath::section(0)).is_none());
        assert!(item_at(&sections, &NodePath::from_indices([0, 9])).is_none());
        assert!(item_at(&sections, &NodePath::from_indices([7, 0])).is_none());
    }

    #[test]
    fn test_flatten_compact_is_document_order() {
        let sections = sample_sections();
        let labels: Vec<&str> = flatten_compact(&sections)
            .iter()
            .filter_map(|p| item_at(&sections, p))
            .map(|i| i.label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec!["Home", "Inbox", "Alpha", "Beta", "Calendar", "Documents", "Media", "Settings"]
        );
    }

    #[test]
    fn test_flatten_compact_falls_back_to_roots() {
        let sections = vec![
            Section::new("A", vec![NavItem::new("a1"), NavItem::new("a2")]),
            Section::new("B", vec![NavItem::new("b1").with_children(vec![NavItem::new("b1x")])]),
        ];
        let keys = flatten_compact(&sections);
        assert_eq!(
            keys,
            vec![
                NodePath::from_indices([0, 0]),
                NodePath::from_indices([0, 1]),
                NodePath::from_indices([1, 0]),
            ]
        );
    }

    #[test]
    fn test_parse_toml_tree() {
        let toml_str = r#"
[[sections]]
label = "Main"

[[sections.items]]
label = "Home"
href = "/"
compact = true

[[sections.items]]
label = "Reports"

[[sections.items.children]]
label = "Daily"

[[sections]]
label = "Other"
collapsible = true
default_open = false
"#;
        let sections = parse_tree(toml_str, TreeFormat::Toml).unwrap();
        assert_eq!(sections.len(), 2);
        assert!(sections[0].default_open);
        assert!(!sections[0].collapsible);
        assert_eq!(sections[0].items[1].children[0].label, "Daily");
        assert!(sections[0].items[0].compact);
        assert!(sections[1].collapsible);
        assert!(!sections[1].default_open);
        assert!(sections[1].items.is_empty());
    }

    #[test]
    fn test_parse_json_tree() {
        let json = r#"{"sections":[{"label":"S","items":[{"label":"x","selected":true}]}]}"#;
        let sections = parse_tree(json, TreeFormat::Json).unwrap();
        assert_eq!(sections[0].items[0].selected, Some(true));
        assert!(sections[0].items[0].on_activate.is_none());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_tree_file(Path::new("nav.yaml")).unwrap_err();
        assert!(matches!(err, TreeFileError::UnsupportedFormat(ref e) if e == "yaml"));
    }

    #[test]
    fn test_activation_callback_runs() {
        use std::cell::Cell;
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let item = NavItem::new("x").on_activate(move |_| counter.set(counter.get() + 1));
        if let Some(cb) = &item.on_activate {
            cb.call(&NodePath::from_indices([0, 0]));
        }
        assert_eq!(hits.get(), 1);
    }
}
