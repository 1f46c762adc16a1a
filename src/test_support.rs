//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::nav::{NavItem, Section};

/// `A(a1, a2)`, `B(b1)`; both always open.
pub fn two_sections() -> Vec<Section> {
    vec![
        Section::new("A", vec![NavItem::new("a1"), NavItem::new("a2")]),
        Section::new("B", vec![NavItem::new("b1")]),
    ]
}

/// ```text
/// [0] Main            Home, Projects{Alpha, Archive{2023}}, Calendar
/// [1] Library         collapsible, closed: Docs, Media
/// [2] Empty           no items
/// [3] Account         Settings
/// ```
pub fn nested_sections() -> Vec<Section> {
    vec![
        Section::new(
            "Main",
            vec![
                NavItem::new("Home").with_href("/"),
                NavItem::new("Projects").with_children(vec![
                    NavItem::new("Alpha").with_href("/alpha"),
                    NavItem::new("Archive").with_children(vec![NavItem::new("2023")]),
                ]),
                NavItem::new("Calendar"),
            ],
        ),
        Section::new("Library", vec![NavItem::new("Docs"), NavItem::new("Media")])
            .collapsible(false),
        Section::new("Empty", Vec::new()),
        Section::new("Account", vec![NavItem::new("Settings")]),
    ]
}

/// Seven compact leaves `X1..X7` in one section.
pub fn compact_items(count: usize) -> Vec<Section> {
    let items = (1..=count)
        .map(|i| NavItem::new(format!("X{i}")).compact())
        .collect();
    vec![Section::new("Mobile", items)]
}
