//! # SidePanel Component
//!
//! Renders the navigation tree in one of three shapes, picked from the
//! disclosure state and viewport class:
//!
//! ```text
//!  Full (expanded)        Rail (collapsed)
//!  ┌ Navigation ──────┐   ┌───┐
//!  │ WORKSPACE        │   │ ─ │
//!  │   ⌂ Home         │   │ ⌂ │
//!  │   ▸ ▣ Projects   │   │ ▣ │
//!  └──────────────────┘   └───┘
//! ```
//!
//! The overlay (intermediate) is the full panel drawn from the rail's
//! origin over the content, after a `Clear`, so layout does not shift
//! while previewing.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidePanelState` lives in `TuiState` (scroll offset, hit regions)
//! - `SidePanel` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::nav::FocusKey;
use crate::core::tree::{NavigationTree, TreeRow};
use crate::tui::component::Component;

pub const PANEL_WIDTH: u16 = 30;
pub const RAIL_WIDTH: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    Full,
    Rail,
    /// Full panel drawn over the content.
    Overlay,
}

/// Persistent panel state: scroll position and what was drawn where.
#[derive(Default)]
pub struct SidePanelState {
    pub scroll_state: ScrollViewState,
    /// Outer rect of the last render, borders included.
    pub area: Option<Rect>,
    /// Rect the rows were drawn into.
    list_area: Option<Rect>,
    /// Row keys of the last render, top to bottom, in content coordinates.
    rows: Vec<FocusKey>,
    scrolls: bool,
}

impl SidePanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.area
            .is_some_and(|area| area.contains(Position::new(column, row)))
    }

    /// The row under a screen position, if any.
    pub fn hit(&self, column: u16, row: u16) -> Option<FocusKey> {
        let list = self.list_area?;
        if !list.contains(Position::new(column, row)) {
            return None;
        }
        let offset = if self.scrolls {
            self.scroll_state.offset().y
        } else {
            0
        };
        let index = usize::from(row - list.y + offset);
        self.rows.get(index).cloned()
    }

    /// Forget the last render (the panel is not on screen).
    pub fn clear(&mut self) {
        self.area = None;
        self.list_area = None;
        self.rows.clear();
    }

    fn keep_visible(&mut self, index: usize, height: u16) {
        let index = u16::try_from(index).unwrap_or(u16::MAX);
        let current = self.scroll_state.offset();
        let y = if index < current.y {
            index
        } else if height > 0 && index >= current.y + height {
            index + 1 - height
        } else {
            return;
        };
        self.scroll_state.set_offset(Position { x: current.x, y });
    }
}

/// Transient render wrapper for the navigation panel.
pub struct SidePanel<'a> {
    tree: &'a NavigationTree,
    mode: PanelMode,
    state: &'a mut SidePanelState,
}

impl<'a> SidePanel<'a> {
    pub fn new(tree: &'a NavigationTree, mode: PanelMode, state: &'a mut SidePanelState) -> Self {
        Self { tree, mode, state }
    }

    fn render_full(&mut self, frame: &mut Frame, area: Rect) {
        let border_color = match self.mode {
            PanelMode::Overlay => Color::Cyan,
            _ => Color::DarkGray,
        };
        let block = Block::bordered()
            .title(" Navigation ")
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = self.tree.visible_rows();
        let content_width = inner.width.saturating_sub(1);
        let content_height = u16::try_from(rows.len()).unwrap_or(u16::MAX);

        if let Some(focused) = rows.iter().position(|r| r.focused) {
            self.state.keep_visible(focused, inner.height);
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, content_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for (y, row) in rows.iter().enumerate() {
            let y = u16::try_from(y).unwrap_or(u16::MAX);
            let line = row_line(row, usize::from(content_width));
            scroll_view.render_widget(Paragraph::new(line), Rect::new(0, y, content_width, 1));
        }
        frame.render_stateful_widget(scroll_view, inner, &mut self.state.scroll_state);

        self.state.rows = rows.into_iter().map(|r| r.key).collect();
        self.state.list_area = Some(inner);
        self.state.scrolls = true;
    }

    fn render_rail(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered().border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows: Vec<TreeRow<'_>> = self
            .tree
            .visible_rows()
            .into_iter()
            .filter(|r| r.depth == 0)
            .take(usize::from(inner.height))
            .collect();

        let lines: Vec<Line> = rows
            .iter()
            .map(|row| {
                let glyph = match row.key {
                    FocusKey::Section(_) => "─".to_string(),
                    FocusKey::Item(_) => rail_glyph(row),
                };
                let mut style = Style::default();
                if row.active {
                    style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
                }
                if row.focused {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Line::from(Span::styled(glyph, style)).centered()
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);

        self.state.rows = rows.into_iter().map(|r| r.key).collect();
        self.state.list_area = Some(inner);
        self.state.scrolls = false;
    }
}

impl Component for SidePanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        match self.mode {
            PanelMode::Full => self.render_full(frame, area),
            PanelMode::Overlay => {
                frame.render_widget(Clear, area);
                self.render_full(frame, area);
            }
            PanelMode::Rail => self.render_rail(frame, area),
        }
        self.state.area = Some(area);
    }
}

fn row_line(row: &TreeRow<'_>, width: usize) -> Line<'static> {
    let chevron = match (row.has_children, row.expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        (false, _) => "  ",
    };

    let (text, mut style) = match row.key {
        FocusKey::Section(_) => (
            format!("{chevron}{}", row.label.to_uppercase()),
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        ),
        FocusKey::Item(_) => {
            let indent = "  ".repeat(row.depth + 1);
            let icon = row.icon.map(|i| format!("{i} ")).unwrap_or_default();
            (format!("{indent}{chevron}{icon}{}", row.label), Style::default())
        }
    };

    if row.active {
        style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
    }
    if row.focused {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Line::from(Span::styled(truncate_to_width(&text, width), style))
}

/// Icon if the item has one, otherwise its first letter.
fn rail_glyph(row: &TreeRow<'_>) -> String {
    match row.icon {
        Some(icon) => icon.to_string(),
        None => row
            .label
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default(),
    }
}

/// Cut `s` to at most `max_width` display columns, ending in "…" if cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
