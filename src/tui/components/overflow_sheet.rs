//! # OverflowSheet Component
//!
//! The mobile navigation surface: a bottom sheet resting at its collapsed
//! snap point with the primary row and a "More" control, and the secondary
//! rows revealed when it sits at the expanded snap point.
//!
//! ```text
//!  ─ Navigation ──────────────────────────────
//!  ┌──────┐┌──────┐┌──────┐┌──────┐┌──────┐
//!  │  X1  ││  X2  ││  X3  ││  X4  ││More ▴│
//!  └──────┘└──────┘└──────┘└──────┘└──────┘
//!  ┌──────┐┌──────┐┌──────┐
//!  │  X5  ││  X6  ││  X7  │    (fillers)
//!  └──────┘└──────┘└──────┘
//! ```
//!
//! The sheet height in rows comes from the active snap point, so the
//! terminal shows exactly what the logical layout computed.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::core::nav::ItemKey;
use crate::core::overflow::{OverflowLayout, Slot};
use crate::core::tree::NavigationTree;
use crate::tui::component::Component;
use crate::tui::components::side_panel::truncate_to_width;

/// Terminal rows per slot: a bordered single line.
const SLOT_ROWS: u16 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetHit {
    Item(ItemKey),
    More,
}

/// Persistent sheet state: keyboard cursor and hit regions.
#[derive(Default)]
pub struct OverflowSheetState {
    /// Index into [`visible_keys`].
    pub cursor: usize,
    pub area: Option<Rect>,
    slots: Vec<(Rect, ItemKey)>,
    more: Option<Rect>,
}

impl OverflowSheetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.area
            .is_some_and(|area| area.contains(Position::new(column, row)))
    }

    pub fn hit(&self, column: u16, row: u16) -> Option<SheetHit> {
        let position = Position::new(column, row);
        if self.more.is_some_and(|r| r.contains(position)) {
            return Some(SheetHit::More);
        }
        self.slots
            .iter()
            .find(|(rect, _)| rect.contains(position))
            .map(|(_, key)| SheetHit::Item(key.clone()))
    }

    /// Move the cursor, clamped to the visible slots.
    pub fn move_cursor(&mut self, delta: isize, visible: usize) {
        let last = visible.saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn clear(&mut self) {
        self.area = None;
        self.slots.clear();
        self.more = None;
    }
}

/// Items reachable on screen: the primary row, plus the overflow while
/// the sheet is expanded.
pub fn visible_keys(layout: &OverflowLayout) -> Vec<ItemKey> {
    let partition = layout.partition();
    let mut keys = partition.primary.clone();
    if layout.is_expanded() {
        keys.extend(partition.secondary.iter().cloned());
    }
    keys
}

/// Rows needed to show the active snap point.
pub fn sheet_rows(layout: &OverflowLayout, px_per_row: f32) -> u16 {
    let rows = (layout.active_snap_height() / px_per_row).ceil();
    // Float-to-int `as` saturates
    rows as u16
}

/// Transient render wrapper for the bottom sheet.
pub struct OverflowSheet<'a> {
    layout: &'a OverflowLayout,
    tree: &'a NavigationTree,
    state: &'a mut OverflowSheetState,
}

impl<'a> OverflowSheet<'a> {
    pub fn new(
        layout: &'a OverflowLayout,
        tree: &'a NavigationTree,
        state: &'a mut OverflowSheetState,
    ) -> Self {
        Self {
            layout,
            tree,
            state,
        }
    }

    fn columns(&self, row: Rect) -> Vec<Rect> {
        let capacity = self.layout.config().capacity.max(1);
        let ratio = u32::try_from(capacity).unwrap_or(u32::MAX);
        Layout::horizontal(vec![Constraint::Ratio(1, ratio); capacity])
            .split(row)
            .to_vec()
    }

    fn render_slot(&mut self, frame: &mut Frame, rect: Rect, key: &ItemKey, cursor: bool) {
        let label = self
            .tree
            .item(key)
            .map(|item| match &item.icon {
                Some(icon) => format!("{icon} {}", item.label),
                None => item.label.clone(),
            })
            .unwrap_or_default();

        let active = self.tree.is_active(key);
        let border = if cursor {
            Style::default().fg(Color::Cyan)
        } else if active {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let text = if active {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let width = usize::from(rect.width.saturating_sub(2));
        let paragraph = Paragraph::new(Line::from(truncate_to_width(&label, width)).centered())
            .style(text)
            .block(Block::bordered().border_style(border));
        frame.render_widget(paragraph, rect);
        self.state.slots.push((rect, key.clone()));
    }
}

impl Component for OverflowSheet<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.clear();
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Navigation ");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.state.area = Some(area);

        let layout = self.layout;
        let visible = visible_keys(layout);
        self.state.cursor = self.state.cursor.min(visible.len().saturating_sub(1));
        let cursor_key = visible.get(self.state.cursor).cloned();

        // Primary row
        let primary_row = Rect {
            height: SLOT_ROWS.min(inner.height),
            ..inner
        };
        let columns = self.columns(primary_row);
        let partition = layout.partition();
        for (key, rect) in partition.primary.iter().zip(&columns) {
            let is_cursor = cursor_key.as_ref() == Some(key);
            self.render_slot(frame, *rect, key, is_cursor);
        }
        if partition.has_overflow
            && let Some(rect) = columns.last().copied()
        {
            let arrow = if layout.is_expanded() { "▾" } else { "▴" };
            let more = Paragraph::new(Line::from(format!("More {arrow}")).centered())
                .block(Block::bordered().border_style(Style::default().fg(Color::Gray)));
            frame.render_widget(more, rect);
            self.state.more = Some(rect);
        }

        if !layout.is_expanded() {
            return;
        }

        // Secondary rows, one row gap apart, clipped to the sheet
        let bottom = inner.y + inner.height;
        let mut y = inner.y + SLOT_ROWS + 1;
        for row in layout.rows() {
            if y + SLOT_ROWS > bottom {
                break;
            }
            let columns = self.columns(Rect {
                y,
                height: SLOT_ROWS,
                ..inner
            });
            for (slot, rect) in row.iter().zip(&columns) {
                if let Slot::Item(key) = slot {
                    let is_cursor = cursor_key.as_ref() == Some(key);
                    self.render_slot(frame, *rect, key, is_cursor);
                }
            }
            y += SLOT_ROWS + 1;
        }
    }
}
