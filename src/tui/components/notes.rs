//! # Notes Component
//!
//! A single-line text field under the content area. While it has focus,
//! every printable key is text: the panel shortcut is reported to the
//! disclosure controller as typed inside a text entry and does nothing.
//!
//! `Tab` focuses the field, `Esc` hands focus back to navigation.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// High-level events emitted by the notes field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesEvent {
    /// Esc: return focus to navigation
    Leave,
    /// A character was inserted
    Typed(char),
    /// Enter: the line is kept as the last note and the buffer cleared
    Saved(String),
    Erased,
}

/// Text entry field.
///
/// # Props
///
/// - `focused`: whether keystrokes are routed here (from `TuiState::input_mode`)
pub struct NotesInput {
    pub buffer: String,
    pub focused: bool,
}

impl NotesInput {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            focused: false,
        }
    }

    /// Display column of the cursor, relative to the text start.
    fn cursor_column(&self) -> u16 {
        u16::try_from(self.buffer.width()).unwrap_or(u16::MAX)
    }
}

impl Default for NotesInput {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for NotesInput {
    type Event = NotesEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<NotesEvent> {
        match event {
            TuiEvent::Escape => Some(NotesEvent::Leave),
            TuiEvent::InputChar(c) => {
                self.buffer.push(*c);
                Some(NotesEvent::Typed(*c))
            }
            TuiEvent::Backspace => self.buffer.pop().map(|_| NotesEvent::Erased),
            TuiEvent::Submit if !self.buffer.is_empty() => {
                Some(NotesEvent::Saved(std::mem::take(&mut self.buffer)))
            }
            _ => None,
        }
    }
}

impl Component for NotesInput {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let hint = if self.focused { " Esc to leave " } else { " Tab to type " };
        let block = Block::bordered()
            .title(" Notes ")
            .title_bottom(hint)
            .border_style(border_style);

        let text_style = if self.focused {
            Style::default()
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };

        // Keep the tail visible when the text outgrows the field
        let inner_width = area.width.saturating_sub(2);
        let cursor = self.cursor_column();
        let scroll = cursor.saturating_sub(inner_width.saturating_sub(1));

        let paragraph = Paragraph::new(self.buffer.as_str())
            .style(text_style)
            .scroll((0, scroll))
            .block(block);
        frame.render_widget(paragraph, area);

        if self.focused && area.height > 2 {
            frame.set_cursor_position(Position::new(area.x + 1 + cursor - scroll, area.y + 1));
        }
    }
}
