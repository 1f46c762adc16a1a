//! # TitleBar Component
//!
//! The top chrome: one line with the application name, the current
//! location and the panel state. It is the chrome that auto-hides on
//! downward content scroll; the layout simply allocates no row for it
//! while hidden, so the component itself never sees the visibility flag.
//!
//! ## Conditional Formatting
//!
//! 1. **Location known**: `"navchrome | /inbox | panel: expanded"`
//! 2. **No location yet**: `"navchrome | panel: expanded"`
//!
//! Purely presentational, like the status line beneath the content.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Top chrome line.
///
/// # Props
///
/// - `location`: last href navigated to, if any
/// - `panel_state`: label of the disclosure state (e.g. "collapsed")
/// - `controlled`: whether the open flag is owned by the host
pub struct TitleBar {
    pub location: Option<String>,
    pub panel_state: &'static str,
    pub controlled: bool,
}

impl TitleBar {
    pub fn new(location: Option<String>, panel_state: &'static str, controlled: bool) -> Self {
        Self {
            location,
            panel_state,
            controlled,
        }
    }

    fn text(&self) -> String {
        let owner = if self.controlled { " (controlled)" } else { "" };
        match &self.location {
            Some(location) => format!(
                "navchrome | {location} | panel: {}{owner}",
                self.panel_state
            ),
            None => format!("navchrome | panel: {}{owner}", self.panel_state),
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(Span::styled(
            self.text(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(line, area);
    }
}
