//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the chrome,
//! and translates terminal events into core `Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Logical Pixels
//!
//! The core thinks in logical px (breakpoints, snap heights, scroll
//! thresholds). The terminal is mapped at a fixed cell size of
//! [`PX_PER_COLUMN`] × [`PX_PER_ROW`], so a 128-column terminal sits exactly
//! on the desktop breakpoint.
//!
//! ## Controlled Mode
//!
//! With `--controlled`, the run loop plays the owner: every
//! `Effect::OpenChangeRequested` is answered with `Action::OwnerDecided`,
//! which is the round trip an embedding host would perform.
//!
//! ## Redraw Strategy
//!
//! Nothing animates, so the loop sleeps up to 500ms and only redraws after
//! events. All pending events are drained before the next draw.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info};
use std::io::stdout;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::nav::{FocusKey, Section};
use crate::core::state::App;
use crate::core::tree::TreeKey;
use crate::core::viewport::Viewport;
use crate::tui::component::EventHandler;
use crate::tui::components::overflow_sheet::visible_keys;
use crate::tui::components::{NotesEvent, NotesInput, OverflowSheetState, SheetHit, SidePanelState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::ui::{CONTENT_LINES, Hit};

pub const PX_PER_COLUMN: u32 = 8;
pub const PX_PER_ROW: u32 = 16;

/// Rows moved per page scroll.
const PAGE_ROWS: u16 = 10;

pub fn viewport_from_cells(columns: u16, rows: u16) -> Viewport {
    Viewport::new(u32::from(columns) * PX_PER_COLUMN, u32::from(rows) * PX_PER_ROW)
}

/// Where keystrokes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys drive the panel, the tree and the sheet.
    Navigation,
    /// Keys are text for the notes field. Esc switches back.
    Notes,
}

/// TUI-specific presentation state (not part of core navigation logic)
pub struct TuiState {
    pub input_mode: InputMode,
    pub notes: NotesInput,
    pub last_note: Option<String>,
    // Persistent component states
    pub panel: SidePanelState,
    pub sheet: OverflowSheetState,
    // Page content scroll, in rows
    pub content_scroll: u16,
    pub content_height: u16,
    // Whether the pointer was over the panel on the last move
    pub pointer_inside: bool,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            input_mode: InputMode::Navigation,
            notes: NotesInput::new(),
            last_note: None,
            panel: SidePanelState::new(),
            sheet: OverflowSheetState::new(),
            content_scroll: 0,
            content_height: 0,
            pointer_inside: false,
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Mouse capture reports motion too, which drives the hover preview
        execute!(stdout(), EnableMouseCapture)?;
        info!("Terminal modes enabled (mouse capture)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture);
    }
}

pub fn run(config: ResolvedConfig, sections: Vec<Section>) -> std::io::Result<()> {
    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let size = terminal.size()?;
    let mut app = App::new(config, sections, viewport_from_cells(size.width, size.height));
    let mut tui = TuiState::new();
    info!(
        "Mounted at {}x{} cells ({:?}), store {}",
        size.width,
        size.height,
        app.viewport_class(),
        app.store.instance_id()
    );

    let mut needs_redraw = true; // Force first frame

    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(std::time::Duration::from_millis(500));
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(&mut app, &mut tui, event) {
                should_quit = true;
                break;
            }
        }

        if should_quit {
            break;
        }
    }

    ratatui::restore();
    Ok(())
}

/// Run an action through the reducer and carry out its effects.
/// Returns `true` when the app should quit.
fn dispatch(app: &mut App, action: Action) -> bool {
    let mut pending = Some(action);
    while let Some(action) = pending.take() {
        match update(app, action) {
            Effect::None => {}
            Effect::Quit => return true,
            Effect::OpenChangeRequested(open) => {
                // This host accepts every request it receives
                debug!("Owner accepting open={open}");
                pending = Some(Action::OwnerDecided(open));
            }
            Effect::Navigate(href) => info!("Location is now {href}"),
            Effect::Activated(key) => debug!("Activated {key} (no href)"),
        }
    }
    false
}

/// Translate one terminal event. Returns `true` when the app should quit.
fn handle_event(app: &mut App, tui: &mut TuiState, event: TuiEvent) -> bool {
    // Mode-independent events first
    match event {
        TuiEvent::ForceQuit => return dispatch(app, Action::Quit),
        TuiEvent::TogglePanel => return dispatch(app, Action::TogglePanel),
        TuiEvent::Resize(columns, rows) => {
            return dispatch(app, Action::Resize(viewport_from_cells(columns, rows)));
        }
        TuiEvent::MouseMove(column, row) => {
            pointer_moved(app, tui, column, row);
            return false;
        }
        TuiEvent::MouseClick(column, row) => return pointer_clicked(app, tui, column, row),
        TuiEvent::ScrollUp => return scroll_content(app, tui, -1),
        TuiEvent::ScrollDown => return scroll_content(app, tui, 1),
        TuiEvent::ScrollPageUp => return scroll_content(app, tui, -i32::from(PAGE_ROWS)),
        TuiEvent::ScrollPageDown => return scroll_content(app, tui, i32::from(PAGE_ROWS)),
        _ => {}
    }

    match tui.input_mode {
        InputMode::Notes => {
            // The controller still sees the key, flagged as text entry
            if let TuiEvent::InputChar(key) = event {
                dispatch(
                    app,
                    Action::KeyShortcut {
                        key,
                        in_text_entry: true,
                    },
                );
            }
            match tui.notes.handle_event(&event) {
                Some(NotesEvent::Leave) => tui.input_mode = InputMode::Navigation,
                Some(NotesEvent::Saved(text)) => {
                    app.status_message = "Note saved".to_string();
                    tui.last_note = Some(text);
                }
                Some(NotesEvent::Typed(_) | NotesEvent::Erased) | None => {}
            }
            false
        }
        InputMode::Navigation => {
            match event {
                TuiEvent::InputChar('q') => return dispatch(app, Action::Quit),
                TuiEvent::FocusNotes => {
                    tui.input_mode = InputMode::Notes;
                    return false;
                }
                TuiEvent::InputChar(key) if key == app.disclosure.config().shortcut => {
                    return dispatch(
                        app,
                        Action::KeyShortcut {
                            key,
                            in_text_entry: false,
                        },
                    );
                }
                _ => {}
            }
            if app.viewport_class().is_mobile() && !app.disclosure.is_open() {
                sheet_key(app, tui, event)
            } else {
                tree_key(app, event)
            }
        }
    }
}

fn tree_key(app: &mut App, event: TuiEvent) -> bool {
    let key = match event {
        TuiEvent::CursorUp => TreeKey::Up,
        TuiEvent::CursorDown => TreeKey::Down,
        TuiEvent::CursorLeft => TreeKey::Left,
        TuiEvent::CursorRight => TreeKey::Right,
        TuiEvent::Home => TreeKey::Home,
        TuiEvent::Submit => TreeKey::Enter,
        TuiEvent::InputChar(' ') => TreeKey::Space,
        _ => return false,
    };
    dispatch(app, Action::Tree(key))
}

fn sheet_key(app: &mut App, tui: &mut TuiState, event: TuiEvent) -> bool {
    let visible = visible_keys(&app.overflow);
    match event {
        TuiEvent::CursorLeft => tui.sheet.move_cursor(-1, visible.len()),
        TuiEvent::CursorRight => tui.sheet.move_cursor(1, visible.len()),
        TuiEvent::CursorUp => {
            let last = app.overflow.snap_points().len().saturating_sub(1);
            return dispatch(app, Action::SnapTo(last));
        }
        TuiEvent::CursorDown => return dispatch(app, Action::SnapTo(0)),
        TuiEvent::InputChar('m') => return dispatch(app, Action::ToggleMore),
        TuiEvent::Escape => return dispatch(app, Action::SheetOpenChanged(false)),
        TuiEvent::Submit | TuiEvent::InputChar(' ') => {
            if let Some(key) = visible.get(tui.sheet.cursor).cloned() {
                return dispatch(app, Action::SelectCompact(key));
            }
        }
        _ => {}
    }
    false
}

fn pointer_moved(app: &mut App, tui: &mut TuiState, column: u16, row: u16) {
    let inside = matches!(ui::hit_test(tui, column, row), Hit::Panel(_));
    if inside == tui.pointer_inside {
        return;
    }
    tui.pointer_inside = inside;
    let action = if inside {
        Action::PointerEnter
    } else {
        Action::PointerLeave
    };
    dispatch(app, action);
}

fn pointer_clicked(app: &mut App, tui: &mut TuiState, column: u16, row: u16) -> bool {
    match ui::hit_test(tui, column, row) {
        Hit::Panel(Some(FocusKey::Item(path))) => {
            app.tree.focus(&FocusKey::Item(path.clone()));
            dispatch(app, Action::ActivateItem(path))
        }
        Hit::Panel(Some(header @ FocusKey::Section(_))) => {
            app.tree.focus(&header);
            dispatch(app, Action::Tree(TreeKey::Enter))
        }
        Hit::Sheet(Some(SheetHit::Item(key))) => dispatch(app, Action::SelectCompact(key)),
        Hit::Sheet(Some(SheetHit::More)) => dispatch(app, Action::ToggleMore),
        Hit::Panel(None) | Hit::Sheet(None) | Hit::Elsewhere => false,
    }
}

fn scroll_content(app: &mut App, tui: &mut TuiState, delta: i32) -> bool {
    let max = CONTENT_LINES.saturating_sub(tui.content_height);
    let target = (i32::from(tui.content_scroll) + delta).clamp(0, i32::from(max));
    let target = u16::try_from(target).unwrap_or(max);
    if target == tui.content_scroll {
        return false;
    }
    tui.content_scroll = target;
    dispatch(app, Action::Scroll(u32::from(target) * PX_PER_ROW))
}
