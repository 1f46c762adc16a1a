use crate::core::disclosure::{ChromeVisibility, DisclosureState, Ownership};
use crate::core::nav::FocusKey;
use crate::core::state::App;
use crate::core::viewport::ViewportClass;
use crate::tui::component::Component;
use crate::tui::components::overflow_sheet::sheet_rows;
use crate::tui::components::side_panel::{PANEL_WIDTH, RAIL_WIDTH};
use crate::tui::components::{OverflowSheet, PanelMode, SheetHit, SidePanel, TitleBar};
use crate::tui::{InputMode, PX_PER_ROW, TuiState};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

/// Lines of placeholder page content behind the chrome.
pub const CONTENT_LINES: u16 = 120;

const NOTES_HEIGHT: u16 = 3;

const FILLER: &[&str] = &[
    "Scroll down to tuck the title bar away; scroll up to bring it back.",
    "Hover the rail to preview the panel without committing to it.",
    "Selecting from the sheet's overflow promotes the item to the resting row.",
    "Focus travels across sections, skipping over collapsed ones.",
];

/// How the panel shows for a viewport class and disclosure state.
///
/// Mobile has no rail: the panel is either a drawer over the content or
/// absent, and the bottom sheet takes over navigation.
pub fn panel_mode(class: ViewportClass, state: DisclosureState) -> Option<PanelMode> {
    match (class, state) {
        (ViewportClass::Desktop, DisclosureState::Expanded) => Some(PanelMode::Full),
        (ViewportClass::Desktop, DisclosureState::Intermediate) => Some(PanelMode::Overlay),
        (ViewportClass::Desktop, DisclosureState::Collapsed) => Some(PanelMode::Rail),
        (ViewportClass::Mobile, DisclosureState::Expanded) => Some(PanelMode::Overlay),
        (ViewportClass::Mobile, _) => None,
    }
}

/// Where everything goes for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenLayout {
    pub title: Option<Rect>,
    pub panel: Option<(Rect, PanelMode)>,
    pub content: Rect,
    pub notes: Rect,
    pub sheet: Option<Rect>,
    pub status: Rect,
}

pub fn compute_layout(area: Rect, app: &App) -> ScreenLayout {
    use Constraint::{Length, Min};

    let title_height = match app.disclosure.chrome_visibility() {
        ChromeVisibility::Visible => 1,
        ChromeVisibility::Hidden => 0,
    };
    let [title_area, body, status] =
        Layout::vertical([Length(title_height), Min(0), Length(1)]).areas(area);
    let title = (title_height > 0).then_some(title_area);

    let class = app.viewport_class();
    let mode = panel_mode(class, app.disclosure.state());

    let (main, panel, sheet) = match class {
        ViewportClass::Desktop => {
            let reserved = match mode {
                Some(PanelMode::Full) => PANEL_WIDTH,
                Some(_) => RAIL_WIDTH,
                None => 0,
            };
            let [panel_area, main] = Layout::horizontal([Length(reserved), Min(0)]).areas(body);
            let panel = mode.map(|mode| {
                let rect = match mode {
                    PanelMode::Overlay => Rect {
                        width: PANEL_WIDTH.min(body.width),
                        ..panel_area
                    },
                    _ => panel_area,
                };
                (rect, mode)
            });
            (main, panel, None)
        }
        ViewportClass::Mobile => {
            let rows = sheet_rows(&app.overflow, PX_PER_ROW as f32).min(body.height);
            let [main, sheet] = Layout::vertical([Min(0), Length(rows)]).areas(body);
            let panel = mode.map(|mode| {
                let rect = Rect {
                    width: PANEL_WIDTH.min(main.width),
                    ..main
                };
                (rect, mode)
            });
            (main, panel, Some(sheet))
        }
    };

    let [content, notes] = Layout::vertical([Min(0), Length(NOTES_HEIGHT)]).areas(main);

    ScreenLayout {
        title,
        panel,
        content,
        notes,
        sheet,
        status,
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    let layout = compute_layout(frame.area(), app);

    if let Some(title_area) = layout.title {
        let mut title_bar = TitleBar::new(
            app.location.clone(),
            app.disclosure.state().label(),
            app.disclosure.ownership() == Ownership::Controlled,
        );
        title_bar.render(frame, title_area);
    }

    draw_content(frame, layout.content, app, tui);

    tui.notes.focused = tui.input_mode == InputMode::Notes;
    tui.notes.render(frame, layout.notes);

    draw_status(frame, layout.status, app, tui);

    match layout.sheet {
        Some(sheet_area) => {
            OverflowSheet::new(&app.overflow, &app.tree, &mut tui.sheet).render(frame, sheet_area);
        }
        None => tui.sheet.clear(),
    }

    // Drawn last: the overlay sits on top of the content and the sheet
    match layout.panel {
        Some((panel_area, mode)) => {
            SidePanel::new(&app.tree, mode, &mut tui.panel).render(frame, panel_area);
        }
        None => tui.panel.clear(),
    }
}

fn draw_content(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    tui.content_height = area.height;

    let heading = match &app.location {
        Some(location) => format!("You are at {location}"),
        None => "Nothing selected yet".to_string(),
    };
    let mut lines = vec![
        Line::from(Span::styled(heading, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];
    if let Some(note) = &tui.last_note {
        lines.push(Line::from(Span::styled(
            format!("Last note: {note}"),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(""));
    }
    let remaining = usize::from(CONTENT_LINES).saturating_sub(lines.len());
    lines.extend((0..remaining).map(|n| {
        Line::from(Span::styled(
            format!("{:>3}  {}", n + 1, FILLER[n % FILLER.len()]),
            Style::default().fg(Color::Gray),
        ))
    }));

    let paragraph = Paragraph::new(lines).scroll((tui.content_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App, tui: &TuiState) {
    let hints = match tui.input_mode {
        InputMode::Notes => "Esc leave notes".to_string(),
        InputMode::Navigation if app.viewport.is_compact() => "←→ Enter m q".to_string(),
        InputMode::Navigation if app.viewport_class().is_mobile() && !app.disclosure.is_open() => {
            "←→ move  Enter select  ↑↓ sheet  m more  Ctrl+B panel  Tab notes  q quit".to_string()
        }
        InputMode::Navigation => format!(
            "{} toggle  ↑↓←→ navigate  Enter open  Tab notes  q quit",
            app.disclosure.config().shortcut
        ),
    };
    let line = Line::from(vec![
        Span::styled(
            app.status_message.clone(),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(line, area);
}

/// What sits under the pointer, topmost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Panel(Option<FocusKey>),
    Sheet(Option<SheetHit>),
    Elsewhere,
}

/// Hit test against the regions recorded by the last `draw_ui`.
pub fn hit_test(tui: &TuiState, column: u16, row: u16) -> Hit {
    if tui.panel.contains(column, row) {
        return Hit::Panel(tui.panel.hit(column, row));
    }
    if tui.sheet.contains(column, row) {
        return Hit::Sheet(tui.sheet.hit(column, row));
    }
    Hit::Elsewhere
}
