//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: the top chrome line (hidden by scroll auto-hide)
//!
//! ### Stateful Components
//!
//! Persistent state lives in `TuiState`; a transient wrapper borrows it for
//! one frame and records hit regions for the next round of input:
//! - `SidePanel` / `SidePanelState`: full panel, icon rail or hover overlay
//! - `OverflowSheet` / `OverflowSheetState`: mobile bottom sheet
//!
//! ### Event-Driven Components
//!
//! - `NotesInput`: text entry that swallows the panel shortcut
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs             (this file)
//! ├── title_bar.rs       (top chrome)
//! ├── side_panel.rs      (desktop panel and rail)
//! ├── overflow_sheet.rs  (mobile sheet)
//! └── notes.rs           (text entry)
//! ```

pub mod notes;
pub mod overflow_sheet;
pub mod side_panel;
pub mod title_bar;

pub use notes::{NotesEvent, NotesInput};
pub use overflow_sheet::{OverflowSheet, OverflowSheetState, SheetHit};
pub use side_panel::{PanelMode, SidePanel, SidePanelState};
pub use title_bar::TitleBar;
