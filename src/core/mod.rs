//! # Core Navigation Logic
//!
//! Adaptive navigation chrome: the disclosure state of the side panel, the
//! mobile overflow sheet, and the keyboard-navigable tree. It knows nothing
//! about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                                ▼
//!                         ┌────────────┐
//!                         │    TUI     │
//!                         │  Adapter   │
//!                         │ (ratatui)  │
//!                         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all navigation state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`disclosure`]: Panel expanded / intermediate / collapsed, plus chrome auto-hide
//! - [`overflow`]: Mobile partition, snap points and the sheet contract
//! - [`tree`]: Expansion, active item and keyboard traversal
//! - [`store`]: Shared active-item and focus registry
//! - [`nav`]: Node model, paths and tree files
//! - [`viewport`]: Breakpoints
//! - [`config`]: Settings hierarchy

pub mod action;
pub mod config;
pub mod disclosure;
pub mod nav;
pub mod overflow;
pub mod state;
pub mod store;
pub mod tree;
pub mod viewport;
