//! # Views
//!
//! The four screens. Each is built with everything it needs passed through
//! its constructor; there is no global "current file" or "current request".
//!
//! ```text
//! views/
//! ├── file_select.rs     (discovered files, hands a path onward)
//! ├── request_select.rs  (requests parsed from one file)
//! ├── inspector/         (mode state machine over one request)
//! └── text_editor.rs     (KEY=VALUE environment editor)
//! ```

pub mod file_select;
pub mod inspector;
pub mod request_select;
pub mod text_editor;

pub use file_select::FileSelectView;
pub use inspector::RequestInspector;
pub use request_select::RequestSelectView;
pub use text_editor::TextEditorView;

use std::rc::Rc;

use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::config::ResolvedConfig;
use crate::core::context::Context;
use crate::tui::clipboard::Clipboard;

/// Syntect theme names per kind of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Themes {
    pub request: String,
    pub response: String,
    pub script: String,
}

impl Themes {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            request: config.request_theme.clone(),
            response: config.response_theme.clone(),
            script: config.script_theme.clone(),
        }
    }
}

/// Collaborators handed down from view to view.
#[derive(Clone)]
pub struct Services {
    pub ctx: Context,
    pub clipboard: Rc<dyn Clipboard>,
    pub themes: Themes,
    pub case_sensitive: bool,
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
