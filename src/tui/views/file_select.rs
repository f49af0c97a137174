//! # FileSelectView
//!
//! The first screen: every discovered request file in a fuzzy-filtered list.
//! Choosing one hands the entry to `on_select` along with a handle to this
//! view, which becomes the next screen's predecessor.
//!
//! If `on_select` fails (the file does not parse), this view stays mounted
//! and shows the error on its status line.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{info, warn};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;

use crate::core::discovery::FileEntry;
use crate::engine::EngineError;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::filter_list::{FilterEvent, FuzzyFilterList, Labeled};
use crate::tui::event::TuiEvent;
use crate::tui::view::{Host, View, ViewRef};

use super::centered_rect;

/// Called with the chosen file and this view as the predecessor.
pub type FileSelected = Box<dyn FnMut(&FileEntry, ViewRef, &mut Host) -> Result<(), EngineError>>;

impl Labeled for FileEntry {
    fn label(&self) -> String {
        self.display.clone()
    }
}

pub struct FileSelectView {
    this: Weak<RefCell<FileSelectView>>,
    list: FuzzyFilterList<FileEntry>,
    status: Option<String>,
    on_select: FileSelected,
}

impl FileSelectView {
    pub fn new(
        files: Vec<FileEntry>,
        case_sensitive: bool,
        on_select: FileSelected,
    ) -> Rc<RefCell<Self>> {
        let mut list = FuzzyFilterList::new("Select File", case_sensitive);
        list.load(files);
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                this: this.clone(),
                list,
                status: None,
                on_select,
            })
        })
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn list(&self) -> &FuzzyFilterList<FileEntry> {
        &self.list
    }

    fn choose(&mut self, entry: FileEntry, host: &mut Host) {
        let Some(this) = self.this.upgrade() else {
            return;
        };
        info!("Selected file: {}", entry.display);
        self.status = None;
        if let Err(e) = (self.on_select)(&entry, this, host) {
            warn!("Could not open {}: {e}", entry.path.display());
            self.status = Some(format!("Could not open {}: {e}", entry.display));
        }
    }
}

impl View for FileSelectView {
    fn name(&self) -> &'static str {
        "file-select"
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = centered_rect(90, 90, frame.area());
        let [list_area, status_area] =
            Layout::vertical([Constraint::Min(6), Constraint::Length(1)]).areas(area);

        self.list.render(frame, list_area);

        let status = match self.status {
            Some(ref msg) => Paragraph::new(msg.as_str()).style(Style::default().fg(Color::Red)),
            None => Paragraph::new(format!("{} files", self.list.len()))
                .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(status, status_area);
    }

    fn handle_event(&mut self, event: &TuiEvent, host: &mut Host) {
        match self.list.handle_event(event) {
            Some(FilterEvent::Selected(entry)) => self.choose(entry, host),
            // Nothing to go back to
            Some(FilterEvent::Dismiss) => {}
            None => {}
        }
    }
}
