//! # RequestSelectView
//!
//! Lists the requests parsed from one file. Escape backs out to the view it
//! was opened from; choosing a request hands it to `on_select` with this view
//! as the predecessor.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use log::{info, warn};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;

use crate::engine::{EngineError, Request, RequestEngine};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::filter_list::{FilterEvent, FuzzyFilterList, Labeled};
use crate::tui::event::TuiEvent;
use crate::tui::view::{Host, View, ViewRef};

use super::centered_rect;

/// Called with the chosen request and this view as the predecessor.
pub type RequestSelected = Box<dyn FnMut(Request, ViewRef, &mut Host)>;

impl Labeled for Request {
    fn label(&self) -> String {
        self.display_name()
    }
}

pub struct RequestSelectView {
    this: Weak<RefCell<RequestSelectView>>,
    previous: ViewRef,
    path: PathBuf,
    list: FuzzyFilterList<Request>,
    on_select: RequestSelected,
}

impl RequestSelectView {
    /// Parse `path` and build the view. Does not mount anything.
    pub fn load(
        path: &Path,
        engine: &dyn RequestEngine,
        previous: ViewRef,
        case_sensitive: bool,
        on_select: RequestSelected,
    ) -> Result<Rc<RefCell<Self>>, EngineError> {
        let requests = engine.parse_file(path)?;
        info!("Parsed {} requests from {}", requests.len(), path.display());

        let mut list = FuzzyFilterList::new("Select Request", case_sensitive);
        list.load(requests);
        Ok(Rc::new_cyclic(|this| {
            RefCell::new(Self {
                this: this.clone(),
                previous,
                path: path.to_path_buf(),
                list,
                on_select,
            })
        }))
    }

    /// Load and mount. On failure the predecessor is mounted instead and the
    /// error is returned to the caller.
    pub fn open(
        path: &Path,
        engine: &dyn RequestEngine,
        previous: ViewRef,
        case_sensitive: bool,
        on_select: RequestSelected,
        host: &mut Host,
    ) -> Result<(), EngineError> {
        match Self::load(path, engine, Rc::clone(&previous), case_sensitive, on_select) {
            Ok(view) => {
                host.mount(view);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to parse {}: {e}", path.display());
                host.mount(previous);
                Err(e)
            }
        }
    }

    pub fn list(&self) -> &FuzzyFilterList<Request> {
        &self.list
    }
}

impl View for RequestSelectView {
    fn name(&self) -> &'static str {
        "request-select"
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = centered_rect(90, 90, frame.area());
        let [list_area, path_area] =
            Layout::vertical([Constraint::Min(6), Constraint::Length(1)]).areas(area);

        self.list.render(frame, list_area);
        frame.render_widget(
            Paragraph::new(self.path.display().to_string())
                .style(Style::default().fg(Color::DarkGray)),
            path_area,
        );
    }

    fn handle_event(&mut self, event: &TuiEvent, host: &mut Host) {
        match self.list.handle_event(event) {
            Some(FilterEvent::Selected(request)) => {
                let Some(this) = self.this.upgrade() else {
                    return;
                };
                info!("Selected request: {}", request.display_name());
                (self.on_select)(request, this, host);
            }
            Some(FilterEvent::Dismiss) => host.mount(Rc::clone(&self.previous)),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_support::{BlankView, FakeEngine, sample_request};
    use crate::tui::event::Key;

    fn key(k: Key) -> TuiEvent {
        TuiEvent::Key(k)
    }

    #[test]
    fn test_request_label_is_display_name() {
        let request = sample_request("list users");
        assert_eq!(request.label(), request.display_name());
        assert_eq!(request.label(), "list users");
    }

    #[test]
    fn test_parse_failure_mounts_predecessor() {
        let engine = FakeEngine::default();
        engine.fail_parse("no requests found");
        let previous: ViewRef = BlankView::new_ref();
        let other: ViewRef = BlankView::new_ref();
        let mut host = Host::new(other);

        let result = RequestSelectView::open(
            Path::new("broken.http"),
            &engine,
            previous.clone(),
            false,
            Box::new(|_, _, _| {}),
            &mut host,
        );

        assert!(matches!(result, Err(EngineError::Parse(_))));
        assert!(host.is_mounted(&previous));
    }

    #[test]
    fn test_open_lists_requests_in_file_order() {
        let engine = FakeEngine::with_requests(vec![
            sample_request("list users"),
            sample_request("create user"),
        ]);
        let previous: ViewRef = BlankView::new_ref();
        let mut host = Host::new(previous.clone());

        RequestSelectView::open(
            Path::new("users.http"),
            &engine,
            previous.clone(),
            false,
            Box::new(|_, _, _| {}),
            &mut host,
        )
        .unwrap();

        assert!(!host.is_mounted(&previous));
        let root = host.root();
        assert_eq!(root.borrow().name(), "request-select");
        assert_eq!(engine.parse_calls(), 1);
    }

    #[test]
    fn test_escape_goes_back() {
        let engine = FakeEngine::with_requests(vec![sample_request("only")]);
        let previous: ViewRef = BlankView::new_ref();
        let view = RequestSelectView::load(
            Path::new("a.http"),
            &engine,
            previous.clone(),
            false,
            Box::new(|_, _, _| {}),
        )
        .unwrap();
        let mut host = Host::new(view);
        host.settle();

        host.dispatch(&key(Key::Esc));
        assert!(host.is_mounted(&previous));
    }

    #[test]
    fn test_select_hands_request_onward() {
        let engine = FakeEngine::with_requests(vec![
            sample_request("list users"),
            sample_request("create user"),
        ]);
        let chosen: Rc<RefCell<Option<String>>> = Rc::default();
        let view = {
            let chosen = chosen.clone();
            RequestSelectView::load(
                Path::new("users.http"),
                &engine,
                BlankView::new_ref(),
                false,
                Box::new(move |request, _, _| {
                    *chosen.borrow_mut() = Some(request.display_name());
                }),
            )
            .unwrap()
        };
        let mut host = Host::new(view.clone());
        host.settle();

        for c in "create".chars() {
            host.dispatch(&key(Key::Char(c)));
        }
        host.dispatch(&key(Key::Enter));

        assert_eq!(chosen.borrow().as_deref(), Some("create user"));
        assert_eq!(view.borrow().list().query(), "");
    }
}
