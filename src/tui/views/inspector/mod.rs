//! # RequestInspector
//!
//! One request, every response it has produced so far, and a set of modes
//! for looking at them.
//!
//! ## State Machine
//!
//! ```text
//!                 Tab                 Enter (ok)
//!   RawRequest ◄──────► Processed ───────────────► PrettyResponse(n) ◄─r─► RawResponse(n)
//!     │  ▲  Enter (ok)                                   │ a                  │ a
//!     │  └──────────────── Esc (Clear) ◄─────────────────┤                    │
//!     │ s                                                ▼                    ▼
//!     ▼                                          Assertions(n, Pretty)  Assertions(n, Raw)
//!   Scripts
//!
//!   Enter (err) from either request mode ──► Error(msg)
//!   l from most modes ──► Logs(return = that mode)
//! ```
//!
//! `set_mode` is the only way to change mode. It renders the new mode's
//! content and swaps in its command table together, so a key is always
//! dispatched against the table of the mode that is on screen.
//!
//! ## Responses
//!
//! Each successful send appends a `Response`; indices never move. Pretty and
//! raw renditions are memoized per (index, kind) in a `ResponseCache` for
//! the lifetime of the inspector. Navigating back drops the inspector and
//! with it the whole history.

mod cache;
mod mode;

pub use cache::{Rendered, ResponseCache};
pub use mode::{Action, Mode, ResponseKind, commands_for};

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, info, warn};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::engine::{Assertion, EngineError, Request, Response};
use crate::tui::component::Component;
use crate::tui::components::command_bar::{self, Command, CommandBar};
use crate::tui::event::{Key, TuiEvent};
use crate::tui::highlight::{Lang, highlight};
use crate::tui::view::{Host, View, ViewRef};

use super::Services;
use super::text_editor::TextEditorView;

pub struct RequestInspector {
    this: Weak<RefCell<RequestInspector>>,
    previous: ViewRef,
    services: Services,
    request: Request,
    responses: Vec<Response>,
    cache: ResponseCache,
    mode: Mode,
    commands: Vec<Command<Action>>,
    content: Rc<Rendered>,
    scroll: ScrollViewState,
    status: Option<String>,
}

impl RequestInspector {
    /// Build an inspector in `RawRequest` mode. `previous` is mounted on Back.
    pub fn new(request: Request, previous: ViewRef, services: Services) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|this| {
            let mut inspector = Self {
                this: this.clone(),
                previous,
                services,
                request,
                responses: Vec::new(),
                cache: ResponseCache::default(),
                mode: Mode::RawRequest,
                commands: Vec::new(),
                content: Rc::new(Rendered::plain("")),
                scroll: ScrollViewState::default(),
                status: None,
            };
            inspector.set_mode(Mode::RawRequest);
            RefCell::new(inspector)
        })
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn commands(&self) -> &[Command<Action>] {
        &self.commands
    }

    pub fn content(&self) -> &Rendered {
        &self.content
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    // ========================================================================
    // Mode transitions
    // ========================================================================

    /// Switch to `mode`, replacing content and commands together.
    ///
    /// A mode whose content cannot be produced (a pretty view of a malformed
    /// body) lands in `Error` instead.
    fn set_mode(&mut self, mode: Mode) {
        debug!("Inspector mode: {:?} -> {:?}", self.mode, mode);
        let (mode, content) = match self.render_mode(&mode) {
            Ok(content) => (mode, content),
            Err(e) => {
                warn!("Could not render {:?}: {e}", mode);
                let error = Mode::Error(e.to_string());
                let content = Rc::new(error_content(&e.to_string()));
                (error, content)
            }
        };
        self.commands = commands_for(&mode);
        self.mode = mode;
        self.content = content;
        self.scroll = ScrollViewState::default();
        self.status = None;
    }

    /// Re-derive the content of the current mode.
    fn refresh(&mut self) {
        match self.render_mode(&self.mode.clone()) {
            Ok(content) => self.content = content,
            Err(_) => self.set_mode(self.mode.clone()),
        }
    }

    fn render_mode(&mut self, mode: &Mode) -> Result<Rc<Rendered>, EngineError> {
        let themes = &self.services.themes;
        let rendered = match mode {
            Mode::RawRequest => Rendered::from_styled(highlight(
                &self.request.http_text(),
                Lang::Http,
                &themes.request,
            )),
            Mode::ProcessedRequest => {
                let processed = self.request.apply_env(self.services.ctx.environment());
                Rendered::from_styled(highlight(&processed.http_text(), Lang::Http, &themes.request))
            }
            Mode::PrettyResponse(index) => {
                let response = response_at(&self.responses, *index)?;
                let theme = &themes.response;
                return self
                    .cache
                    .get_or_try_insert_with((*index, ResponseKind::Pretty), || {
                        let text = response.pretty_string()?;
                        Ok(Rendered::from_styled(highlight(&text, Lang::Http, theme)))
                    });
            }
            Mode::RawResponse(index) => {
                let response = response_at(&self.responses, *index)?;
                let theme = &themes.response;
                return self
                    .cache
                    .get_or_try_insert_with((*index, ResponseKind::Raw), || {
                        let text = response.raw_string();
                        Ok::<_, EngineError>(Rendered::from_styled(highlight(
                            &text,
                            Lang::Http,
                            theme,
                        )))
                    });
            }
            Mode::Assertions { index, .. } => {
                let response = response_at(&self.responses, *index)?;
                assertions_content(&self.request, response)
            }
            Mode::Scripts => scripts_content(&self.request, &themes.script),
            Mode::Logs(_) => Rendered::plain(self.request.logs.join("\n")),
            Mode::Error(msg) => error_content(msg),
        };
        Ok(Rc::new(rendered))
    }

    // ========================================================================
    // Actions
    // ========================================================================

    fn perform(&mut self, action: Action, host: &mut Host) {
        match action {
            Action::Quit => {
                info!("Quit requested from inspector");
                host.stop();
            }
            Action::Copy => self.copy(),
            Action::EditVariables => self.edit_variables(host),
            Action::Back => host.mount(Rc::clone(&self.previous)),
            Action::Send => self.send(),
            Action::Goto(mode) => self.set_mode(mode),
        }
    }

    fn send(&mut self) {
        info!("Sending request: {}", self.request.display_name());
        let ctx = self.services.ctx.clone();
        match ctx.engine().execute(&mut self.request, ctx.environment()) {
            Ok(response) => {
                self.responses.push(response);
                let index = self.responses.len() - 1;
                info!("Response #{index} recorded");
                self.set_mode(Mode::PrettyResponse(index));
            }
            Err(e) => {
                warn!("Send failed: {e}");
                self.set_mode(Mode::Error(e.to_string()));
            }
        }
    }

    fn copy(&mut self) {
        self.status = Some(match self.services.clipboard.copy(&self.content.plain) {
            Ok(()) => "Copied to clipboard".to_string(),
            Err(e) => e,
        });
    }

    fn edit_variables(&mut self, host: &mut Host) {
        let Some(this) = self.this.upgrade() else {
            return;
        };
        let on_save: ViewRef = this.clone();
        let on_cancel: ViewRef = this;
        let editor = TextEditorView::new(
            "Environment Variables",
            self.services.ctx.environment().clone(),
            Box::new(move |host| host.mount(Rc::clone(&on_save))),
            Box::new(move |host| host.mount(Rc::clone(&on_cancel))),
        );
        host.mount(Rc::new(RefCell::new(editor)));
    }

    fn scroll_by(&mut self, key: Key) {
        match key {
            Key::Up => self.scroll.scroll_up(),
            Key::Down => self.scroll.scroll_down(),
            Key::PageUp => self.scroll.scroll_page_up(),
            Key::PageDown => self.scroll.scroll_page_down(),
            Key::Home => self.scroll.scroll_to_top(),
            Key::End => self.scroll.scroll_to_bottom(),
            _ => {}
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            self.request.display_name(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if !self.responses.is_empty() {
            spans.push(Span::styled(
                format!("  [{} sent]", self.responses.len()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if let Some(ref status) = self.status {
            spans.push(Span::styled(
                format!("  {status}"),
                Style::default().fg(Color::Yellow),
            ));
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn render_body(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP).title(Span::styled(
            format!(" {} ", self.mode.title()),
            Style::default()
                .fg(self.mode.title_color())
                .add_modifier(Modifier::BOLD),
        ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = inner.width.saturating_sub(1);
        let paragraph = Paragraph::new(self.content.styled.clone()).wrap(Wrap { trim: false });
        let height = paragraph.line_count(width).max(1) as u16;

        let mut scroll_view = ScrollView::new(Size::new(width, height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        scroll_view.render_widget(paragraph, Rect::new(0, 0, width, height));
        frame.render_stateful_widget(scroll_view, inner, &mut self.scroll);
    }
}

impl View for RequestInspector {
    fn name(&self) -> &'static str {
        "inspector"
    }

    fn render(&mut self, frame: &mut Frame) {
        let [header, body, bar] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .areas(frame.area());

        self.render_header(frame, header);
        self.render_body(frame, body);
        CommandBar {
            commands: &self.commands,
        }
        .render(frame, bar);
    }

    fn handle_event(&mut self, event: &TuiEvent, host: &mut Host) {
        let TuiEvent::Key(key) = event else {
            return;
        };
        match command_bar::dispatch(&self.commands, *key) {
            Some(action) => self.perform(action, host),
            None => self.scroll_by(*key),
        }
    }

    fn on_mount(&mut self) {
        self.refresh();
    }
}

// ============================================================================
// Content builders
// ============================================================================

fn response_at(responses: &[Response], index: usize) -> Result<&Response, EngineError> {
    responses
        .get(index)
        .ok_or_else(|| EngineError::Format(format!("no response #{index}")))
}

fn section_heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))
}

fn assertion_line(assertion: &Assertion) -> Line<'static> {
    let (label, color) = if assertion.success {
        ("passed", Color::Green)
    } else {
        ("FAILED", Color::Red)
    };
    Line::from(vec![
        Span::raw("-- ["),
        Span::styled(label, Style::default().fg(color)),
        Span::raw(format!("]: {}", assertion.message)),
    ])
}

fn assertions_content(request: &Request, response: &Response) -> Rendered {
    let mut lines = vec![section_heading("Pre-Request Assertions:")];
    lines.extend(request.pre_request_assertions.iter().map(assertion_line));
    lines.push(Line::default());
    lines.push(section_heading("Post-Request Assertions:"));
    lines.extend(response.post_request_assertions.iter().map(assertion_line));
    Rendered::from_styled(Text::from(lines))
}

fn scripts_content(request: &Request, theme: &str) -> Rendered {
    let mut lines = vec![section_heading("Pre-Request Script:")];
    lines.extend(highlight(&request.pre_request_script, Lang::JavaScript, theme).lines);
    lines.push(Line::default());
    lines.push(section_heading("Post-Request Script:"));
    lines.extend(highlight(&request.post_request_script, Lang::JavaScript, theme).lines);
    Rendered::from_styled(Text::from(lines))
}

fn error_content(message: &str) -> Rendered {
    let styled = Text::styled(message.to_string(), Style::default().fg(mode::ORANGE_RED));
    Rendered::from_styled(styled)
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::core::env::Environment;
    use crate::test_support::{
        BlankView, FakeEngine, RecordingClipboard, json_response, sample_request, services,
    };

    struct Fixture {
        engine: Rc<FakeEngine>,
        clipboard: Rc<RecordingClipboard>,
        env: Environment,
        previous: ViewRef,
        inspector: Rc<RefCell<RequestInspector>>,
        host: Host,
    }

    impl Fixture {
        fn new() -> Self {
            let engine = Rc::new(FakeEngine::default());
            let clipboard = Rc::new(RecordingClipboard::default());
            let env = Environment::from_pairs([("host", "api.test")]);
            let previous = BlankView::new_ref();
            let inspector = RequestInspector::new(
                sample_request("list users"),
                previous.clone(),
                services(engine.clone(), clipboard.clone(), env.clone()),
            );
            let mut host = Host::new(inspector.clone());
            host.settle();
            Self {
                engine,
                clipboard,
                env,
                previous,
                inspector,
                host,
            }
        }

        fn press(&mut self, key: Key) {
            self.host.dispatch(&TuiEvent::Key(key));
        }

        fn mode(&self) -> Mode {
            self.inspector.borrow().mode().clone()
        }

        fn plain(&self) -> String {
            self.inspector.borrow().content().plain.clone()
        }

        fn inspector_mounted(&self) -> bool {
            let inspector: ViewRef = self.inspector.clone();
            self.host.is_mounted(&inspector)
        }
    }

    #[test]
    fn test_starts_in_raw_request() {
        let f = Fixture::new();
        assert_eq!(f.mode(), Mode::RawRequest);
        assert!(f.plain().starts_with("GET https://{{host}}/users"));
    }

    #[test]
    fn test_back_mounts_exact_predecessor() {
        let mut f = Fixture::new();
        f.press(Key::Esc);
        assert!(f.host.is_mounted(&f.previous));
    }

    #[test]
    fn test_tab_toggles_environment_substitution() {
        let mut f = Fixture::new();
        f.press(Key::Tab);
        assert_eq!(f.mode(), Mode::ProcessedRequest);
        assert!(f.plain().starts_with("GET https://api.test/users"));

        f.press(Key::Tab);
        assert_eq!(f.mode(), Mode::RawRequest);
    }

    #[test]
    fn test_two_sends_append_records() {
        let mut f = Fixture::new();
        f.engine.push_response(json_response(200, r#"{"n":1}"#));
        f.engine.push_response(json_response(201, r#"{"n":2}"#));

        f.press(Key::Enter);
        assert_eq!(f.mode(), Mode::PrettyResponse(0));
        f.press(Key::Esc);
        f.press(Key::Enter);
        assert_eq!(f.mode(), Mode::PrettyResponse(1));
        assert_eq!(f.inspector.borrow().responses().len(), 2);
        assert!(f.plain().contains("\"n\": 2"));

        f.inspector.borrow_mut().set_mode(Mode::PrettyResponse(0));
        assert!(f.plain().starts_with("HTTP/1.1 200 OK"));
        assert!(f.plain().contains("\"n\": 1"));
    }

    #[test]
    fn test_renditions_computed_once_and_stable() {
        let mut f = Fixture::new();
        f.engine.push_response(json_response(200, r#"{"a":[1,2]}"#));
        f.press(Key::Enter);

        let first = f.plain();
        let first_rc = Rc::clone(&f.inspector.borrow().content);
        f.press(Key::Char('r'));
        let raw = f.plain();
        assert_eq!(raw, "HTTP/1.1 200 OK\nContent-Type: application/json\n\n{\"a\":[1,2]}");
        f.press(Key::Char('r'));
        f.press(Key::Char('r'));
        f.press(Key::Char('r'));

        let inspector = f.inspector.borrow();
        assert_eq!(inspector.mode(), &Mode::PrettyResponse(0));
        assert_eq!(inspector.content().plain, first);
        assert!(Rc::ptr_eq(&inspector.content, &first_rc));
        assert_eq!(inspector.cache.computed(), 2);
    }

    #[test]
    fn test_raw_response_is_highlighted_verbatim() {
        let mut f = Fixture::new();
        f.engine.push_response(json_response(200, r#"{"a":[1,2]}"#));
        f.press(Key::Enter);
        f.press(Key::Char('r'));
        assert_eq!(f.mode(), Mode::RawResponse(0));

        let inspector = f.inspector.borrow();
        let content = inspector.content();
        assert_eq!(
            content.plain,
            "HTTP/1.1 200 OK\nContent-Type: application/json\n\n{\"a\":[1,2]}"
        );
        let styled_spans = content
            .styled
            .lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .filter(|span| span.style != Style::default())
            .count();
        assert!(styled_spans > 0);
        assert_eq!(content.styled.lines[0].spans[0].style.fg, Some(Color::LightMagenta));
    }

    #[test]
    fn test_send_failure_shows_error_without_record() {
        let mut f = Fixture::new();
        f.engine
            .push_error(EngineError::Network("connection refused".to_string()));
        f.press(Key::Enter);

        assert_eq!(
            f.mode(),
            Mode::Error("network error: connection refused".to_string())
        );
        assert!(f.inspector.borrow().responses().is_empty());

        // Enter is not bound in Error mode: no retry
        f.press(Key::Enter);
        assert_eq!(f.engine.execute_calls(), 1);

        f.press(Key::Esc);
        assert_eq!(f.mode(), Mode::RawRequest);
    }

    #[test]
    fn test_malformed_json_lands_in_error() {
        let mut f = Fixture::new();
        f.engine.push_response(json_response(200, "{not json"));
        f.press(Key::Enter);

        assert!(matches!(f.mode(), Mode::Error(ref msg) if msg.contains("not valid JSON")));
        assert_eq!(f.inspector.borrow().responses().len(), 1);
        assert_eq!(f.inspector.borrow().cache.computed(), 0);
    }

    #[test]
    fn test_assertions_show_both_sections_and_return() {
        let mut f = Fixture::new();
        let mut response = json_response(404, "{}");
        response.post_request_assertions = vec![Assertion::new("status is 200 (got 404)", false)];
        f.engine.push_response(response);
        f.press(Key::Enter);
        f.press(Key::Char('r'));
        f.press(Key::Char('a'));

        assert_eq!(
            f.mode(),
            Mode::Assertions {
                index: 0,
                ret: ResponseKind::Raw
            }
        );
        let plain = f.plain();
        assert!(plain.contains("Pre-Request Assertions:"));
        assert!(plain.contains("-- [passed]: variable host is set"));
        assert!(plain.contains("-- [FAILED]: status is 200 (got 404)"));

        f.press(Key::Esc);
        assert_eq!(f.mode(), Mode::RawResponse(0));
    }

    #[test]
    fn test_logs_return_to_opening_mode() {
        let mut f = Fixture::new();
        f.engine.push_error(EngineError::Network("timeout".to_string()));
        f.press(Key::Enter);
        f.press(Key::Char('l'));

        assert!(matches!(f.mode(), Mode::Logs(_)));
        assert_eq!(f.plain(), "sent list users");

        f.press(Key::Esc);
        assert_eq!(f.mode(), Mode::Error("network error: timeout".to_string()));
    }

    #[test]
    fn test_scripts_and_clear() {
        let mut f = Fixture::new();
        f.press(Key::Char('s'));
        assert_eq!(f.mode(), Mode::Scripts);
        assert!(f.plain().contains("client.global.set(\"token\", \"abc\");"));
        f.press(Key::Esc);
        assert_eq!(f.mode(), Mode::RawRequest);
    }

    #[test]
    fn test_copy_uses_displayed_text() {
        let mut f = Fixture::new();
        f.press(Key::Char('c'));
        let expected = f.plain();
        assert_eq!(f.clipboard.copied(), vec![expected]);
        assert_eq!(f.inspector.borrow().status(), Some("Copied to clipboard"));
    }

    #[test]
    fn test_edit_variables_save_rederives_processed_request() {
        let mut f = Fixture::new();
        f.press(Key::Tab);

        f.press(Key::Char('v'));
        assert!(!f.inspector_mounted());

        f.host.dispatch(&TuiEvent::Paste("x".to_string()));
        f.press(Key::Ctrl('s'));

        assert!(f.inspector_mounted());
        assert_eq!(f.mode(), Mode::ProcessedRequest);
        assert_eq!(f.env.get("xhost").as_deref(), Some("api.test"));
        assert!(f.plain().starts_with("GET https://{{host}}/users"));
    }

    #[test]
    fn test_edit_variables_cancel_keeps_state() {
        let mut f = Fixture::new();
        f.engine.push_response(json_response(200, "{}"));
        f.press(Key::Enter);
        f.press(Key::Char('v'));
        f.host.dispatch(&TuiEvent::Paste("junk".to_string()));
        f.press(Key::Esc);

        assert!(f.inspector_mounted());
        assert_eq!(f.mode(), Mode::PrettyResponse(0));
        assert_eq!(f.env.get("host").as_deref(), Some("api.test"));
    }

    #[test]
    fn test_unmatched_keys_scroll() {
        let mut f = Fixture::new();
        {
            let mut inspector = f.inspector.borrow_mut();
            inspector.request.body = (0..100).map(|i| format!("line {i}\n")).collect();
            inspector.refresh();
            let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
            terminal.draw(|frame| inspector.render(frame)).unwrap();
        }

        f.press(Key::Down);
        f.press(Key::Down);
        f.press(Key::Up);
        assert_eq!(f.inspector.borrow().scroll.offset().y, 1);

        f.press(Key::Char('z'));
        assert_eq!(f.mode(), Mode::RawRequest);
    }

    #[test]
    fn test_quit_stops_host() {
        let mut f = Fixture::new();
        f.press(Key::Ctrl('q'));
        assert!(!f.host.is_running());
    }

    #[test]
    fn test_render_shows_title_and_commands() {
        let f = Fixture::new();
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        let mut inspector = f.inspector.borrow_mut();
        terminal.draw(|frame| inspector.render(frame)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("list users"));
        assert!(text.contains("Request"));
        assert!(text.contains("Send (Enter)"));
    }
}
