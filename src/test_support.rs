//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;

use ratatui::Frame;

use crate::core::context::Context;
use crate::core::env::Environment;
use crate::engine::{EngineError, Request, RequestEngine, Response};
use crate::tui::clipboard::Clipboard;
use crate::tui::event::TuiEvent;
use crate::tui::view::{Host, View, ViewRef};
use crate::tui::views::{Services, Themes};

/// Engine double: returns canned requests and scripted send outcomes.
#[derive(Default)]
pub struct FakeEngine {
    requests: Vec<Request>,
    parse_error: RefCell<Option<String>>,
    outcomes: RefCell<VecDeque<Result<Response, EngineError>>>,
    parse_calls: Cell<usize>,
    execute_calls: Cell<usize>,
}

impl FakeEngine {
    pub fn with_requests(requests: Vec<Request>) -> Self {
        Self {
            requests,
            ..Self::default()
        }
    }

    pub fn fail_parse(&self, message: &str) {
        *self.parse_error.borrow_mut() = Some(message.to_string());
    }

    pub fn push_response(&self, response: Response) {
        self.outcomes.borrow_mut().push_back(Ok(response));
    }

    pub fn push_error(&self, error: EngineError) {
        self.outcomes.borrow_mut().push_back(Err(error));
    }

    pub fn parse_calls(&self) -> usize {
        self.parse_calls.get()
    }

    pub fn execute_calls(&self) -> usize {
        self.execute_calls.get()
    }
}

impl RequestEngine for FakeEngine {
    fn parse_file(&self, _path: &Path) -> Result<Vec<Request>, EngineError> {
        self.parse_calls.set(self.parse_calls.get() + 1);
        match self.parse_error.borrow().as_ref() {
            Some(msg) => Err(EngineError::Parse(msg.clone())),
            None => Ok(self.requests.clone()),
        }
    }

    fn execute(&self, request: &mut Request, env: &Environment) -> Result<Response, EngineError> {
        self.execute_calls.set(self.execute_calls.get() + 1);
        request.pre_request_assertions = request.evaluate_requirements(env);
        request.logs.push(format!("sent {}", request.display_name()));
        self.outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(EngineError::Network("no scripted response".to_string())))
    }
}

/// Clipboard double that remembers everything copied.
#[derive(Default)]
pub struct RecordingClipboard {
    copied: RefCell<Vec<String>>,
}

impl RecordingClipboard {
    pub fn copied(&self) -> Vec<String> {
        self.copied.borrow().clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn copy(&self, text: &str) -> Result<(), String> {
        self.copied.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// A view that draws nothing and ignores input.
pub struct BlankView;

impl BlankView {
    pub fn new_ref() -> ViewRef {
        Rc::new(RefCell::new(BlankView))
    }
}

impl View for BlankView {
    fn name(&self) -> &'static str {
        "blank"
    }
    fn render(&mut self, _frame: &mut Frame) {}
    fn handle_event(&mut self, _event: &TuiEvent, _host: &mut Host) {}
}

/// A GET request named `name` with a placeholder, a requirement and scripts.
pub fn sample_request(name: &str) -> Request {
    Request {
        name: Some(name.to_string()),
        method: "GET".to_string(),
        url: "https://{{host}}/users".to_string(),
        headers: vec![("Accept".to_string(), "application/json".to_string())],
        pre_request_script: "client.global.set(\"token\", \"abc\");".to_string(),
        post_request_script: "client.test(\"ok\", () => {});".to_string(),
        required_vars: vec!["host".to_string()],
        ..Request::default()
    }
}

pub fn json_response(status: u16, body: &str) -> Response {
    let reason = match status {
        200 => "OK",
        201 => "Created",
        404 => "Not Found",
        _ => "",
    };
    Response {
        version: "HTTP/1.1".to_string(),
        status,
        reason: reason.to_string(),
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body: body.to_string(),
        ..Response::default()
    }
}

pub fn services(
    engine: Rc<FakeEngine>,
    clipboard: Rc<RecordingClipboard>,
    env: Environment,
) -> Services {
    Services {
        ctx: Context::new(engine).with_environment(env),
        clipboard,
        themes: Themes {
            request: "base16-eighties.dark".to_string(),
            response: "base16-ocean.dark".to_string(),
            script: "base16-eighties.dark".to_string(),
        },
        case_sensitive: false,
    }
}
