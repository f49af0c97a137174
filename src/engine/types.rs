//! Request and response values exchanged with the engine.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};

use super::EngineError;
use crate::core::env::Environment;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("placeholder regex is valid")
});

/// Outcome of one assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub message: String,
    pub success: bool,
}

impl Assertion {
    pub fn new(message: impl Into<String>, success: bool) -> Self {
        Self {
            message: message.into(),
            success,
        }
    }
}

/// A post-request check declared with `# @expect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    Status(u16),
    Header(String),
}

impl Expectation {
    pub fn evaluate(&self, response: &Response) -> Assertion {
        match self {
            Expectation::Status(code) => Assertion::new(
                format!("status is {code} (got {})", response.status),
                response.status == *code,
            ),
            Expectation::Header(name) => Assertion::new(
                format!("header {name} is present"),
                response.header(name).is_some(),
            ),
        }
    }
}

/// One request template from a request-definition file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    pub name: Option<String>,
    pub title: Option<String>,
    pub method: String,
    pub url: String,
    pub version: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub pre_request_script: String,
    pub post_request_script: String,
    /// Variables that must be set before sending (`# @require`).
    pub required_vars: Vec<String>,
    pub expectations: Vec<Expectation>,
    pub pre_request_assertions: Vec<Assertion>,
    pub logs: Vec<String>,
}

impl Request {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| format!("{} {}", self.method, self.url))
    }

    /// The request as it would appear in a `.http` file.
    pub fn http_text(&self) -> String {
        let mut out = format!("{} {}", self.method, self.url);
        if let Some(ref version) = self.version {
            out.push(' ');
            out.push_str(version);
        }
        for (name, value) in &self.headers {
            out.push_str(&format!("\n{name}: {value}"));
        }
        if !self.body.is_empty() {
            out.push_str("\n\n");
            out.push_str(&self.body);
        }
        out
    }

    /// A copy with `{{NAME}}` placeholders substituted. Unknown names stay verbatim.
    pub fn apply_env(&self, env: &Environment) -> Request {
        let sub = |text: &str| substitute(text, env);
        Request {
            url: sub(&self.url),
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (sub(k), sub(v)))
                .collect(),
            body: sub(&self.body),
            ..self.clone()
        }
    }

    /// Evaluate `# @require` declarations against `env`.
    pub fn evaluate_requirements(&self, env: &Environment) -> Vec<Assertion> {
        self.required_vars
            .iter()
            .map(|var| Assertion::new(format!("variable {var} is set"), env.contains(var)))
            .collect()
    }
}

fn substitute(text: &str, env: &Environment) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            env.get(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// A received response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub version: String,
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub elapsed: Duration,
    pub post_request_assertions: Vec<Assertion>,
}

impl Response {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn head(&self) -> String {
        let mut out = format!("{} {} {}", self.version, self.status, self.reason)
            .trim_end()
            .to_string();
        for (name, value) in &self.headers {
            out.push_str(&format!("\n{name}: {value}"));
        }
        out
    }

    /// Status line, headers and body exactly as received.
    pub fn raw_string(&self) -> String {
        self.to_string()
    }

    /// Like `raw_string`, with JSON bodies re-indented.
    pub fn pretty_string(&self) -> Result<String, EngineError> {
        let is_json = self
            .header("content-type")
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
        if !is_json || self.body.trim().is_empty() {
            return Ok(self.raw_string());
        }
        let value: serde_json::Value = serde_json::from_str(&self.body)
            .map_err(|e| EngineError::Format(format!("response body is not valid JSON: {e}")))?;
        let body = serde_json::to_string_pretty(&value)
            .map_err(|e| EngineError::Format(e.to_string()))?;
        Ok(format!("{}\n\n{}", self.head(), body))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head())?;
        if !self.body.is_empty() {
            write!(f, "\n\n{}", self.body)?;
        }
        Ok(())
    }
}
