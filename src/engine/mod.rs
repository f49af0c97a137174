//! # Request Engine
//!
//! The request-processing collaborator: turns `.http` files into `Request`
//! values and executes them. The TUI only talks to the `RequestEngine` trait,
//! so views can be driven by a fake engine in tests.

mod http;
pub mod parser;
mod types;

pub use http::HttpEngine;
pub use types::{Assertion, Expectation, Request, Response};

use std::fmt;
use std::path::Path;

use crate::core::env::Environment;

/// Errors that can occur while parsing or executing requests.
#[derive(Debug)]
pub enum EngineError {
    /// The request file could not be read.
    Io(std::io::Error),
    /// The request file is not valid request-definition syntax.
    Parse(String),
    /// The request is not sendable (bad method, bad URL, bad header).
    InvalidRequest(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// The response could not be formatted (e.g. invalid JSON body).
    Format(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Io(e) => write!(f, "I/O error: {e}"),
            EngineError::Parse(msg) => write!(f, "parse error: {msg}"),
            EngineError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            EngineError::Network(msg) => write!(f, "network error: {msg}"),
            EngineError::Format(msg) => write!(f, "format error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

pub trait RequestEngine {
    /// Parse a request-definition file into its requests, in file order.
    fn parse_file(&self, path: &Path) -> Result<Vec<Request>, EngineError>;

    /// Send `request` with `env` substituted. Appends to `request.logs` and
    /// refreshes its pre-request assertions.
    fn execute(&self, request: &mut Request, env: &Environment) -> Result<Response, EngineError>;
}
