//! # `.http` Parser
//!
//! ```text
//! ### Create user                  ← separator, optional title
//! # @name create-user              ← display name
//! # @require token                 ← pre-request assertion
//! # @expect status 201             ← post-request check
//! < {% client.log("pre") %}       ← pre-request script
//! POST https://{{host}}/users      ← request line (bare URL = GET)
//! Authorization: Bearer {{token}}  ← headers until blank line
//!
//! {"name": "ada"}                  ← body
//!
//! > {% client.log("post") %}      ← post-request script
//! ```
//!
//! Blocks without a request line are ignored; a file without any request is
//! a parse error.

use std::fs;
use std::path::Path;

use log::debug;

use super::types::{Expectation, Request};
use super::EngineError;

const METHODS: &[&str] = &[
    "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "TRACE", "CONNECT",
];

pub fn parse_file(path: &Path) -> Result<Vec<Request>, EngineError> {
    let contents = fs::read_to_string(path).map_err(EngineError::Io)?;
    let requests = parse_str(&contents)
        .map_err(|e| EngineError::Parse(format!("{}: {}", path.display(), parse_message(e))))?;
    debug!("Parsed {} requests from {}", requests.len(), path.display());
    Ok(requests)
}

fn parse_message(e: EngineError) -> String {
    match e {
        EngineError::Parse(msg) => msg,
        other => other.to_string(),
    }
}

pub fn parse_str(contents: &str) -> Result<Vec<Request>, EngineError> {
    let mut requests = Vec::new();
    let mut title: Option<String> = None;
    let mut block: Vec<(usize, &str)> = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        if let Some(rest) = line.strip_prefix("###") {
            if let Some(req) = parse_block(&block, title.take())? {
                requests.push(req);
            }
            block.clear();
            let rest = rest.trim();
            title = (!rest.is_empty()).then(|| rest.to_string());
            continue;
        }
        block.push((idx + 1, line));
    }
    if let Some(req) = parse_block(&block, title)? {
        requests.push(req);
    }

    if requests.is_empty() {
        return Err(EngineError::Parse("no requests found".to_string()));
    }
    Ok(requests)
}

#[derive(PartialEq)]
enum Section {
    Preamble,
    Headers,
    Body,
}

fn parse_block(lines: &[(usize, &str)], title: Option<String>) -> Result<Option<Request>, EngineError> {
    let mut req = Request {
        title,
        ..Default::default()
    };
    let mut section = Section::Preamble;
    let mut body: Vec<&str> = Vec::new();
    let mut iter = lines.iter();

    while let Some(&(line_no, line)) = iter.next() {
        let trimmed = line.trim();

        // Scripts may span lines: `< {%` ... `%}`
        if let Some(opening) = script_opening(trimmed) {
            let mut source = Vec::new();
            let mut rest = trimmed[1..].trim_start()[2..].to_string();
            loop {
                if let Some(end) = rest.find("%}") {
                    source.push(rest[..end].to_string());
                    break;
                }
                source.push(rest.clone());
                match iter.next() {
                    Some(&(_, next)) => rest = next.to_string(),
                    None => {
                        return Err(EngineError::Parse(format!(
                            "line {line_no}: unterminated script block"
                        )));
                    }
                }
            }
            let script = source.join("\n").trim().to_string();
            match opening {
                '<' => req.pre_request_script = script,
                _ => req.post_request_script = script,
            }
            continue;
        }

        match section {
            Section::Preamble => {
                if trimmed.is_empty() {
                    continue;
                }
                if let Some(comment) = comment_text(trimmed) {
                    parse_directive(comment, &mut req, line_no)?;
                    continue;
                }
                parse_request_line(trimmed, &mut req, line_no)?;
                section = Section::Headers;
            }
            Section::Headers => {
                if trimmed.is_empty() {
                    section = Section::Body;
                    continue;
                }
                if comment_text(trimmed).is_some() {
                    continue;
                }
                let (name, value) = trimmed.split_once(':').ok_or_else(|| {
                    EngineError::Parse(format!("line {line_no}: expected header, got '{trimmed}'"))
                })?;
                req.headers
                    .push((name.trim().to_string(), value.trim().to_string()));
            }
            Section::Body => body.push(line),
        }
    }

    if section == Section::Preamble {
        return Ok(None);
    }
    req.body = body.join("\n").trim().to_string();
    Ok(Some(req))
}

fn script_opening(trimmed: &str) -> Option<char> {
    let first = trimmed.chars().next()?;
    if (first == '<' || first == '>') && trimmed[1..].trim_start().starts_with("{%") {
        Some(first)
    } else {
        None
    }
}

fn comment_text(trimmed: &str) -> Option<&str> {
    trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("//"))
        .map(str::trim)
}

fn parse_directive(comment: &str, req: &mut Request, line_no: usize) -> Result<(), EngineError> {
    let Some(directive) = comment.strip_prefix('@') else {
        return Ok(());
    };
    let mut parts = directive.split_whitespace();
    match parts.next() {
        Some("name") => {
            let name = parts.collect::<Vec<_>>().join(" ");
            if !name.is_empty() {
                req.name = Some(name);
            }
        }
        Some("require") => req.required_vars.extend(parts.map(str::to_string)),
        Some("expect") => match (parts.next(), parts.next()) {
            (Some("status"), Some(code)) => {
                let code = code.parse().map_err(|_| {
                    EngineError::Parse(format!("line {line_no}: invalid status code '{code}'"))
                })?;
                req.expectations.push(Expectation::Status(code));
            }
            (Some("header"), Some(name)) => {
                req.expectations.push(Expectation::Header(name.to_string()));
            }
            _ => {
                return Err(EngineError::Parse(format!(
                    "line {line_no}: expected '@expect status <code>' or '@expect header <name>'"
                )));
            }
        },
        // Unknown directives are treated as plain comments
        _ => {}
    }
    Ok(())
}

fn parse_request_line(trimmed: &str, req: &mut Request, line_no: usize) -> Result<(), EngineError> {
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    let (method, rest) = match parts.first() {
        Some(first) if METHODS.contains(first) => (first.to_string(), &parts[1..]),
        _ => ("GET".to_string(), &parts[..]),
    };
    let Some(url) = rest.first() else {
        return Err(EngineError::Parse(format!("line {line_no}: missing URL")));
    };
    req.method = method;
    req.url = url.to_string();
    req.version = rest
        .get(1)
        .filter(|v| v.starts_with("HTTP/"))
        .map(|v| v.to_string());
    Ok(())
}
