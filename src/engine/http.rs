//! HTTP execution backed by `reqwest`.
//!
//! The client is async, but sending is synchronous for callers: each
//! `execute` call blocks on a private current-thread runtime. The TUI has a
//! single logical thread, so nothing else runs while a request is in flight.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Local;
use log::{info, warn};
use tokio::runtime::{Builder, Runtime};

use super::types::{Request, Response};
use super::{EngineError, RequestEngine, parser};
use crate::core::env::Environment;

pub struct HttpEngine {
    runtime: Runtime,
    client: reqwest::Client,
}

impl HttpEngine {
    pub fn new(timeout: Duration) -> Result<Self, EngineError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EngineError::Io)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Network(e.to_string()))?;
        Ok(Self { runtime, client })
    }
}

impl RequestEngine for HttpEngine {
    fn parse_file(&self, path: &Path) -> Result<Vec<Request>, EngineError> {
        parser::parse_file(path)
    }

    fn execute(&self, request: &mut Request, env: &Environment) -> Result<Response, EngineError> {
        request.pre_request_assertions = request.evaluate_requirements(env);
        for failed in request.pre_request_assertions.iter().filter(|a| !a.success) {
            let line = log_line(&format!("pre-request assertion failed: {}", failed.message));
            request.logs.push(line);
        }

        let applied = request.apply_env(env);
        info!("Sending {} {}", applied.method, applied.url);
        request
            .logs
            .push(log_line(&format!("{} {}", applied.method, applied.url)));

        let started = Instant::now();
        match self.runtime.block_on(send(&self.client, &applied)) {
            Ok(mut response) => {
                response.elapsed = started.elapsed();
                response.post_request_assertions = request
                    .expectations
                    .iter()
                    .map(|e| e.evaluate(&response))
                    .collect();
                request.logs.push(log_line(&format!(
                    "{} {} in {}ms",
                    response.status,
                    response.reason,
                    response.elapsed.as_millis()
                )));
                info!("Received {} in {:?}", response.status, response.elapsed);
                Ok(response)
            }
            Err(e) => {
                warn!("Request failed: {}", e);
                request.logs.push(log_line(&format!("failed: {e}")));
                Err(e)
            }
        }
    }
}

fn log_line(message: &str) -> String {
    format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
}

async fn send(client: &reqwest::Client, request: &Request) -> Result<Response, EngineError> {
    let method = reqwest::Method::from_bytes(request.method.as_bytes())
        .map_err(|_| EngineError::InvalidRequest(format!("unknown method {}", request.method)))?;

    let mut builder = client.request(method, &request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    if !request.body.is_empty() {
        builder = builder.body(request.body.clone());
    }

    let resp = builder.send().await.map_err(classify)?;
    let status = resp.status();
    let version = format!("{:?}", resp.version());
    let headers = resp
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("<binary>").to_string(),
            )
        })
        .collect();
    let body = resp.text().await.map_err(classify)?;

    Ok(Response {
        version,
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        body,
        elapsed: Duration::ZERO,
        post_request_assertions: Vec::new(),
    })
}

fn classify(e: reqwest::Error) -> EngineError {
    if e.is_builder() {
        EngineError::InvalidRequest(e.to_string())
    } else {
        EngineError::Network(e.to_string())
    }
}
