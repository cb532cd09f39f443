//! Minimal HTTP hosting layer over the analyzer. Raw `TcpListener` — no
//! external HTTP server dependency. Thin wrapper: routes carry no decision
//! logic of their own.
//!
//! Routes:
//! - `GET  /health`            → liveness probe
//! - `POST /analyze`           → body `{"path": "...", "name": "...", "timeout_secs": n}`
//! - `GET  /reports/{name}`    → previously saved report JSON

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use crate::analyzer::Analyzer;
use crate::assembler::save_report;
use crate::config::FerretConfig;
use crate::corpus::index_repo;
use crate::error::FerretError;

const MAX_REQUEST_BYTES: usize = 64 * 1024;

pub struct ServerState {
    pub analyzer: Analyzer,
    pub config: FerretConfig,
    pub report_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    path: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

/// Serve until the cancel token fires.
pub async fn serve(addr: &str, state: Arc<ServerState>, cancel: CancellationToken) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Ferret HTTP: listening on http://{}", addr);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Ferret HTTP: shutting down");
                return Ok(());
            }
            accept = listener.accept() => {
                let (stream, peer) = match accept {
                    Ok(s) => s,
                    Err(_) => continue,
                };
                tracing::debug!("Connection from {}", peer);
                let state = state.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, state).await {
                        tracing::debug!("Connection error: {}", e);
                    }
                });
            }
        }
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<ServerState>) -> anyhow::Result<()> {
    let (method, path, body) = read_request(&mut stream).await?;

    let result = route(&state, &method, &path, &body).await;
    let (status, body) = match result {
        Ok(json) => (200, json),
        Err(e) => (
            e.http_status(),
            serde_json::json!({ "error": e.to_string() }).to_string(),
        ),
    };

    let response = format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        status,
        status_text(status),
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

async fn route(
    state: &ServerState,
    method: &str,
    path: &str,
    body: &str,
) -> Result<String, FerretError> {
    match (method, path) {
        ("GET", "/health") | ("GET", "/status") => {
            Ok(serde_json::json!({ "status": "ok" }).to_string())
        }
        ("POST", "/analyze") => {
            let req: AnalyzeRequest = serde_json::from_str(body)
                .map_err(|e| FerretError::InvalidRequest(e.to_string()))?;
            let repo = PathBuf::from(&req.path);
            if !repo.exists() {
                return Err(FerretError::NotFound(req.path));
            }

            let files = index_repo(&repo, &state.config.corpus);
            let repo_ref = req.name.unwrap_or(req.path);
            let deadline = req.timeout_secs.map(Duration::from_secs);
            let report = state.analyzer.analyze(&repo_ref, files, deadline).await;

            let saved = save_report(&report, &state.report_dir).map_err(FerretError::Internal)?;
            let mut value = serde_json::to_value(&report)
                .map_err(|e| FerretError::Internal(e.into()))?;
            value["saved_as"] = serde_json::json!(saved
                .file_name()
                .map(|n| n.to_string_lossy().to_string()));
            Ok(value.to_string())
        }
        ("GET", _) if path.starts_with("/reports/") => {
            let name = path.trim_start_matches("/reports/");
            // No path traversal out of the report dir.
            if name.is_empty() || name.contains('/') || name.contains("..") {
                return Err(FerretError::InvalidRequest(name.to_string()));
            }
            let file = state.report_dir.join(name);
            std::fs::read_to_string(&file)
                .map_err(|_| FerretError::NotFound(name.to_string()))
        }
        _ => Err(FerretError::NotFound(format!("{} {}", method, path))),
    }
}

/// Read the request head plus a content-length-delimited body.
async fn read_request(stream: &mut TcpStream) -> anyhow::Result<(String, String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            anyhow::bail!("connection closed before headers");
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > MAX_REQUEST_BYTES {
            anyhow::bail!("request too large");
        }
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    if content_length > MAX_REQUEST_BYTES {
        anyhow::bail!("body too large");
    }

    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok((method, path, String::from_utf8_lossy(&body).to_string()))
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "Internal Server Error",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
