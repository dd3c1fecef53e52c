//! HTTP response handlers.
//!
//! Every response allows any origin and disables caching, so a reload
//! always sees the current file.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::utils::mime::types::{HTML, PLAIN};

/// Respond with a file from disk.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = crate::utils::mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    send_body(request, 200, content_type, body)
}

/// Respond with an in-memory asset or page.
pub fn respond_ok(request: Request, content_type: &'static str, body: String) -> Result<()> {
    send_body(request, 200, content_type, body.into_bytes())
}

/// Respond with 404.
pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 405 for anything but GET/HEAD.
pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    send_body(request, 405, PLAIN, b"405 Method Not Allowed".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with 500 when the document could not be read.
pub fn respond_render_error(request: Request, error: &anyhow::Error) -> Result<()> {
    let error_str = format!("{error:#}");
    let msg = crate::utils::html::escape(&error_str);
    let body = format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>mdlive</title></head>\
         <body><h1>Cannot render document</h1><pre>{msg}</pre></body></html>",
    );
    send_body(request, 500, HTML, body.into_bytes())
}

pub fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

pub fn is_get_or_head(request: &Request) -> bool {
    matches!(request.method(), Method::Get | Method::Head)
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let mut response = Response::empty(StatusCode(status));
    for header in common_headers(content_type)? {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let mut response = Response::from_data(body).with_status_code(StatusCode(status));
    for header in common_headers(content_type)? {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn common_headers(content_type: &'static str) -> Result<[Header; 3]> {
    Ok([
        make_header("Content-Type", content_type)?,
        make_header("Access-Control-Allow-Origin", "*")?,
        make_header("Cache-Control", "no-cache")?,
    ])
}

fn make_header(key: &'static str, value: &'static str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow::anyhow!("invalid header {key}: {value}"))
}
