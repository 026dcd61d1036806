//! Conversion between `tiny_http` and the in-process request/response types.

use crate::utils::mime::types::PLAIN;
use crate::web;
use anyhow::{Result, anyhow};
use tiny_http::{Header, Request, Response, StatusCode};

/// Read method, path and headers of an incoming request.
///
/// Returns `None` when the URL path is not valid UTF-8 once decoded.
pub fn to_web_request(request: &Request) -> Option<web::Request> {
    let path = super::path::normalize_url(request.url())?;
    let mut converted = web::Request::new(web::Method::parse(request.method().as_str()), path);
    for header in request.headers() {
        converted
            .headers
            .append(header.field.as_str().as_str(), header.value.as_str());
    }
    Some(converted)
}

/// Send a dispatched response back to the client.
pub fn send(request: Request, response: web::Response) -> Result<()> {
    let mut out = Response::from_data(response.body).with_status_code(StatusCode(response.status));
    for (name, value) in response.headers.iter() {
        out.add_header(make_header(name, value)?);
    }
    request.respond(out)?;
    Ok(())
}

/// Respond with 400 Bad Request (undecodable path).
pub fn respond_bad_request(request: Request) -> Result<()> {
    send_plain(request, 400, "400 Bad Request")
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_plain(request, 503, "503 Service Unavailable")
}

fn send_plain(request: Request, status: u16, body: &str) -> Result<()> {
    let response = Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", PLAIN)?);
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header `{key}: {value}`"))
}
