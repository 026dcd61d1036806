//! Request and response values, independent of the server backend.

use std::fmt;

use crate::utils::date::DateTimeUtc;

/// Headers removed from a 304 response.
const ENTITY_HEADERS: [&str; 7] = [
    "Allow",
    "Content-Encoding",
    "Content-Language",
    "Content-Length",
    "Content-MD5",
    "Content-Type",
    "Last-Modified",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Other(String),
}

impl Method {
    pub fn parse(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Head => f.write_str("HEAD"),
            Self::Other(method) => f.write_str(method),
        }
    }
}

/// Ordered header list with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Append without replacing existing values.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Replace every value of `name`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.0.push((name, value.into()));
    }

    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Decoded path without query string, always starting with `/`.
    pub path: String,
    pub headers: Headers,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Entity tags from `If-None-Match`, weak prefixes stripped.
    pub fn etags(&self) -> Vec<&str> {
        self.header("If-None-Match")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(strip_weak)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new(200, Vec::new())
    }
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        let mut response = Self::new(status, body);
        response.set_header("Content-Type", crate::utils::mime::types::PLAIN);
        response
    }

    pub fn not_found() -> Self {
        Self::text(404, "404 Not Found")
    }

    pub fn server_error() -> Self {
        Self::text(500, "500 Internal Server Error")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Turn this into a bodyless 304, dropping entity headers.
    pub fn set_not_modified(&mut self) {
        self.status = 304;
        self.body.clear();
        for name in ENTITY_HEADERS {
            self.remove_header(name);
        }
    }

    /// Whether the validators of `request` match this response.
    ///
    /// With `If-None-Match`, one of its tags (or `*`) must equal `ETag`, and
    /// `If-Modified-Since`, when also present, must match `Last-Modified`.
    /// Without it, `If-Modified-Since` alone decides. Only GET and HEAD
    /// requests can be answered with a 304.
    pub fn is_not_modified(&self, request: &Request) -> bool {
        if !request.method.is_safe() {
            return false;
        }

        let modified_since = request.header("If-Modified-Since");
        let since_matches = || match (modified_since, self.header("Last-Modified")) {
            (Some(since), Some(last_modified)) => date_not_after(last_modified, since),
            _ => false,
        };

        if request.header("If-None-Match").is_some() {
            let Some(etag) = self.header("ETag").map(strip_weak) else {
                return false;
            };
            let tag_matches = request
                .etags()
                .into_iter()
                .any(|tag| tag == "*" || tag == etag);
            tag_matches && (modified_since.is_none() || since_matches())
        } else {
            modified_since.is_some() && since_matches()
        }
    }
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// `last_modified <= since`, comparing the raw strings when either date is
/// not an IMF-fixdate.
fn date_not_after(last_modified: &str, since: &str) -> bool {
    if last_modified == since {
        return true;
    }
    match (
        DateTimeUtc::parse_http(last_modified),
        DateTimeUtc::parse_http(since),
    ) {
        (Some(last_modified), Some(since)) => last_modified.to_unix() <= since.to_unix(),
        _ => false,
    }
}
