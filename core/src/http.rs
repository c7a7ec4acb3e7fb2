//! HTTP request/response values and the request builder.
//!
//! # Design
//! Requests and responses are plain data. `PayPalClient::build_*` produces an
//! `HttpRequest` and `PayPalClient::parse_*` consumes an `HttpResponse`; a
//! `Transport` sits between them when the client performs the round-trip
//! itself. Keeping the values inert makes every step testable without a
//! network.

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::error::PayPalError;

/// HTTP methods used by the billing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Set a header, replacing any existing header with the same name
    /// (compared case-insensitively).
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    /// Reject header values that cannot go on the wire (CR, LF, NUL and
    /// other control characters), e.g. a token pasted with a trailing newline.
    pub fn validate_headers(&self) -> Result<(), PayPalError> {
        for (name, value) in &self.headers {
            if value.chars().any(|c| c != '\t' && c.is_ascii_control()) {
                return Err(PayPalError::RequestConstruction(format!(
                    "header {name} contains control characters"
                )));
            }
        }
        Ok(())
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Build a request for `url`, JSON-encoding `body` when present.
///
/// Every request asks for JSON in `en_US`; only requests with a body carry
/// `Content-Type: application/json`.
pub fn build_request<T>(
    method: HttpMethod,
    url: &str,
    body: Option<&T>,
) -> Result<HttpRequest, PayPalError>
where
    T: Serialize + ?Sized,
{
    let parsed = Url::parse(url)
        .map_err(|e| PayPalError::RequestConstruction(format!("invalid URL {url:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(PayPalError::RequestConstruction(format!(
            "unsupported URL scheme {:?}",
            parsed.scheme()
        )));
    }

    let mut request = HttpRequest {
        method,
        url: url.to_string(),
        headers: Vec::new(),
        body: None,
    };
    request.set_header("Accept", "application/json");
    request.set_header("Accept-Language", "en_US");

    if let Some(value) = body {
        let encoded =
            serde_json::to_string(value).map_err(|e| PayPalError::Serialization(e.to_string()))?;
        request.set_header("Content-Type", "application/json");
        request.body = Some(encoded);
    }
    Ok(request)
}

/// Append percent-encoded path segments to `base`.
///
/// Empty, `.` and `..` segments are rejected: the URL parser drops or
/// resolves them, so such an id would address the parent collection or a
/// sibling path instead.
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Result<String, PayPalError> {
    if let Some(position) = segments
        .iter()
        .position(|s| s.is_empty() || *s == "." || *s == "..")
    {
        return Err(PayPalError::RequestConstruction(format!(
            "invalid path segment {:?} at position {position}",
            segments[position]
        )));
    }
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| PayPalError::RequestConstruction(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}
