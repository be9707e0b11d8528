//! HTTP transport types shared by the request builder and the transport.
//!
//! # Design
//! Requests and responses are plain data. `TogglClient::build_request`
//! produces an `HttpRequest` without touching the network and
//! `TogglClient::parse_response` consumes an `HttpResponse` the same way, so
//! both halves of the dispatcher are deterministic and testable on their own.
//! Only `TogglClient::send` performs I/O.

use std::fmt;

use serde_json::Value;
use tracing::trace;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A fully resolved HTTP request described as plain data.
///
/// `url` is absolute and already carries the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Best-effort conversion of a response body into JSON.
///
/// Some transports hand back JSON as a string (sometimes a JSON string whose
/// contents are themselves a JSON document). The body is parsed once, and a
/// string result is parsed a second time. Anything that fails to parse,
/// including an empty body, is returned verbatim as `Value::String`; this
/// never fails.
///
/// String contents that are valid JSON are always re-decoded, so a body of
/// `"42"` yields the number `42` and `"null"` yields `Null`.
pub fn coerce_body(body: &str) -> Value {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(inner)) => match serde_json::from_str::<Value>(&inner) {
            Ok(parsed) => parsed,
            Err(_) => Value::String(inner),
        },
        Ok(value) => value,
        Err(e) => {
            trace!(error = %e, "response body is not JSON, returning it as a string");
            Value::String(body.to_string())
        }
    }
}
