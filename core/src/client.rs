//! Request dispatcher for the Toggl v9 API.
//!
//! # Design
//! `TogglClient` holds only immutable state: the base URL, the precomputed
//! `Authorization` value, default headers and a `reqwest::Client`. A call is
//! split in three steps. `build_request` turns an endpoint plus
//! `RequestOptions` into an `HttpRequest`, `send` executes it, and
//! `parse_response` turns the `HttpResponse` into JSON. Only `send` does I/O,
//! so the other two are unit-testable. `request` chains them, and every
//! resource module goes through it.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::auth::Credentials;
use crate::config::TogglConfig;
use crate::error::{ApiError, Result};
use crate::http::{coerce_body, HttpMethod, HttpRequest, HttpResponse};
use crate::query::Query;
use crate::resources::{Invitations, Me, Projects, Tags, TimeEntries};

/// Per-call inputs to the dispatcher. Defaults to a bare `GET`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub body: Option<Value>,
    pub query: Query,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(HttpMethod::Get)
    }

    pub fn post() -> Self {
        Self::new(HttpMethod::Post)
    }

    pub fn put() -> Self {
        Self::new(HttpMethod::Put)
    }

    pub fn patch() -> Self {
        Self::new(HttpMethod::Patch)
    }

    pub fn delete() -> Self {
        Self::new(HttpMethod::Delete)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Extra header for this call only.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Asynchronous client for the Toggl v9 API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TogglClient {
    base_url: String,
    auth_header: String,
    headers: Vec<(String, String)>,
    http: reqwest::Client,
}

impl TogglClient {
    pub fn new(config: TogglConfig) -> Result<Self> {
        let http = match config.http_client {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = config.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(user_agent) = &config.user_agent {
                    builder = builder.user_agent(user_agent.as_str());
                }
                builder
                    .build()
                    .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?
            }
        };

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_header: config.credentials.header_value(),
            headers: config.headers,
            http,
        })
    }

    /// Client against the public API using an API token.
    pub fn with_api_token(token: impl Into<String>) -> Result<Self> {
        Self::new(TogglConfig::new(Credentials::api_token(token)))
    }

    /// Client against the public API using email and password.
    pub fn with_basic_auth(email: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::new(TogglConfig::new(Credentials::basic(email, password)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn me(&self) -> Me<'_> {
        Me::new(self)
    }

    pub fn time_entries(&self) -> TimeEntries<'_> {
        TimeEntries::new(self)
    }

    pub fn projects(&self) -> Projects<'_> {
        Projects::new(self)
    }

    pub fn tags(&self) -> Tags<'_> {
        Tags::new(self)
    }

    pub fn invitations(&self) -> Invitations<'_> {
        Invitations::new(self)
    }

    /// Resolve `endpoint` and `options` into a complete request.
    pub fn build_request(&self, endpoint: &str, options: &RequestOptions) -> Result<HttpRequest> {
        let mut url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        if let Some(qs) = options.query.to_query_string() {
            url.push('?');
            url.push_str(&qs);
        }

        let mut headers = vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("authorization".to_string(), self.auth_header.clone()),
        ];
        headers.extend(self.headers.iter().cloned());
        headers.extend(options.headers.iter().cloned());

        let body = options
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;

        Ok(HttpRequest {
            method: options.method,
            url,
            headers,
            body,
        })
    }

    /// Execute a request. Any status is returned as data; only transport
    /// failures are errors here.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self.http.request(request.method.into(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    /// Check the status and coerce the body to JSON.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value> {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }
        Ok(coerce_body(&response.body))
    }

    /// Perform one authenticated call and return the best-effort JSON body.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value> {
        let request = self.build_request(endpoint, &options)?;
        let response = self.send(request).await?;
        self.parse_response(response)
    }

    /// Like `request`, deserializing the body into `R`.
    pub async fn request_as<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<R> {
        let value = self.request(endpoint, options).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Like `request_as` for endpoints that may have nothing to return. A
    /// `null` or blank body yields `None`.
    pub async fn request_optional<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<R>> {
        let value = self.request(endpoint, options).await?;
        decode_optional(value)
    }
}

fn decode_optional<R: DeserializeOwned>(value: Value) -> Result<Option<R>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        value => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ApiError::Deserialization(e.to_string())),
    }
}
