//! Construction-time client configuration.

use std::time::Duration;

use crate::auth::Credentials;

pub const DEFAULT_BASE_URL: &str = "https://api.track.toggl.com/api/v9";

/// Everything `TogglClient::new` needs. Only `credentials` is required.
///
/// `timeout` and `user_agent` are handed to the `reqwest` client builder.
/// Supplying `http_client` bypasses the builder and uses the caller's client
/// as-is. `headers` are attached to every request either way.
#[derive(Debug, Clone)]
pub struct TogglConfig {
    pub credentials: Credentials,
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub headers: Vec<(String, String)>,
    pub http_client: Option<reqwest::Client>,
}

impl TogglConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: None,
            headers: Vec::new(),
            http_client: None,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Extra header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }
}
