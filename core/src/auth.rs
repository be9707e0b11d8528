//! Credentials and the Basic `Authorization` header derived from them.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// How the client authenticates. Toggl accepts either an account's email and
/// password or its API token; both end up as HTTP Basic auth.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Sent as `<token>:api_token`.
    ApiToken(String),
    /// Sent as `<email>:<password>`.
    Basic { email: String, password: String },
}

impl Credentials {
    pub fn api_token(token: impl Into<String>) -> Self {
        Credentials::ApiToken(token.into())
    }

    pub fn basic(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Full value of the `Authorization` header, `Basic <base64>`.
    pub fn header_value(&self) -> String {
        let secret = match self {
            Credentials::ApiToken(token) => format!("{token}:api_token"),
            Credentials::Basic { email, password } => format!("{email}:{password}"),
        };
        format!("Basic {}", BASE64.encode(secret.as_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiToken(_) => f.debug_tuple("ApiToken").field(&"<redacted>").finish(),
            Credentials::Basic { email, .. } => f
                .debug_struct("Basic")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}
