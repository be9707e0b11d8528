//! Async client for the Toggl Track v9 REST API.
//!
//! # Overview
//! `TogglClient` exposes one method per remote endpoint through resource
//! handles (`me()`, `time_entries()`, `projects()`, `tags()`,
//! `invitations()`). Parameters use Rust field names and are translated to
//! the service's wire names through static field tables.
//!
//! # Design
//! - One dispatcher (`TogglClient::request`) builds the URL and query string,
//!   attaches Basic auth, sends JSON, and coerces the response to JSON.
//! - Request building and response parsing are pure and operate on the
//!   plain-data `HttpRequest` / `HttpResponse`; only `send` touches the network.
//! - No retries, caching or pagination; failures surface with the status and
//!   body the service returned.
//!
//! ```no_run
//! # async fn run() -> toggl_core::Result<()> {
//! use toggl_core::{TimeEntryBody, TogglClient};
//!
//! let toggl = TogglClient::with_api_token("my-token")?;
//! let entry = toggl
//!     .time_entries()
//!     .create(
//!         7,
//!         &TimeEntryBody {
//!             description: Some("Writing docs".into()),
//!             project_id: Some(42),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! println!("started {}", entry.id);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod fields;
pub mod http;
pub mod query;
pub mod resources;
pub mod types;

pub use auth::Credentials;
pub use client::{RequestOptions, TogglClient};
pub use config::{TogglConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{Query, QueryValue};
pub use resources::*;
pub use types::*;
