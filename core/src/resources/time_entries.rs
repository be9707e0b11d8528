//! Time entries of the current user and of workspaces.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::client::{RequestOptions, TogglClient};
use crate::error::{ApiError, Result};
use crate::fields::FieldMap;
use crate::resources::join_ids;
use crate::types::{PatchOperation, TimeEntry};

/// Filters for `GET me/time_entries`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeEntryListQuery {
    /// Entries before this date (RFC 3339 or `YYYY-MM-DD`).
    pub before: Option<String>,
    /// Entries modified since this UNIX timestamp, including deleted ones.
    pub since: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

pub(crate) const LIST_QUERY_FIELDS: FieldMap = FieldMap::new(&[
    ("before", "before"),
    ("since", "since"),
    ("start_date", "start_date"),
    ("end_date", "end_date"),
]);

/// Body for creating or updating a time entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeEntryBody {
    pub billable: Option<bool>,
    pub created_with: Option<String>,
    pub description: Option<String>,
    /// Seconds; negative for a running entry.
    pub duration: Option<i64>,
    pub duronly: Option<bool>,
    pub posted_fields: Option<Vec<String>>,
    pub project_id: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub start_date: Option<NaiveDate>,
    pub stop: Option<DateTime<Utc>>,
    pub stop_date: Option<NaiveDate>,
    /// `add` or `delete`, applied to `tags`/`tag_ids` on update.
    pub tag_action: Option<String>,
    pub tag_ids: Option<Vec<i64>>,
    pub tags: Option<Vec<String>>,
    pub task_id: Option<i64>,
    pub user_id: Option<i64>,
    pub workspace_id: Option<i64>,
}

// `postedFields` is camelCase in the service's own contract.
pub(crate) const TIME_ENTRY_FIELDS: FieldMap = FieldMap::new(&[
    ("billable", "billable"),
    ("created_with", "created_with"),
    ("description", "description"),
    ("duration", "duration"),
    ("duronly", "duronly"),
    ("posted_fields", "postedFields"),
    ("project_id", "project_id"),
    ("start", "start"),
    ("start_date", "start_date"),
    ("stop", "stop"),
    ("stop_date", "stop_date"),
    ("tag_action", "tag_action"),
    ("tag_ids", "tag_ids"),
    ("tags", "tags"),
    ("task_id", "task_id"),
    ("user_id", "user_id"),
    ("workspace_id", "workspace_id"),
]);

/// Time entries of the current user and of workspaces.
#[derive(Debug, Clone, Copy)]
pub struct TimeEntries<'a> {
    toggl: &'a TogglClient,
}

impl<'a> TimeEntries<'a> {
    pub(crate) fn new(toggl: &'a TogglClient) -> Self {
        Self { toggl }
    }

    /// Latest time entries of the current user.
    pub async fn list(&self, query: &TimeEntryListQuery) -> Result<Vec<TimeEntry>> {
        let query = LIST_QUERY_FIELDS.to_query(query)?;
        self.toggl
            .request_as("me/time_entries", RequestOptions::get().query(query))
            .await
    }

    pub async fn get(&self, time_entry_id: i64) -> Result<TimeEntry> {
        self.toggl
            .request_as(&format!("me/time_entries/{time_entry_id}"), RequestOptions::get())
            .await
    }

    /// The running time entry, or `None` when nothing is being tracked.
    pub async fn current(&self) -> Result<Option<TimeEntry>> {
        self.toggl
            .request_optional("me/time_entries/current", RequestOptions::get())
            .await
    }

    pub async fn create(&self, workspace_id: i64, body: &TimeEntryBody) -> Result<TimeEntry> {
        let body = TIME_ENTRY_FIELDS.to_body(body)?;
        self.toggl
            .request_as(
                &format!("workspaces/{workspace_id}/time_entries"),
                RequestOptions::post().body(body),
            )
            .await
    }

    pub async fn update(
        &self,
        workspace_id: i64,
        time_entry_id: i64,
        body: &TimeEntryBody,
    ) -> Result<TimeEntry> {
        let body = TIME_ENTRY_FIELDS.to_body(body)?;
        self.toggl
            .request_as(
                &format!("workspaces/{workspace_id}/time_entries/{time_entry_id}"),
                RequestOptions::put().body(body),
            )
            .await
    }

    /// Apply patch operations to several entries at once. The service applies
    /// them record by record, without rollback.
    pub async fn update_bulk(
        &self,
        workspace_id: i64,
        time_entry_ids: &[i64],
        operations: &[PatchOperation],
    ) -> Result<Value> {
        let body =
            serde_json::to_value(operations).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.toggl
            .request(
                &format!(
                    "workspaces/{workspace_id}/time_entries/{}",
                    join_ids(time_entry_ids)
                ),
                RequestOptions::patch().body(body),
            )
            .await
    }

    /// Stop a running entry.
    pub async fn stop(&self, workspace_id: i64, time_entry_id: i64) -> Result<TimeEntry> {
        self.toggl
            .request_as(
                &format!("workspaces/{workspace_id}/time_entries/{time_entry_id}/stop"),
                RequestOptions::patch(),
            )
            .await
    }

    pub async fn delete(&self, workspace_id: i64, time_entry_id: i64) -> Result<Value> {
        self.toggl
            .request(
                &format!("workspaces/{workspace_id}/time_entries/{time_entry_id}"),
                RequestOptions::delete(),
            )
            .await
    }
}
