//! Workspace tags.

use serde::Serialize;
use serde_json::Value;

use crate::client::{RequestOptions, TogglClient};
use crate::error::Result;
use crate::fields::FieldMap;
use crate::types::Tag;

/// Body for creating or renaming a tag.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TagBody {
    pub name: Option<String>,
}

impl TagBody {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

pub(crate) const TAG_FIELDS: FieldMap = FieldMap::new(&[("name", "name")]);

/// Workspace tags.
#[derive(Debug, Clone, Copy)]
pub struct Tags<'a> {
    toggl: &'a TogglClient,
}

impl<'a> Tags<'a> {
    pub(crate) fn new(toggl: &'a TogglClient) -> Self {
        Self { toggl }
    }

    pub async fn list(&self, workspace_id: i64) -> Result<Vec<Tag>> {
        self.toggl
            .request_as(&format!("workspaces/{workspace_id}/tags"), RequestOptions::get())
            .await
    }

    pub async fn create(&self, workspace_id: i64, body: &TagBody) -> Result<Tag> {
        let body = TAG_FIELDS.to_body(body)?;
        self.toggl
            .request_as(
                &format!("workspaces/{workspace_id}/tags"),
                RequestOptions::post().body(body),
            )
            .await
    }

    pub async fn update(&self, workspace_id: i64, tag_id: i64, body: &TagBody) -> Result<Tag> {
        let body = TAG_FIELDS.to_body(body)?;
        self.toggl
            .request_as(
                &format!("workspaces/{workspace_id}/tags/{tag_id}"),
                RequestOptions::put().body(body),
            )
            .await
    }

    pub async fn delete(&self, workspace_id: i64, tag_id: i64) -> Result<Value> {
        self.toggl
            .request(
                &format!("workspaces/{workspace_id}/tags/{tag_id}"),
                RequestOptions::delete(),
            )
            .await
    }
}
