//! The authenticated user's own resources and password recovery.

use serde::Serialize;
use serde_json::Value;

use crate::client::{RequestOptions, TogglClient};
use crate::error::Result;
use crate::fields::FieldMap;
use crate::types::{CurrentUser, Location, Organization, Project, Tag, WorkspaceClient, WorkspaceFeatures};

/// Profile changes for `PUT me`. Changing the password requires
/// `current_password`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateMe {
    pub beginning_of_week: Option<i64>,
    pub country_id: Option<i64>,
    pub current_password: Option<String>,
    pub default_workspace_id: Option<i64>,
    pub email: Option<String>,
    pub fullname: Option<String>,
    pub password: Option<String>,
    pub timezone: Option<String>,
}

pub(crate) const UPDATE_ME_FIELDS: FieldMap = FieldMap::new(&[
    ("beginning_of_week", "beginning_of_week"),
    ("country_id", "country_id"),
    ("current_password", "current_password"),
    ("default_workspace_id", "default_workspace_id"),
    ("email", "email"),
    ("fullname", "fullname"),
    ("password", "password"),
    ("timezone", "timezone"),
]);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MeProjectsQuery {
    pub include_archived: Option<bool>,
}

pub(crate) const PROJECTS_QUERY_FIELDS: FieldMap =
    FieldMap::new(&[("include_archived", "include_archived")]);

#[derive(Debug, Clone, Default, Serialize)]
pub struct PaginatedProjectsQuery {
    pub start_project_id: Option<i64>,
}

pub(crate) const PAGINATED_QUERY_FIELDS: FieldMap =
    FieldMap::new(&[("start_project_id", "start_project_id")]);

#[derive(Debug, Clone, Default, Serialize)]
pub struct TasksQuery {
    /// UNIX timestamp.
    pub since: Option<i64>,
    pub include_not_active: Option<bool>,
}

pub(crate) const TASKS_QUERY_FIELDS: FieldMap = FieldMap::new(&[
    ("since", "since"),
    ("include_not_active", "include_not_active"),
]);

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfirmLostPassword {
    pub code: Option<String>,
    pub password: Option<String>,
    pub user_id: Option<i64>,
}

pub(crate) const CONFIRM_FIELDS: FieldMap = FieldMap::new(&[
    ("code", "code"),
    ("password", "password"),
    ("user_id", "user_id"),
]);

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResetLostPassword {
    pub email: Option<String>,
}

pub(crate) const RESET_FIELDS: FieldMap = FieldMap::new(&[("email", "email")]);

/// The authenticated user's own resources.
#[derive(Debug, Clone, Copy)]
pub struct Me<'a> {
    toggl: &'a TogglClient,
}

impl<'a> Me<'a> {
    pub(crate) fn new(toggl: &'a TogglClient) -> Self {
        Self { toggl }
    }

    pub async fn get(&self) -> Result<CurrentUser> {
        self.toggl.request_as("me", RequestOptions::get()).await
    }

    pub async fn update(&self, body: &UpdateMe) -> Result<CurrentUser> {
        let body = UPDATE_ME_FIELDS.to_body(body)?;
        self.toggl.request_as("me", RequestOptions::put().body(body)).await
    }

    pub async fn clients(&self) -> Result<Vec<WorkspaceClient>> {
        self.toggl.request_as("me/clients", RequestOptions::get()).await
    }

    pub async fn close_account(&self) -> Result<Value> {
        self.toggl.request("me/close_account", RequestOptions::post()).await
    }

    pub async fn features(&self) -> Result<Vec<WorkspaceFeatures>> {
        self.toggl.request_as("me/features", RequestOptions::get()).await
    }

    /// Last known IP-based location; `None` when the service has no data.
    pub async fn location(&self) -> Result<Option<Location>> {
        self.toggl.request_optional("me/location", RequestOptions::get()).await
    }

    pub async fn logged(&self) -> Result<Value> {
        self.toggl.request("me/logged", RequestOptions::get()).await
    }

    /// Password recovery endpoints.
    pub fn lost_password(&self) -> LostPassword<'a> {
        LostPassword { toggl: self.toggl }
    }

    pub async fn organizations(&self) -> Result<Vec<Organization>> {
        self.toggl.request_as("me/organizations", RequestOptions::get()).await
    }

    pub async fn projects(&self, query: &MeProjectsQuery) -> Result<Vec<Project>> {
        let query = PROJECTS_QUERY_FIELDS.to_query(query)?;
        self.toggl
            .request_as("me/projects", RequestOptions::get().query(query))
            .await
    }

    pub async fn projects_paginated(&self, query: &PaginatedProjectsQuery) -> Result<Vec<Project>> {
        let query = PAGINATED_QUERY_FIELDS.to_query(query)?;
        self.toggl
            .request_as("me/projects/paginated", RequestOptions::get().query(query))
            .await
    }

    pub async fn tags(&self) -> Result<Vec<Tag>> {
        self.toggl.request_as("me/tags", RequestOptions::get()).await
    }

    /// Tasks from projects the user participates in.
    pub async fn tasks(&self, query: &TasksQuery) -> Result<Value> {
        let query = TASKS_QUERY_FIELDS.to_query(query)?;
        self.toggl
            .request("me/tasks", RequestOptions::get().query(query))
            .await
    }

    pub async fn track_reminders(&self) -> Result<Value> {
        self.toggl.request("me/track_reminders", RequestOptions::get()).await
    }

    pub async fn web_timer(&self) -> Result<Value> {
        self.toggl.request("me/web-timer", RequestOptions::get()).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LostPassword<'a> {
    toggl: &'a TogglClient,
}

impl LostPassword<'_> {
    /// Check that a password reset request is valid.
    pub async fn verify(&self) -> Result<Value> {
        self.toggl.request("me/lost_passwords", RequestOptions::get()).await
    }

    /// Confirm a reset with the emailed code and the new password.
    pub async fn confirm(&self, body: &ConfirmLostPassword) -> Result<Value> {
        let body = CONFIRM_FIELDS.to_body(body)?;
        self.toggl
            .request("me/lost_passwords/confirm", RequestOptions::post().body(body))
            .await
    }

    /// Start a reset for `email`, using the given token code.
    pub async fn reset(&self, token_code: &str, body: &ResetLostPassword) -> Result<Value> {
        let body = RESET_FIELDS.to_body(body)?;
        self.toggl
            .request(
                &format!("me/lost_passwords/{token_code}"),
                RequestOptions::post().body(body),
            )
            .await
    }
}
