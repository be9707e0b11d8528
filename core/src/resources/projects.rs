//! Workspace projects and their user memberships.

use serde::Serialize;
use serde_json::Value;

use crate::client::{RequestOptions, TogglClient};
use crate::error::{ApiError, Result};
use crate::fields::FieldMap;
use crate::query::Query;
use crate::resources::join_ids;
use crate::types::{PatchOperation, Project, ProjectUser};

/// Filters for `GET workspaces/{id}/projects`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectListQuery {
    pub active: Option<bool>,
    pub billable: Option<bool>,
    pub client_ids: Option<Vec<i64>>,
    pub group_ids: Option<Vec<i64>>,
    pub name: Option<String>,
    pub only_templates: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// UNIX timestamp; only projects modified since then.
    pub since: Option<i64>,
    pub sort_field: Option<String>,
    pub uid: Option<i64>,
    pub user_ids: Option<Vec<i64>>,
    pub wid: Option<i64>,
}

// The service documents these filters in camelCase, unlike the rest of the API.
pub(crate) const LIST_QUERY_FIELDS: FieldMap = FieldMap::new(&[
    ("active", "active"),
    ("billable", "billable"),
    ("client_ids", "clientIds"),
    ("group_ids", "groupIds"),
    ("name", "name"),
    ("only_templates", "onlyTemplates"),
    ("page", "page"),
    ("per_page", "perPage"),
    ("since", "since"),
    ("sort_field", "sortField"),
    ("uid", "uid"),
    ("user_ids", "userIds"),
    ("wid", "wid"),
]);

/// Body for creating or updating a project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectBody {
    pub active: Option<bool>,
    pub auto_estimates: Option<bool>,
    pub billable: Option<bool>,
    pub client_id: Option<i64>,
    pub client_name: Option<String>,
    pub color: Option<String>,
    pub currency: Option<String>,
    pub estimated_hours: Option<f64>,
    pub foreign_id: Option<String>,
    pub is_private: Option<bool>,
    pub name: Option<String>,
    pub posted_fields: Option<Vec<String>>,
    pub recurring: Option<bool>,
    pub recurring_parameters: Option<Vec<String>>,
    pub template: Option<bool>,
    pub template_id: Option<i64>,
}

pub(crate) const PROJECT_FIELDS: FieldMap = FieldMap::new(&[
    ("active", "active"),
    ("auto_estimates", "auto_estimates"),
    ("billable", "billable"),
    ("client_id", "client_id"),
    ("client_name", "client_name"),
    ("color", "color"),
    ("currency", "currency"),
    ("estimated_hours", "estimated_hours"),
    ("foreign_id", "foreign_id"),
    ("is_private", "is_private"),
    ("name", "name"),
    ("posted_fields", "postedFields"),
    ("recurring", "recurring"),
    ("recurring_parameters", "recurring_parameters"),
    ("template", "template"),
    ("template_id", "template_id"),
]);

#[derive(Debug, Clone, Default, Serialize)]
pub struct AddProjectUser {
    pub labour_cost: Option<f64>,
    pub manager: Option<bool>,
    pub posted_fields: Option<Vec<String>>,
    pub project_id: Option<i64>,
    pub user_id: Option<i64>,
}

pub(crate) const ADD_PROJECT_USER_FIELDS: FieldMap = FieldMap::new(&[
    ("labour_cost", "labour_cost"),
    ("manager", "manager"),
    ("posted_fields", "postedFields"),
    ("project_id", "project_id"),
    ("user_id", "user_id"),
]);

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProjectUser {
    pub labour_cost: Option<f64>,
    pub manager: Option<bool>,
    pub posted_fields: Option<Vec<String>>,
}

pub(crate) const UPDATE_PROJECT_USER_FIELDS: FieldMap = FieldMap::new(&[
    ("labour_cost", "labour_cost"),
    ("manager", "manager"),
    ("posted_fields", "postedFields"),
]);

/// Workspace projects.
#[derive(Debug, Clone, Copy)]
pub struct Projects<'a> {
    toggl: &'a TogglClient,
}

impl<'a> Projects<'a> {
    pub(crate) fn new(toggl: &'a TogglClient) -> Self {
        Self { toggl }
    }

    /// Project membership endpoints.
    pub fn users(&self) -> ProjectUsers<'a> {
        ProjectUsers { toggl: self.toggl }
    }

    pub async fn list(&self, workspace_id: i64, query: &ProjectListQuery) -> Result<Vec<Project>> {
        let query = LIST_QUERY_FIELDS.to_query(query)?;
        self.toggl
            .request_as(
                &format!("workspaces/{workspace_id}/projects"),
                RequestOptions::get().query(query),
            )
            .await
    }

    pub async fn create(&self, workspace_id: i64, body: &ProjectBody) -> Result<Project> {
        let body = PROJECT_FIELDS.to_body(body)?;
        self.toggl
            .request_as(
                &format!("workspaces/{workspace_id}/projects"),
                RequestOptions::post().body(body),
            )
            .await
    }

    pub async fn get(&self, workspace_id: i64, project_id: i64) -> Result<Project> {
        self.toggl
            .request_as(
                &format!("workspaces/{workspace_id}/projects/{project_id}"),
                RequestOptions::get(),
            )
            .await
    }

    /// Update a project. The service takes this as a POST on the project URL.
    pub async fn update(
        &self,
        workspace_id: i64,
        project_id: i64,
        body: &ProjectBody,
    ) -> Result<Project> {
        let body = PROJECT_FIELDS.to_body(body)?;
        self.toggl
            .request_as(
                &format!("workspaces/{workspace_id}/projects/{project_id}"),
                RequestOptions::post().body(body),
            )
            .await
    }

    pub async fn update_bulk(
        &self,
        workspace_id: i64,
        project_ids: &[i64],
        operations: &[PatchOperation],
    ) -> Result<Value> {
        let body =
            serde_json::to_value(operations).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.toggl
            .request(
                &format!("workspaces/{workspace_id}/projects/{}", join_ids(project_ids)),
                RequestOptions::patch().body(body),
            )
            .await
    }

    pub async fn delete(&self, workspace_id: i64, project_id: i64) -> Result<Value> {
        self.toggl
            .request(
                &format!("workspaces/{workspace_id}/projects/{project_id}"),
                RequestOptions::delete(),
            )
            .await
    }
}

/// Users assigned to workspace projects.
#[derive(Debug, Clone, Copy)]
pub struct ProjectUsers<'a> {
    toggl: &'a TogglClient,
}

impl ProjectUsers<'_> {
    pub async fn list(&self, workspace_id: i64) -> Result<Vec<ProjectUser>> {
        self.toggl
            .request_as(
                &format!("workspaces/{workspace_id}/project_users"),
                RequestOptions::get(),
            )
            .await
    }

    pub async fn add(&self, workspace_id: i64, body: &AddProjectUser) -> Result<ProjectUser> {
        let body = ADD_PROJECT_USER_FIELDS.to_body(body)?;
        self.toggl
            .request_as(
                &format!("workspaces/{workspace_id}/project_users"),
                RequestOptions::post().body(body),
            )
            .await
    }

    /// Patch several project users, selected by id in the query string.
    pub async fn patch(&self, workspace_id: i64, project_user_ids: &[i64]) -> Result<Value> {
        let query = Query::new().param("project_user_ids", Some(join_ids(project_user_ids)));
        self.toggl
            .request(
                &format!("workspaces/{workspace_id}/project_users"),
                RequestOptions::patch().query(query),
            )
            .await
    }

    pub async fn update(
        &self,
        workspace_id: i64,
        project_user_id: i64,
        body: &UpdateProjectUser,
    ) -> Result<ProjectUser> {
        let body = UPDATE_PROJECT_USER_FIELDS.to_body(body)?;
        self.toggl
            .request_as(
                &format!("workspaces/{workspace_id}/project_users/{project_user_id}"),
                RequestOptions::put().body(body),
            )
            .await
    }

    pub async fn delete(&self, workspace_id: i64, project_user_id: i64) -> Result<Value> {
        self.toggl
            .request(
                &format!("workspaces/{workspace_id}/project_users/{project_user_id}"),
                RequestOptions::delete(),
            )
            .await
    }
}
