//! Response DTOs mirroring the Toggl v9 JSON shapes.
//!
//! Nothing here is validated locally. Fields the service may leave out or
//! send as `null` are `Option`, and unknown fields are ignored, so a response
//! only fails to decode when its basic shape is wrong.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The authenticated user, as returned by `GET me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub fullname: Option<String>,
    pub api_token: Option<String>,
    pub beginning_of_week: Option<i64>,
    pub country_id: Option<i64>,
    pub default_workspace_id: Option<i64>,
    pub image_url: Option<String>,
    pub intercom_hash: Option<String>,
    pub openid_email: Option<String>,
    #[serde(default)]
    pub openid_enabled: bool,
    pub options: Option<Value>,
    pub timezone: Option<String>,
    pub at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A client (customer) record, from `GET me/clients`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceClient {
    pub id: i64,
    pub wid: i64,
    pub name: String,
    pub at: Option<DateTime<Utc>>,
}

/// IP-based location of the user's last request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub city: Option<String>,
    pub city_lat_long: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    pub feature_id: i64,
    pub name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceFeatures {
    pub workspace_id: i64,
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialInfo {
    #[serde(default)]
    pub trial: bool,
    #[serde(default)]
    pub trial_available: bool,
    pub trial_end_date: Option<DateTime<Utc>>,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub last_pricing_plan_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub pricing_plan_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub at: Option<DateTime<Utc>>,
    pub server_deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_multi_workspace_enabled: bool,
    pub suspended_at: Option<DateTime<Utc>>,
    pub user_count: Option<i64>,
    pub trial_info: Option<TrialInfo>,
    #[serde(default)]
    pub is_chargify: bool,
    pub max_workspaces: Option<i64>,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub owner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub client_id: Option<i64>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub is_private: bool,
    pub billable: Option<bool>,
    pub template: Option<bool>,
    pub auto_estimates: Option<bool>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<i64>,
    pub rate: Option<f64>,
    pub currency: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub recurring: bool,
    pub at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub server_deleted_at: Option<DateTime<Utc>>,
}

/// Membership of a user in a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectUser {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub workspace_id: i64,
    #[serde(default)]
    pub manager: bool,
    pub labour_cost: Option<f64>,
    pub rate: Option<f64>,
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub creator_id: Option<i64>,
    pub at: Option<DateTime<Utc>>,
}

/// A tracked time record. Running entries have no `stop` and a negative
/// `duration`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeEntry {
    pub id: i64,
    pub workspace_id: i64,
    pub project_id: Option<i64>,
    pub task_id: Option<i64>,
    pub user_id: Option<i64>,
    pub description: Option<String>,
    #[serde(default)]
    pub billable: bool,
    pub start: Option<DateTime<Utc>>,
    pub stop: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub duronly: bool,
    pub tags: Option<Vec<String>>,
    pub tag_ids: Option<Vec<i64>>,
    pub at: Option<DateTime<Utc>>,
    pub server_deleted_at: Option<DateTime<Utc>>,
}

impl TimeEntry {
    pub fn is_running(&self) -> bool {
        self.stop.is_none()
    }
}

/// Response to an organization invitation. The service documents neither
/// field's shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InvitationResponse {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub messages: Value,
}

/// One JSON-Patch style operation for the bulk-edit endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOperation {
    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: "replace".to_string(),
            path: path.into(),
            value: Some(value),
        }
    }

    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: "add".to_string(),
            path: path.into(),
            value: Some(value),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: "remove".to_string(),
            path: path.into(),
            value: None,
        }
    }
}
