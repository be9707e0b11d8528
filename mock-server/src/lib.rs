//! In-memory stand-in for the Toggl Track v9 API.
//!
//! Serves a subset of the real routes under `/api/v9`, keeps tags, projects,
//! project users and time entries in memory, and records every request it receives
//! (before the auth check) so tests can assert on the exact wire shape.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const API_PREFIX: &str = "/api/v9";
pub const USER_ID: i64 = 1001;
pub const DEFAULT_WORKSPACE_ID: i64 = 7;
const FIXED_AT: &str = "2024-03-01T09:00:00Z";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub client_id: Option<i64>,
    pub active: bool,
    pub is_private: bool,
    pub color: Option<String>,
    pub at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimeEntry {
    pub id: i64,
    pub workspace_id: i64,
    pub project_id: Option<i64>,
    pub user_id: i64,
    pub description: Option<String>,
    pub billable: bool,
    pub start: String,
    pub stop: Option<String>,
    pub duration: i64,
    pub tags: Option<Vec<String>>,
    pub at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProjectUser {
    pub id: i64,
    pub workspace_id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub manager: bool,
    pub labour_cost: Option<f64>,
    pub at: String,
}

/// Incoming tag payload. Unknown keys are ignored, so a misnamed field
/// simply does not land.
#[derive(Deserialize)]
pub struct TagInput {
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct ProjectInput {
    pub name: Option<String>,
    pub client_id: Option<i64>,
    pub active: Option<bool>,
    pub is_private: Option<bool>,
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct ProjectUserInput {
    pub project_id: Option<i64>,
    pub user_id: Option<i64>,
    pub manager: Option<bool>,
    pub labour_cost: Option<f64>,
}

#[derive(Deserialize)]
pub struct TimeEntryInput {
    pub description: Option<String>,
    pub project_id: Option<i64>,
    pub billable: Option<bool>,
    pub start: Option<String>,
    pub stop: Option<String>,
    pub duration: Option<i64>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct PatchOp {
    pub op: String,
    pub path: String,
    pub value: Option<Value>,
}

/// One request as seen on the wire.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct Store {
    pub tags: BTreeMap<i64, Tag>,
    pub projects: BTreeMap<i64, Project>,
    pub project_users: BTreeMap<i64, ProjectUser>,
    pub time_entries: BTreeMap<i64, TimeEntry>,
}

#[derive(Clone)]
pub struct AppState {
    authorization: Arc<String>,
    store: Arc<RwLock<Store>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    next_id: Arc<AtomicI64>,
}

impl AppState {
    /// Accept only the Basic header for `<token>:api_token`.
    pub fn with_api_token(token: &str) -> Self {
        Self::with_authorization(basic_header(&format!("{token}:api_token")))
    }

    /// Accept only the Basic header for `<email>:<password>`.
    pub fn with_basic_auth(email: &str, password: &str) -> Self {
        Self::with_authorization(basic_header(&format!("{email}:{password}")))
    }

    fn with_authorization(authorization: String) -> Self {
        Self {
            authorization: Arc::new(authorization),
            store: Arc::default(),
            requests: Arc::default(),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    pub async fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.read().await.last().cloned()
    }

    pub fn store(&self) -> &Arc<RwLock<Store>> {
        &self.store
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

fn basic_header(secret: &str) -> String {
    format!("Basic {}", BASE64.encode(secret.as_bytes()))
}

/// Router accepting the API token `test-token`.
pub fn app() -> Router {
    app_with_state(AppState::with_api_token("test-token"))
}

pub fn app_with_state(state: AppState) -> Router {
    let api = Router::new()
        .route("/me", get(get_me).put(update_me))
        .route("/me/clients", get(list_my_clients))
        .route("/me/close_account", post(|| async { StatusCode::OK }))
        .route("/me/features", get(list_my_features))
        .route("/me/organizations", get(list_my_organizations))
        .route("/me/tasks", get(|| async { Json(json!([])) }))
        .route("/me/lost_passwords", get(|| async { StatusCode::OK }))
        .route("/me/lost_passwords/confirm", post(|| async { StatusCode::OK }))
        .route("/me/lost_passwords/{code}", post(|| async { StatusCode::OK }))
        .route("/me/tags", get(list_my_tags))
        .route("/me/location", get(get_location))
        .route("/me/logged", get(|| async { StatusCode::OK }))
        .route("/me/web-timer", get(|| async { "OK" }))
        .route("/me/track_reminders", get(track_reminders))
        .route("/me/projects", get(list_my_projects))
        .route("/me/projects/paginated", get(list_my_projects))
        .route("/me/time_entries", get(list_my_time_entries))
        .route("/me/time_entries/current", get(current_time_entry))
        .route("/workspaces/{wid}/tags", get(list_tags).post(create_tag))
        .route("/workspaces/{wid}/tags/{id}", put(update_tag).delete(delete_tag))
        .route("/workspaces/{wid}/time_entries", post(create_time_entry))
        .route(
            "/workspaces/{wid}/time_entries/{id}",
            put(update_time_entry)
                .patch(bulk_patch_time_entries)
                .delete(delete_time_entry),
        )
        .route("/workspaces/{wid}/time_entries/{id}/stop", patch(stop_time_entry))
        .route("/workspaces/{wid}/projects", get(list_projects).post(create_project))
        .route(
            "/workspaces/{wid}/projects/{id}",
            get(get_project)
                .post(update_project)
                .patch(bulk_patch_projects)
                .delete(delete_project),
        )
        .route(
            "/workspaces/{wid}/project_users",
            get(list_project_users)
                .post(add_project_user)
                .patch(patch_project_users),
        )
        .route(
            "/workspaces/{wid}/project_users/{id}",
            put(update_project_user).delete(delete_project_user),
        )
        .route("/organizations/{oid}/invitations", post(create_invitation));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(middleware::from_fn_with_state(state.clone(), record_and_authorize))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn record_and_authorize(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    let header_str = |name: header::HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(String::from),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }))
        },
    };
    debug!(method = %recorded.method, path = %recorded.path, "request");
    let authorized = recorded.authorization.as_deref() == Some(state.authorization.as_str());
    state.requests.write().await.push(recorded);

    if !authorized {
        return (StatusCode::FORBIDDEN, "Incorrect username and/or password").into_response();
    }
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn get_me() -> Json<Value> {
    Json(me_json())
}

fn me_json() -> Value {
    json!({
        "id": USER_ID,
        "email": "tracker@example.com",
        "fullname": "Test Tracker",
        "default_workspace_id": DEFAULT_WORKSPACE_ID,
        "beginning_of_week": 1,
        "timezone": "UTC",
        "openid_enabled": false,
        "at": FIXED_AT,
        "created_at": FIXED_AT,
        "updated_at": FIXED_AT
    })
}

/// Echoes the profile with the scalar fields of the request merged in.
async fn update_me(Json(input): Json<Value>) -> Result<Json<Value>, (StatusCode, &'static str)> {
    let Value::Object(changes) = input else {
        return Err((StatusCode::BAD_REQUEST, "expected a JSON object"));
    };
    if changes.contains_key("password") && !changes.contains_key("current_password") {
        return Err((StatusCode::BAD_REQUEST, "current_password must be provided"));
    }
    let mut me = me_json();
    if let Value::Object(profile) = &mut me {
        for (key, value) in changes {
            if profile.contains_key(&key) {
                profile.insert(key, value);
            }
        }
    }
    Ok(Json(me))
}

async fn list_my_clients() -> Json<Value> {
    Json(json!([{"id": 31, "wid": DEFAULT_WORKSPACE_ID, "name": "Acme", "at": FIXED_AT}]))
}

async fn list_my_features() -> Json<Value> {
    Json(json!([{
        "workspace_id": DEFAULT_WORKSPACE_ID,
        "features": [{"feature_id": 50, "name": "time_audits", "enabled": true}]
    }]))
}

async fn list_my_organizations() -> Json<Value> {
    Json(json!([{
        "id": 11,
        "name": "Tracker Org",
        "pricing_plan_id": 0,
        "created_at": FIXED_AT,
        "at": FIXED_AT,
        "user_count": 1,
        "admin": true,
        "owner": true
    }]))
}

/// Serves JSON with a text content type, the way some proxies relay it.
async fn get_location() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain")],
        r#"{"city":"Tallinn","country_code":"EE","country_name":"Estonia"}"#,
    )
}

/// Serves a JSON document wrapped in a JSON string.
async fn track_reminders() -> impl IntoResponse {
    let inner = json!([{"reminder_id": 1, "threshold": 8}]).to_string();
    (
        [(header::CONTENT_TYPE, "application/json")],
        Value::String(inner).to_string(),
    )
}

async fn list_my_tags(State(state): State<AppState>) -> Json<Vec<Tag>> {
    Json(state.store.read().await.tags.values().cloned().collect())
}

async fn list_tags(State(state): State<AppState>, Path(wid): Path<i64>) -> Json<Vec<Tag>> {
    let store = state.store.read().await;
    Json(
        store
            .tags
            .values()
            .filter(|t| t.workspace_id == wid)
            .cloned()
            .collect(),
    )
}

async fn create_tag(
    State(state): State<AppState>,
    Path(wid): Path<i64>,
    Json(input): Json<TagInput>,
) -> Result<Json<Tag>, (StatusCode, &'static str)> {
    let name = input.name.ok_or((StatusCode::BAD_REQUEST, "tag name must be provided"))?;
    let tag = Tag {
        id: state.next_id(),
        workspace_id: wid,
        name,
        at: FIXED_AT.to_string(),
    };
    state.store.write().await.tags.insert(tag.id, tag.clone());
    Ok(Json(tag))
}

async fn update_tag(
    State(state): State<AppState>,
    Path((wid, id)): Path<(i64, i64)>,
    Json(input): Json<TagInput>,
) -> Result<Json<Tag>, StatusCode> {
    let mut store = state.store.write().await;
    let tag = store
        .tags
        .get_mut(&id)
        .filter(|t| t.workspace_id == wid)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        tag.name = name;
    }
    Ok(Json(tag.clone()))
}

async fn delete_tag(
    State(state): State<AppState>,
    Path((_wid, id)): Path<(i64, i64)>,
) -> StatusCode {
    match state.store.write().await.tags.remove(&id) {
        Some(_) => StatusCode::OK,
        None => StatusCode::NOT_FOUND,
    }
}

async fn list_my_time_entries(State(state): State<AppState>) -> Json<Vec<TimeEntry>> {
    Json(state.store.read().await.time_entries.values().cloned().collect())
}

async fn current_time_entry(State(state): State<AppState>) -> Json<Option<TimeEntry>> {
    let store = state.store.read().await;
    Json(store.time_entries.values().find(|e| e.stop.is_none()).cloned())
}

async fn create_time_entry(
    State(state): State<AppState>,
    Path(wid): Path<i64>,
    Json(input): Json<TimeEntryInput>,
) -> Json<TimeEntry> {
    let entry = TimeEntry {
        id: state.next_id(),
        workspace_id: wid,
        project_id: input.project_id,
        user_id: USER_ID,
        description: input.description,
        billable: input.billable.unwrap_or(false),
        start: input.start.unwrap_or_else(|| FIXED_AT.to_string()),
        duration: input.duration.unwrap_or(-1),
        stop: input.stop,
        tags: input.tags,
        at: FIXED_AT.to_string(),
    };
    state.store.write().await.time_entries.insert(entry.id, entry.clone());
    Json(entry)
}

async fn update_time_entry(
    State(state): State<AppState>,
    Path((wid, id)): Path<(i64, i64)>,
    Json(input): Json<TimeEntryInput>,
) -> Result<Json<TimeEntry>, StatusCode> {
    let mut store = state.store.write().await;
    let entry = store
        .time_entries
        .get_mut(&id)
        .filter(|e| e.workspace_id == wid)
        .ok_or(StatusCode::NOT_FOUND)?;
    if input.description.is_some() {
        entry.description = input.description;
    }
    if input.project_id.is_some() {
        entry.project_id = input.project_id;
    }
    if let Some(billable) = input.billable {
        entry.billable = billable;
    }
    if input.tags.is_some() {
        entry.tags = input.tags;
    }
    Ok(Json(entry.clone()))
}

async fn stop_time_entry(
    State(state): State<AppState>,
    Path((wid, id)): Path<(i64, i64)>,
) -> Result<Json<TimeEntry>, (StatusCode, &'static str)> {
    let mut store = state.store.write().await;
    let entry = store
        .time_entries
        .get_mut(&id)
        .filter(|e| e.workspace_id == wid)
        .ok_or((StatusCode::NOT_FOUND, "Time entry not found"))?;
    if entry.stop.is_some() {
        return Err((StatusCode::CONFLICT, "Time entry already stopped"));
    }
    entry.stop = Some("2024-03-01T10:00:00Z".to_string());
    entry.duration = 3600;
    Ok(Json(entry.clone()))
}

/// Applies `replace` operations on `/description` and `/billable` to each id
/// in a comma-separated list, reporting per-id success like the real service.
async fn bulk_patch_time_entries(
    State(state): State<AppState>,
    Path((wid, ids)): Path<(i64, String)>,
    Json(ops): Json<Vec<PatchOp>>,
) -> Result<Json<Value>, (StatusCode, &'static str)> {
    let ids = parse_ids(&ids).ok_or((StatusCode::BAD_REQUEST, "invalid time entry ids"))?;

    let mut store = state.store.write().await;
    let mut success = Vec::new();
    let mut failure = Vec::new();
    for id in ids {
        let Some(entry) = store.time_entries.get_mut(&id).filter(|e| e.workspace_id == wid) else {
            failure.push(json!({"id": id, "message": "Time entry not found"}));
            continue;
        };
        for op in &ops {
            match (op.op.as_str(), op.path.as_str(), &op.value) {
                ("replace", "/description", Some(Value::String(d))) => entry.description = Some(d.clone()),
                ("replace", "/billable", Some(Value::Bool(b))) => entry.billable = *b,
                _ => {}
            }
        }
        success.push(id);
    }
    Ok(Json(json!({"success": success, "failure": failure})))
}

fn parse_ids(ids: &str) -> Option<Vec<i64>> {
    ids.split(',').map(|id| id.parse().ok()).collect()
}

async fn delete_time_entry(
    State(state): State<AppState>,
    Path((_wid, id)): Path<(i64, i64)>,
) -> StatusCode {
    match state.store.write().await.time_entries.remove(&id) {
        Some(_) => StatusCode::OK,
        None => StatusCode::NOT_FOUND,
    }
}

async fn list_my_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.store.read().await.projects.values().cloned().collect())
}

async fn list_projects(State(state): State<AppState>, Path(wid): Path<i64>) -> Json<Vec<Project>> {
    let store = state.store.read().await;
    Json(
        store
            .projects
            .values()
            .filter(|p| p.workspace_id == wid)
            .cloned()
            .collect(),
    )
}

async fn create_project(
    State(state): State<AppState>,
    Path(wid): Path<i64>,
    Json(input): Json<ProjectInput>,
) -> Result<Json<Project>, (StatusCode, &'static str)> {
    let name = input.name.ok_or((StatusCode::BAD_REQUEST, "project name must be provided"))?;
    let project = Project {
        id: state.next_id(),
        workspace_id: wid,
        name,
        client_id: input.client_id,
        active: input.active.unwrap_or(true),
        is_private: input.is_private.unwrap_or(true),
        color: input.color,
        at: FIXED_AT.to_string(),
    };
    state.store.write().await.projects.insert(project.id, project.clone());
    Ok(Json(project))
}

async fn get_project(
    State(state): State<AppState>,
    Path((wid, id)): Path<(i64, i64)>,
) -> Result<Json<Project>, StatusCode> {
    let store = state.store.read().await;
    store
        .projects
        .get(&id)
        .filter(|p| p.workspace_id == wid)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_project(
    State(state): State<AppState>,
    Path((wid, id)): Path<(i64, i64)>,
    Json(input): Json<ProjectInput>,
) -> Result<Json<Project>, StatusCode> {
    let mut store = state.store.write().await;
    let project = store
        .projects
        .get_mut(&id)
        .filter(|p| p.workspace_id == wid)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        project.name = name;
    }
    if input.client_id.is_some() {
        project.client_id = input.client_id;
    }
    if let Some(active) = input.active {
        project.active = active;
    }
    if let Some(is_private) = input.is_private {
        project.is_private = is_private;
    }
    if input.color.is_some() {
        project.color = input.color;
    }
    Ok(Json(project.clone()))
}

async fn delete_project(
    State(state): State<AppState>,
    Path((_wid, id)): Path<(i64, i64)>,
) -> StatusCode {
    match state.store.write().await.projects.remove(&id) {
        Some(_) => StatusCode::OK,
        None => StatusCode::NOT_FOUND,
    }
}

/// Applies `replace` operations on `/name` and `/active` to each listed id.
async fn bulk_patch_projects(
    State(state): State<AppState>,
    Path((wid, ids)): Path<(i64, String)>,
    Json(ops): Json<Vec<PatchOp>>,
) -> Result<Json<Value>, (StatusCode, &'static str)> {
    let ids = parse_ids(&ids).ok_or((StatusCode::BAD_REQUEST, "invalid project ids"))?;

    let mut store = state.store.write().await;
    let mut success = Vec::new();
    let mut failure = Vec::new();
    for id in ids {
        let Some(project) = store.projects.get_mut(&id).filter(|p| p.workspace_id == wid) else {
            failure.push(json!({"id": id, "message": "Project not found"}));
            continue;
        };
        for op in &ops {
            match (op.op.as_str(), op.path.as_str(), &op.value) {
                ("replace", "/name", Some(Value::String(n))) => project.name = n.clone(),
                ("replace", "/active", Some(Value::Bool(a))) => project.active = *a,
                _ => {}
            }
        }
        success.push(id);
    }
    Ok(Json(json!({"success": success, "failure": failure})))
}

async fn list_project_users(
    State(state): State<AppState>,
    Path(wid): Path<i64>,
) -> Json<Vec<ProjectUser>> {
    let store = state.store.read().await;
    Json(
        store
            .project_users
            .values()
            .filter(|u| u.workspace_id == wid)
            .cloned()
            .collect(),
    )
}

async fn add_project_user(
    State(state): State<AppState>,
    Path(wid): Path<i64>,
    Json(input): Json<ProjectUserInput>,
) -> Result<Json<ProjectUser>, (StatusCode, &'static str)> {
    let (Some(project_id), Some(user_id)) = (input.project_id, input.user_id) else {
        return Err((StatusCode::BAD_REQUEST, "project_id and user_id must be provided"));
    };
    let member = ProjectUser {
        id: state.next_id(),
        workspace_id: wid,
        project_id,
        user_id,
        manager: input.manager.unwrap_or(false),
        labour_cost: input.labour_cost,
        at: FIXED_AT.to_string(),
    };
    state.store.write().await.project_users.insert(member.id, member.clone());
    Ok(Json(member))
}

/// Selects members through the `project_user_ids` query parameter.
async fn patch_project_users(
    State(state): State<AppState>,
    Path(wid): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, &'static str)> {
    let ids = params
        .get("project_user_ids")
        .and_then(|ids| parse_ids(ids))
        .ok_or((StatusCode::BAD_REQUEST, "project_user_ids must be provided"))?;
    let store = state.store.read().await;
    let (success, failure): (Vec<i64>, Vec<i64>) = ids.into_iter().partition(|id| {
        store
            .project_users
            .get(id)
            .is_some_and(|u| u.workspace_id == wid)
    });
    Ok(Json(json!({"success": success, "failure": failure})))
}

async fn update_project_user(
    State(state): State<AppState>,
    Path((wid, id)): Path<(i64, i64)>,
    Json(input): Json<ProjectUserInput>,
) -> Result<Json<ProjectUser>, StatusCode> {
    let mut store = state.store.write().await;
    let member = store
        .project_users
        .get_mut(&id)
        .filter(|u| u.workspace_id == wid)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(manager) = input.manager {
        member.manager = manager;
    }
    if input.labour_cost.is_some() {
        member.labour_cost = input.labour_cost;
    }
    Ok(Json(member.clone()))
}

async fn delete_project_user(
    State(state): State<AppState>,
    Path((wid, id)): Path<(i64, i64)>,
) -> StatusCode {
    let mut store = state.store.write().await;
    let owned = store
        .project_users
        .get(&id)
        .is_some_and(|u| u.workspace_id == wid);
    if !owned {
        return StatusCode::NOT_FOUND;
    }
    store.project_users.remove(&id);
    StatusCode::OK
}

async fn create_invitation(Path(oid): Path<i64>, Json(input): Json<Value>) -> Json<Value> {
    let emails = input.get("emails").cloned().unwrap_or(Value::Null);
    Json(json!({
        "data": [{"organization_id": oid, "emails": emails}],
        "messages": ["invitations sent"]
    }))
}
