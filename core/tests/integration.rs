//! End-to-end tests against the in-memory mock of the Toggl API.
//!
//! # Design
//! Each test starts its own mock server on a random port and points a
//! `TogglClient` at it, then checks both the typed result and the request the
//! server recorded (method, path, query, auth header, body). This pins the
//! wire contract (field names, omitted fields, query encoding) end to end.

use mock_server::{AppState, RecordedRequest};
use serde_json::{json, Value};
use toggl_core::{
    AddProjectUser, ApiError, ConfirmLostPassword, Credentials, MeProjectsQuery,
    PaginatedProjectsQuery, PatchOperation, ProjectBody, ProjectListQuery, Query, RequestOptions,
    ResetLostPassword, TagBody, TasksQuery, TimeEntryBody, TimeEntryListQuery, TogglClient,
    TogglConfig, UpdateMe, UpdateProjectUser,
};

const TOKEN: &str = "abc";
// base64("abc:api_token")
const TOKEN_AUTH: &str = "Basic YWJjOmFwaV90b2tlbg==";

async fn start(state: AppState, credentials: Credentials) -> TogglClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run_with_state(listener, state));

    TogglClient::new(TogglConfig::new(credentials).base_url(format!("http://{addr}/api/v9"))).unwrap()
}

async fn start_with_token() -> (TogglClient, AppState) {
    let state = AppState::with_api_token(TOKEN);
    let client = start(state.clone(), Credentials::api_token(TOKEN)).await;
    (client, state)
}

async fn last(state: &AppState) -> RecordedRequest {
    state.last_request().await.expect("no request recorded")
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn token_auth_header_is_sent() {
    let (client, state) = start_with_token().await;

    let me = client.me().get().await.unwrap();
    assert_eq!(me.id, mock_server::USER_ID);

    let req = last(&state).await;
    assert_eq!(req.authorization.as_deref(), Some(TOKEN_AUTH));
    assert_eq!(req.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn email_password_auth_header_is_sent() {
    let state = AppState::with_basic_auth("me@example.com", "secret");
    let client = start(state.clone(), Credentials::basic("me@example.com", "secret")).await;

    client.me().get().await.unwrap();

    let req = last(&state).await;
    assert_eq!(req.authorization.as_deref(), Some("Basic bWVAZXhhbXBsZS5jb206c2VjcmV0"));
}

#[tokio::test]
async fn wrong_credentials_surface_status_and_body() {
    let state = AppState::with_api_token(TOKEN);
    let client = start(state, Credentials::api_token("wrong")).await;

    let err = client.me().get().await.unwrap_err();
    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "Incorrect username and/or password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn not_found_is_not_interpreted() {
    let (client, _state) = start_with_token().await;

    let err = client.projects().get(7, 12345).await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404, .. }));
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = TogglClient::new(
        TogglConfig::new(Credentials::api_token(TOKEN)).base_url(format!("http://{addr}/api/v9")),
    )
    .unwrap();
    let err = client.me().get().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn text_typed_json_is_parsed() {
    let (client, _state) = start_with_token().await;

    let location = client.me().location().await.unwrap().unwrap();
    assert_eq!(location.city.as_deref(), Some("Tallinn"));
    assert_eq!(location.country_code.as_deref(), Some("EE"));
}

#[tokio::test]
async fn string_encoded_json_is_parsed() {
    let (client, _state) = start_with_token().await;

    let reminders = client.me().track_reminders().await.unwrap();
    assert_eq!(reminders, json!([{"reminder_id": 1, "threshold": 8}]));
}

#[tokio::test]
async fn non_json_body_is_returned_as_string() {
    let (client, _state) = start_with_token().await;

    let timer = client.me().web_timer().await.unwrap();
    assert_eq!(timer, Value::String("OK".to_string()));
}

#[tokio::test]
async fn empty_body_is_returned_as_empty_string() {
    let (client, _state) = start_with_token().await;

    assert_eq!(client.me().logged().await.unwrap(), Value::String(String::new()));
}

#[tokio::test]
async fn generic_request_drops_absent_query_values() {
    let (client, state) = start_with_token().await;

    let options = RequestOptions::get()
        .query(Query::new().param("before", None::<&str>).param("since", Some(1709283600_i64)));
    client.request("me/time_entries", options).await.unwrap();

    let req = last(&state).await;
    assert_eq!(req.path, "/api/v9/me/time_entries");
    assert_eq!(req.query.as_deref(), Some("since=1709283600"));
}

// ---------------------------------------------------------------------------
// Time entries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_time_entry_sends_snake_case_body() {
    let (client, state) = start_with_token().await;

    let body = TimeEntryBody {
        description: Some("Test".into()),
        project_id: Some(42),
        ..Default::default()
    };
    let entry = client.time_entries().create(7, &body).await.unwrap();
    assert_eq!(entry.workspace_id, 7);
    assert_eq!(entry.project_id, Some(42));
    assert_eq!(entry.description.as_deref(), Some("Test"));

    let req = last(&state).await;
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/api/v9/workspaces/7/time_entries");
    assert!(req.query.is_none());
    assert_eq!(req.body, Some(json!({"description": "Test", "project_id": 42})));
}

#[tokio::test]
async fn time_entry_lifecycle() {
    let (client, state) = start_with_token().await;
    let entries = client.time_entries();

    assert!(entries.current().await.unwrap().is_none());

    let created = entries
        .create(
            7,
            &TimeEntryBody {
                description: Some("Deep work".into()),
                duration: Some(-1),
                created_with: Some("toggl-core".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(created.is_running());

    let current = entries.current().await.unwrap().unwrap();
    assert_eq!(current.id, created.id);

    let updated = entries
        .update(
            7,
            created.id,
            &TimeEntryBody {
                tags: Some(vec!["focus".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.tags, Some(vec!["focus".to_string()]));
    assert_eq!(updated.description.as_deref(), Some("Deep work"));
    let req = last(&state).await;
    assert_eq!(req.method, "PUT");
    assert_eq!(req.body, Some(json!({"tags": ["focus"]})));

    let stopped = entries.stop(7, created.id).await.unwrap();
    assert!(!stopped.is_running());
    assert_eq!(stopped.duration, 3600);
    let req = last(&state).await;
    assert_eq!(req.method, "PATCH");
    assert_eq!(req.path, format!("/api/v9/workspaces/7/time_entries/{}/stop", created.id));
    assert!(req.body.is_none());

    assert!(entries.current().await.unwrap().is_none());

    let listed = entries.list(&TimeEntryListQuery::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(last(&state).await.query.is_none());

    entries.delete(7, created.id).await.unwrap();
    assert_eq!(last(&state).await.method, "DELETE");
    assert!(entries.list(&TimeEntryListQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn bulk_update_joins_ids_in_path() {
    let (client, state) = start_with_token().await;
    let entries = client.time_entries();

    let first = entries.create(7, &TimeEntryBody::default()).await.unwrap();
    let second = entries.create(7, &TimeEntryBody::default()).await.unwrap();

    let ops = [PatchOperation::replace("/billable", json!(true))];
    let result = entries
        .update_bulk(7, &[first.id, second.id, 9999], &ops)
        .await
        .unwrap();
    assert_eq!(result["success"], json!([first.id, second.id]));
    assert_eq!(result["failure"][0]["id"], 9999);

    let req = last(&state).await;
    assert_eq!(req.method, "PATCH");
    assert_eq!(
        req.path,
        format!("/api/v9/workspaces/7/time_entries/{},{},9999", first.id, second.id)
    );
    assert_eq!(req.body, Some(json!([{"op": "replace", "path": "/billable", "value": true}])));

    let listed = entries.list(&TimeEntryListQuery::default()).await.unwrap();
    assert!(listed.iter().all(|e| e.billable));
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_tags_is_a_plain_get() {
    let (client, state) = start_with_token().await;

    client.tags().create(5, &TagBody::named("billable")).await.unwrap();
    client.tags().create(6, &TagBody::named("other-workspace")).await.unwrap();

    let tags = client.tags().list(5).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "billable");
    assert_eq!(tags[0].workspace_id, 5);

    let req = last(&state).await;
    assert_eq!(req.method, "GET");
    assert_eq!(req.path, "/api/v9/workspaces/5/tags");
    assert!(req.query.is_none());
    assert!(req.body.is_none());
}

#[tokio::test]
async fn tag_rename_and_delete() {
    let (client, state) = start_with_token().await;
    let tags = client.tags();

    let tag = tags.create(5, &TagBody::named("draft")).await.unwrap();
    let renamed = tags.update(5, tag.id, &TagBody::named("final")).await.unwrap();
    assert_eq!(renamed.id, tag.id);
    assert_eq!(renamed.name, "final");
    assert_eq!(last(&state).await.body, Some(json!({"name": "final"})));

    tags.delete(5, tag.id).await.unwrap();
    assert!(tags.list(5).await.unwrap().is_empty());
    assert!(client.me().tags().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_tag_without_name_surfaces_service_error() {
    let (client, state) = start_with_token().await;

    let err = client.tags().create(5, &TagBody::default()).await.unwrap_err();
    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "tag name must be provided");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(last(&state).await.body, Some(json!({})));
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn project_crud() {
    let (client, state) = start_with_token().await;
    let projects = client.projects();

    let created = projects
        .create(
            7,
            &ProjectBody {
                name: Some("Website".into()),
                is_private: Some(false),
                color: Some("#06aaf5".into()),
                posted_fields: Some(vec!["name".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.name, "Website");
    assert!(!created.is_private);
    assert_eq!(
        last(&state).await.body,
        Some(json!({"color": "#06aaf5", "is_private": false, "name": "Website", "postedFields": ["name"]}))
    );

    let fetched = projects.get(7, created.id).await.unwrap();
    assert_eq!(fetched, created);

    let updated = projects
        .update(
            7,
            created.id,
            &ProjectBody {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.active);
    let req = last(&state).await;
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, format!("/api/v9/workspaces/7/projects/{}", created.id));

    projects.delete(7, created.id).await.unwrap();
    assert!(projects.list(7, &ProjectListQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn project_list_filters_use_wire_names() {
    let (client, state) = start_with_token().await;

    let query = ProjectListQuery {
        active: Some(true),
        client_ids: Some(vec![3, 4]),
        per_page: Some(20),
        ..Default::default()
    };
    client.projects().list(7, &query).await.unwrap();

    let req = last(&state).await;
    assert_eq!(req.path, "/api/v9/workspaces/7/projects");
    assert_eq!(req.query.as_deref(), Some("active=true&clientIds=3%2C4&perPage=20"));
}

#[tokio::test]
async fn project_bulk_update_joins_ids_in_path() {
    let (client, state) = start_with_token().await;
    let projects = client.projects();

    let a = projects
        .create(7, &ProjectBody { name: Some("A".into()), ..Default::default() })
        .await
        .unwrap();
    let b = projects
        .create(7, &ProjectBody { name: Some("B".into()), ..Default::default() })
        .await
        .unwrap();

    let ops = [PatchOperation::replace("/active", json!(false))];
    let result = projects.update_bulk(7, &[a.id, b.id], &ops).await.unwrap();
    assert_eq!(result["success"], json!([a.id, b.id]));

    let req = last(&state).await;
    assert_eq!(req.method, "PATCH");
    assert_eq!(req.path, format!("/api/v9/workspaces/7/projects/{},{}", a.id, b.id));
    assert_eq!(req.body, Some(json!([{"op": "replace", "path": "/active", "value": false}])));

    assert!(!projects.get(7, a.id).await.unwrap().active);
}

#[tokio::test]
async fn project_user_lifecycle() {
    let (client, state) = start_with_token().await;
    let users = client.projects().users();

    let added = users
        .add(
            7,
            &AddProjectUser {
                project_id: Some(10),
                user_id: Some(20),
                manager: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!((added.project_id, added.user_id, added.workspace_id), (10, 20, 7));
    assert!(added.manager);
    let req = last(&state).await;
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/api/v9/workspaces/7/project_users");
    assert_eq!(req.body, Some(json!({"manager": true, "project_id": 10, "user_id": 20})));

    let listed = users.list(7).await.unwrap();
    assert_eq!(listed, vec![added.clone()]);

    let patched = users.patch(7, &[added.id, 9999]).await.unwrap();
    assert_eq!(patched["success"], json!([added.id]));
    let req = last(&state).await;
    assert_eq!(req.method, "PATCH");
    assert_eq!(req.path, "/api/v9/workspaces/7/project_users");
    assert_eq!(req.query, Some(format!("project_user_ids={}%2C9999", added.id)));

    let updated = users
        .update(
            7,
            added.id,
            &UpdateProjectUser {
                labour_cost: Some(12.5),
                posted_fields: Some(vec!["labour_cost".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.labour_cost, Some(12.5));
    let req = last(&state).await;
    assert_eq!(req.method, "PUT");
    assert_eq!(req.path, format!("/api/v9/workspaces/7/project_users/{}", added.id));
    assert_eq!(req.body, Some(json!({"labour_cost": 12.5, "postedFields": ["labour_cost"]})));

    users.delete(7, added.id).await.unwrap();
    let req = last(&state).await;
    assert_eq!(req.method, "DELETE");
    assert_eq!(req.path, format!("/api/v9/workspaces/7/project_users/{}", added.id));
    assert!(users.list(7).await.unwrap().is_empty());
}

#[tokio::test]
async fn project_user_delete_is_scoped_to_workspace() {
    let (client, _state) = start_with_token().await;
    let users = client.projects().users();

    let added = users
        .add(7, &AddProjectUser { project_id: Some(1), user_id: Some(2), ..Default::default() })
        .await
        .unwrap();
    let err = users.delete(8, added.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(users.list(7).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Me & invitations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn me_projects_query_is_omitted_when_unset() {
    let (client, state) = start_with_token().await;

    client
        .projects()
        .create(7, &ProjectBody { name: Some("Internal".into()), ..Default::default() })
        .await
        .unwrap();

    let projects = client.me().projects(&MeProjectsQuery::default()).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert!(last(&state).await.query.is_none());

    let query = MeProjectsQuery { include_archived: Some(true) };
    client.me().projects(&query).await.unwrap();
    assert_eq!(last(&state).await.query.as_deref(), Some("include_archived=true"));
}

#[tokio::test]
async fn me_update_puts_profile_changes() {
    let (client, state) = start_with_token().await;

    let body = UpdateMe {
        fullname: Some("Renamed Tracker".into()),
        timezone: Some("Europe/Tallinn".into()),
        ..Default::default()
    };
    let me = client.me().update(&body).await.unwrap();
    assert_eq!(me.fullname.as_deref(), Some("Renamed Tracker"));
    assert_eq!(me.timezone.as_deref(), Some("Europe/Tallinn"));

    let req = last(&state).await;
    assert_eq!(req.method, "PUT");
    assert_eq!(req.path, "/api/v9/me");
    assert_eq!(req.body, Some(json!({"fullname": "Renamed Tracker", "timezone": "Europe/Tallinn"})));
}

#[tokio::test]
async fn me_password_change_without_current_password_is_rejected() {
    let (client, _state) = start_with_token().await;

    let body = UpdateMe { password: Some("new-pass".into()), ..Default::default() };
    let err = client.me().update(&body).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn me_read_endpoints_hit_their_paths() {
    let (client, state) = start_with_token().await;
    let me = client.me();

    let clients = me.clients().await.unwrap();
    assert_eq!(clients[0].name, "Acme");
    let req = last(&state).await;
    assert_eq!((req.method.as_str(), req.path.as_str()), ("GET", "/api/v9/me/clients"));

    let features = me.features().await.unwrap();
    assert_eq!(features[0].workspace_id, mock_server::DEFAULT_WORKSPACE_ID);
    assert!(features[0].features[0].enabled);
    let req = last(&state).await;
    assert_eq!((req.method.as_str(), req.path.as_str()), ("GET", "/api/v9/me/features"));

    let organizations = me.organizations().await.unwrap();
    assert_eq!(organizations[0].id, 11);
    assert!(organizations[0].owner);
    let req = last(&state).await;
    assert_eq!((req.method.as_str(), req.path.as_str()), ("GET", "/api/v9/me/organizations"));
}

#[tokio::test]
async fn close_account_is_a_bodiless_post() {
    let (client, state) = start_with_token().await;

    client.me().close_account().await.unwrap();

    let req = last(&state).await;
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/api/v9/me/close_account");
    assert!(req.body.is_none());
}

#[tokio::test]
async fn me_tasks_and_paginated_projects_send_queries() {
    let (client, state) = start_with_token().await;

    let query = TasksQuery { since: Some(1709283600), include_not_active: Some(true) };
    assert_eq!(client.me().tasks(&query).await.unwrap(), json!([]));
    let req = last(&state).await;
    assert_eq!(req.method, "GET");
    assert_eq!(req.path, "/api/v9/me/tasks");
    assert_eq!(req.query.as_deref(), Some("since=1709283600&include_not_active=true"));

    let query = PaginatedProjectsQuery { start_project_id: Some(5) };
    client.me().projects_paginated(&query).await.unwrap();
    let req = last(&state).await;
    assert_eq!(req.method, "GET");
    assert_eq!(req.path, "/api/v9/me/projects/paginated");
    assert_eq!(req.query.as_deref(), Some("start_project_id=5"));
}

#[tokio::test]
async fn lost_password_flow_targets_its_endpoints() {
    let (client, state) = start_with_token().await;
    let lost = client.me().lost_password();

    lost.verify().await.unwrap();
    let req = last(&state).await;
    assert_eq!(req.method, "GET");
    assert_eq!(req.path, "/api/v9/me/lost_passwords");

    let confirm = ConfirmLostPassword {
        code: Some("c0de".into()),
        password: Some("new-pass".into()),
        user_id: Some(mock_server::USER_ID),
    };
    lost.confirm(&confirm).await.unwrap();
    let req = last(&state).await;
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/api/v9/me/lost_passwords/confirm");
    assert_eq!(
        req.body,
        Some(json!({"code": "c0de", "password": "new-pass", "user_id": mock_server::USER_ID}))
    );

    let reset = ResetLostPassword { email: Some("tracker@example.com".into()) };
    lost.reset("t0ken", &reset).await.unwrap();
    let req = last(&state).await;
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/api/v9/me/lost_passwords/t0ken");
    assert_eq!(req.body, Some(json!({"email": "tracker@example.com"})));
}

#[tokio::test]
async fn invitation_is_posted_to_organization() {
    let (client, state) = start_with_token().await;

    let body = toggl_core::InvitationBody {
        emails: Some(vec!["new@example.com".into()]),
        workspaces: None,
    };
    let resp = client.invitations().create(11, &body).await.unwrap();
    assert_eq!(resp.messages, json!(["invitations sent"]));
    assert_eq!(resp.data[0]["organization_id"], 11);

    let req = last(&state).await;
    assert_eq!(req.path, "/api/v9/organizations/11/invitations");
    assert_eq!(req.body, Some(json!({"emails": ["new@example.com"]})));
}
