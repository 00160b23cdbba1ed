use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{self, invite, note, task, user, workspace};
use crate::middleware::identity_middleware;
use crate::state::AppState;

/// Full router with global middleware applied
pub fn app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    Router::new()
        .route("/health", get(handlers::health))
        .merge(user_routes())
        .merge(workspace_routes())
        .merge(invite_routes())
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(user::user_create))
        .route("/users/:user_id", get(user::user_show))
        .route("/users/:user_id/workspaces", get(workspace::workspace_list))
        .route("/users/:user_id/invites", get(invite::invite_list))
}

fn workspace_routes() -> Router<AppState> {
    Router::new().route("/workspaces", post(workspace::workspace_create))
}

fn invite_routes() -> Router<AppState> {
    use axum::routing::delete;

    Router::new()
        .route("/workspaces/:workspace_id/invites", post(invite::invite_create))
        .route("/invites/:invite_id/accept", post(invite::invite_accept))
        .route("/invites/:invite_id/decline", post(invite::invite_decline))
        .route("/invites/:invite_id", delete(invite::invite_delete))
}

/// Routes that need a caller identity
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/workspaces/:workspace_id", get(workspace::workspace_show))
        .route("/workspaces/:workspace_id/members", get(workspace::workspace_members))
        .merge(note_routes())
        .merge(task_routes())
        .route_layer(from_fn_with_state(state, identity_middleware))
}

fn note_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/workspaces/:workspace_id/notes",
            get(note::note_list).post(note::note_create),
        )
        .route(
            "/workspaces/:workspace_id/notes/:note_id",
            get(note::note_show)
                .patch(note::note_update)
                .delete(note::note_delete),
        )
}

fn task_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/workspaces/:workspace_id/tasks",
            get(task::task_list).post(task::task_create),
        )
        .route(
            "/workspaces/:workspace_id/tasks/:task_id",
            get(task::task_show)
                .put(task::task_update)
                .delete(task::task_delete),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::auth::{generate_jwt, Claims};
    use crate::config::AppConfig;
    use crate::database::manager::ConnectionSupervisor;
    use crate::database::models::AccessLevel;
    use crate::middleware::USER_ID_HEADER;
    use crate::testing::TestContext;

    fn state_for(ctx: &TestContext, config: AppConfig) -> AppState {
        AppState::new(ConnectionSupervisor::connected(ctx.gateway()), config)
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_reflects_supervisor_readiness() {
        let ready = app(state_for(&TestContext::new(), AppConfig::development()));
        let (status, body) = call(ready, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");

        let pending = app(AppState::new(ConnectionSupervisor::new(), AppConfig::development()));
        let (status, _) = call(pending, get_request("/health")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn requests_fail_with_503_until_connected() {
        let router = app(AppState::new(ConnectionSupervisor::new(), AppConfig::development()));
        let (status, body) = call(router, get_request("/users/U1/invites")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn invite_accept_flow() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let router = app(state_for(&ctx, AppConfig::development()));

        let (status, body) = call(
            router.clone(),
            json_request(
                Method::POST,
                &format!("/workspaces/{}/invites", workspace.id),
                json!({"invited_by": "U1", "invitee_email": "bob@example.com", "access_type": "admin"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let invite_id = body["data"]["id"].as_str().unwrap().to_string();

        let accept = format!("/invites/{}/accept", invite_id);
        let (status, body) = call(router.clone(), json_request(Method::POST, &accept, json!({"user_id": "U99"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["workspace_id"], workspace.id.to_string());

        let member = ctx.membership(workspace.id, "U99").await.unwrap();
        assert_eq!(member.access_type, AccessLevel::Admin);

        let (status, body) = call(router, json_request(Method::POST, &accept, json!({"user_id": "U99"}))).await;
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn malformed_requests_are_bad_requests() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let router = app(state_for(&ctx, AppConfig::development()));

        let (status, _) = call(
            router.clone(),
            json_request(Method::POST, &format!("/workspaces/{}/invites", workspace.id), json!({"invited_by": "U1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            router.clone(),
            json_request(Method::POST, "/invites/not-a-uuid/accept", json!({"user_id": "U2"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let bad_json = Request::builder()
            .method(Method::POST)
            .uri(format!("/invites/{}/accept", Uuid::new_v4()))
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = call(router, bad_json).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn decline_mismatch_is_forbidden_then_owner_declines() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let invite = ctx.invite(&workspace, "U2", AccessLevel::Member).await;
        let router = app(state_for(&ctx, AppConfig::development()));
        let decline = format!("/invites/{}/decline", invite.id);

        let (status, _) = call(router.clone(), json_request(Method::POST, &decline, json!({"user_id": "U3"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(ctx.is_pending(invite.id).await);

        let (status, body) = call(router, json_request(Method::POST, &decline, json!({"user_id": "U2"}))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
        assert!(!ctx.is_pending(invite.id).await);
    }

    #[tokio::test]
    async fn delete_is_no_content_even_when_absent() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let invite = ctx.invite(&workspace, "U2", AccessLevel::Member).await;
        let router = app(state_for(&ctx, AppConfig::development()));

        for _ in 0..2 {
            let request = Request::builder()
                .method(Method::DELETE)
                .uri(format!("/invites/{}", invite.id))
                .body(Body::empty())
                .unwrap();
            let (status, _) = call(router.clone(), request).await;
            assert_eq!(status, StatusCode::NO_CONTENT);
        }
        assert!(!ctx.is_pending(invite.id).await);
    }

    #[tokio::test]
    async fn list_invites_is_empty_array() {
        let router = app(state_for(&TestContext::new(), AppConfig::development()));
        let (status, body) = call(router, get_request("/users/nobody/invites")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn invites_listed_by_unregistered_email() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let invite = ctx.invite(&workspace, "bob@example.com", AccessLevel::Member).await;
        let mut config = AppConfig::development();
        config.api.request_timeout_secs = 1;
        let router = app(state_for(&ctx, config));

        let (status, body) = call(router, get_request("/users/bob@example.com/invites")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["id"], invite.id.to_string());
        assert_eq!(body["data"][0]["workspace_name"], "W1");
    }

    #[tokio::test]
    async fn protected_routes_use_header_identity() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let router = app(state_for(&ctx, AppConfig::development()));
        let uri = format!("/workspaces/{}", workspace.id);

        let (status, _) = call(router.clone(), get_request(&uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let as_user = |user: &str| {
            Request::builder()
                .uri(&uri)
                .header(USER_ID_HEADER, user)
                .body(Body::empty())
                .unwrap()
        };
        let (status, body) = call(router.clone(), as_user("U1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "W1");

        let (status, _) = call(router, as_user("U9")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn protected_routes_require_bearer_when_secret_set() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let mut config = AppConfig::development();
        config.security.jwt_secret = "router-secret".into();
        let token = generate_jwt(
            &Claims::new("U1", None, chrono::Duration::minutes(5)),
            &config.security,
        )
        .unwrap();
        let router = app(state_for(&ctx, config));
        let uri = format!("/workspaces/{}/members", workspace.id);

        let header_only = Request::builder()
            .uri(&uri)
            .header(USER_ID_HEADER, "U1")
            .body(Body::empty())
            .unwrap();
        let (status, _) = call(router.clone(), header_only).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let bearer = Request::builder()
            .uri(&uri)
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(router, bearer).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["user_id"], "U1");
        assert_eq!(body["data"][0]["access_type"], "owner");
    }

    fn as_user(method: Method, uri: &str, user: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(USER_ID_HEADER, user);
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn note_lifecycle_for_members() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let router = app(state_for(&ctx, AppConfig::development()));
        let notes = format!("/workspaces/{}/notes", workspace.id);

        let (status, body) = call(
            router.clone(),
            as_user(Method::POST, &notes, "U1", Some(json!({"title": " ", "tags": ["Ops", "ops"]}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Untitled");
        assert_eq!(body["data"]["tags"], json!(["Ops"]));
        assert_eq!(body["data"]["author_id"], "U1");
        let note = format!("{}/{}", notes, body["data"]["id"].as_str().unwrap());

        let (status, _) = call(router.clone(), as_user(Method::GET, &notes, "U9", None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(router.clone(), get_request(&notes)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(
            router.clone(),
            as_user(Method::PATCH, &note, "U1", Some(json!({"content": "agenda"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Untitled");
        assert_eq!(body["data"]["content"], "agenda");

        let (status, body) = call(router.clone(), as_user(Method::DELETE, &note, "U1", None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = call(router.clone(), as_user(Method::GET, &note, "U1", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) = call(router, as_user(Method::GET, &notes, "U1", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn task_lifecycle_for_members() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let router = app(state_for(&ctx, AppConfig::development()));
        let tasks = format!("/workspaces/{}/tasks", workspace.id);

        let (status, body) = call(
            router.clone(),
            as_user(Method::POST, &tasks, "U1", Some(json!({"description": "no title"}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");

        let (status, body) = call(
            router.clone(),
            as_user(
                Method::POST,
                &tasks,
                "U1",
                Some(json!({"title": "Ship", "priority": "high", "due_date": "2026-11-02T09:00:00Z"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "todo");
        assert_eq!(body["data"]["priority"], "high");
        let task = format!("{}/{}", tasks, body["data"]["id"].as_str().unwrap());

        let (status, body) = call(
            router.clone(),
            as_user(Method::PUT, &task, "U1", Some(json!({"title": "Ship", "status": "done"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "done");
        assert_eq!(body["data"]["priority"], Value::Null);

        let (status, body) = call(router.clone(), as_user(Method::GET, &tasks, "U1", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _) = call(router.clone(), as_user(Method::DELETE, &task, "U9", None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(router.clone(), as_user(Method::DELETE, &task, "U1", None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(router, as_user(Method::DELETE, &task, "U1", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn user_and_workspace_endpoints() {
        let ctx = TestContext::new();
        let router = app(state_for(&ctx, AppConfig::development()));

        let (status, body) = call(
            router.clone(),
            json_request(
                Method::POST,
                "/users",
                json!({"id": "U5", "email": "Eve@Example.com", "first_name": "Eve", "last_name": "L", "username": "eve"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "eve@example.com");

        let (status, _) = call(router.clone(), get_request("/users/ghost")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(
            router.clone(),
            json_request(Method::POST, "/workspaces", json!({"name": "Docs", "owner_id": "U5"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Docs");

        let (status, body) = call(router, get_request("/users/U5/workspaces")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["name"], "Docs");
        assert_eq!(body["data"][0]["access_type"], "owner");
    }
}
