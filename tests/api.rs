//! End-to-end tests over the HTTP surface, driven without a socket.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use taskdeck::api::{router, AppState};
use taskdeck::store::{InMemoryStore, StoreType};
use taskdeck::Config;

fn app() -> Router {
    let config = Config::new(
        "test-secret".to_string(),
        PathBuf::from(":memory:"),
        StoreType::Memory,
    );
    let state = Arc::new(AppState {
        config,
        store: Arc::new(InMemoryStore::new()),
    });
    router(state)
}

fn post(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn patch(uri: &str, body: Value, token: &str) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request builds")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

/// Register `email` and return a bearer token for it.
async fn register_and_login(app: &Router, name: &str, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(post(
            "/api/v1/auth/register",
            json!({"name": name, "email": email, "password": "correct-horse"}),
            None,
        ))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post(
            "/api/v1/auth/login",
            json!({"email": email, "password": "correct-horse"}),
            None,
        ))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["access_token"]
        .as_str()
        .expect("token present")
        .to_string()
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = app();
    let payload = json!({"name": "Ada", "email": "ada@example.com", "password": "correct-horse"});

    let response = app
        .clone()
        .oneshot(post("/api/v1/auth/register", payload.clone(), None))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["email"], "ada@example.com");

    let response = app
        .clone()
        .oneshot(post("/api/v1/auth/register", payload, None))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_reports_field_errors() {
    let app = app();
    let response = app
        .clone()
        .oneshot(post(
            "/api/v1/auth/register",
            json!({"name": "", "email": "nope", "password": "short"}),
            None,
        ))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    let errors = body["errors"].as_array().expect("errors list present");
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|e| e["field"].is_string() && e["message"].is_string()));
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = app();
    register_and_login(&app, "Ada", "ada@example.com").await;

    let response = app
        .clone()
        .oneshot(post(
            "/api/v1/auth/login",
            json!({"email": "ada@example.com", "password": "wrong-horse"}),
            None,
        ))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(post(
            "/api/v1/auth/login",
            json!({"email": "nobody@example.com", "password": "correct-horse"}),
            None,
        ))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn task_endpoints_require_a_token() {
    let app = app();
    let response = app
        .clone()
        .oneshot(get("/api/v1/tasks", None))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get("/api/v1/tasks", Some("not-a-jwt")))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_task_validates_and_detects_conflicts() {
    let app = app();
    let token = register_and_login(&app, "Ada", "ada@example.com").await;

    let response = app
        .clone()
        .oneshot(post("/api/v1/tasks", json!({"title": "Gym"}), Some(&token)))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Gym");
    assert_eq!(body["card_color"], "#ffffff");
    assert_eq!(body["is_completed"], false);

    // Same owner, same title.
    let response = app
        .clone()
        .oneshot(post("/api/v1/tasks", json!({"title": "Gym"}), Some(&token)))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Another owner can reuse the title.
    let other = register_and_login(&app, "Bob", "bob@example.com").await;
    let response = app
        .clone()
        .oneshot(post("/api/v1/tasks", json!({"title": "Gym"}), Some(&other)))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::CREATED);

    // Recurring without a type is a bad request, not a validation error.
    let response = app
        .clone()
        .oneshot(post(
            "/api/v1/tasks",
            json!({"title": "Stretch", "is_recurring": true}),
            Some(&token),
        ))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown recurrence types are rejected at deserialization.
    let response = app
        .clone()
        .oneshot(post(
            "/api/v1/tasks",
            json!({"title": "Stretch", "is_recurring": true, "recurrence_type": "yearly"}),
            Some(&token),
        ))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Schema-level failures come back as a field-error list.
    let response = app
        .clone()
        .oneshot(post("/api/v1/tasks", json!({"title": "  "}), Some(&token)))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn list_today_and_toggle_flow() {
    let app = app();
    let token = register_and_login(&app, "Ada", "ada@example.com").await;

    let today = chrono::Utc::now().date_naive();
    let scheduled = format!("{}T12:00:00Z", today);

    let response = app
        .clone()
        .oneshot(post(
            "/api/v1/tasks",
            json!({"title": "Dentist", "scheduled_date": scheduled, "tags": [" health ", ""]}),
            Some(&token),
        ))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["tags"], json!(["health"]));
    let task_id = created["id"].as_str().expect("id present").to_string();

    let response = app
        .clone()
        .oneshot(post(
            "/api/v1/tasks",
            json!({"title": "Stretch", "is_recurring": true, "recurrence_type": "daily"}),
            Some(&token),
        ))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::CREATED);

    // Paginated list with a search hit.
    let response = app
        .clone()
        .oneshot(get("/api/v1/tasks?search=dent&limit=10", Some(&token)))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["items_per_page"], 10);
    assert_eq!(body["data"][0]["title"], "Dentist");

    // Today's list includes the recurring task; the count does not.
    let response = app
        .clone()
        .oneshot(get("/api/v1/tasks/today", Some(&token)))
        .await
        .expect("request succeeds");
    let body = body_json(response).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["today_tasks"][0]["title"], "Dentist");
    assert_eq!(body["today_tasks"][1]["title"], "Stretch");

    let response = app
        .clone()
        .oneshot(get("/api/v1/tasks/today/count", Some(&token)))
        .await
        .expect("request succeeds");
    let body = body_json(response).await;
    assert_eq!(body["today_task_count"], 1);

    // Toggle completion, twice: same end state.
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(patch(
                &format!("/api/v1/tasks/{}", task_id),
                json!({"is_completed": true}),
                &token,
            ))
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["is_completed"], true);
    }

    // Non-boolean flag is a bad request.
    let response = app
        .clone()
        .oneshot(patch(
            &format!("/api/v1/tasks/{}", task_id),
            json!({"is_completed": "yes"}),
            &token,
        ))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Another user cannot toggle it: scoped lookup answers NotFound.
    let other = register_and_login(&app, "Bob", "bob@example.com").await;
    let response = app
        .clone()
        .oneshot(patch(
            &format!("/api/v1/tasks/{}", task_id),
            json!({"is_completed": false}),
            &other,
        ))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_routes_answer_json_404() {
    let app = app();
    let response = app
        .clone()
        .oneshot(get("/api/v1/nope", None))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn health_does_not_require_auth() {
    let app = app();
    let response = app
        .clone()
        .oneshot(get("/api/health", None))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["persistent_store"], false);
}
