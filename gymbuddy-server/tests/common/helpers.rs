//! Shared helper functions for integration tests
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{self, Request, StatusCode},
    response::Response,
    Router,
};
use gymbuddy_server::{
    create_router,
    db::{repositories::UserRepository, Database},
    state::AppState,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const PASSWORD: &str = "s3cure-pass";

pub struct TestApp {
    pub app: Router,
    pub db: Database,
}

/// Router over a fresh in-memory database with the sample exercises loaded
pub fn create_test_app() -> TestApp {
    let db = Database::in_memory().expect("Failed to create test database");
    db.initialize().expect("Failed to initialize database");
    db.seed_sample_data().expect("Failed to seed sample data");

    // Low work factor keeps registration fast in tests
    let state = AppState::new(db.clone()).with_password_iterations(1_000);
    let app = create_router(state);
    TestApp { app, db }
}

/// Send a request, optionally authenticated and with a JSON body
pub async fn send(
    app: &Router,
    method: http::Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("X-Session-Token", token);
    }

    let body = match body {
        Some(value) => {
            builder = builder.header(http::header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

pub async fn body_text(response: Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Send and decode the JSON response
pub async fn send_json(
    app: &Router,
    method: http::Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = send(app, method, uri, token, body).await;
    let status = response.status();
    (status, body_json(response).await)
}

pub async fn get_json(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send_json(app, http::Method::GET, uri, token, None).await
}

pub async fn post_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    send_json(app, http::Method::POST, uri, token, Some(body)).await
}

/// Register a user through the API and return a session token
pub async fn register_and_login(app: &Router, username: &str) -> String {
    let (status, _) = post_json(
        app,
        "/auth/api/register/",
        None,
        json!({ "username": username, "password1": PASSWORD, "password2": PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed for {username}");

    let (status, body) = post_json(
        app,
        "/auth/api/login/",
        None,
        json!({ "username": username, "password": PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {username}");

    body["session_token"].as_str().unwrap().to_string()
}

pub fn make_superuser(db: &Database, username: &str) {
    let repo = UserRepository::new(db.pool.clone());
    let user = repo.get_by_username(username).unwrap().unwrap();
    repo.set_superuser(&user.id, true).unwrap();
}

pub fn exercise_id(db: &Database, name: &str) -> i64 {
    let conn = db.connection().unwrap();
    conn.query_row(
        "SELECT id FROM exercises WHERE exercise_name = ?",
        [name],
        |row| row.get(0),
    )
    .unwrap()
}
