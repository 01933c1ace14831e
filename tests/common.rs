/// Common test utilities for Bookmarket integration tests
///
/// Every test gets a fresh shared-cache in-memory database behind the full
/// router, and talks to it through `tower::ServiceExt::oneshot` the way an
/// HTTP client would.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookmarket::{
    auth::hash_password,
    create_app,
    db::{init_pool, DbPool},
    models::User,
    repo,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// The application together with its database
pub struct TestApp {
    pub app: Router,
    pub pool: Arc<DbPool>,
}

/// Creates a test application backed by a fresh in-memory database
pub fn create_test_app() -> TestApp {
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = Arc::new(init_pool(&database_url).unwrap());

    let conn = &mut pool.get().unwrap();
    bookmarket::run_migrations(conn).unwrap();

    TestApp {
        app: create_app(pool.clone()),
        pool,
    }
}

/// Sends one request and returns the status with the parsed JSON body
///
/// An empty body comes back as `Value::Null`.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, token, Some(body)).await
}

/// Signs up `username` with the password `password123`, then signs in
///
/// ### Returns
///
/// The user's id and a bearer token
pub async fn register(app: &Router, username: &str) -> (String, String) {
    let email = format!("{}@example.com", username);
    let (status, user) = post(
        app,
        "/auth/signup",
        None,
        json!({"username": username, "email": email, "password": "password123"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", user);

    let token = signin(app, &email, "password123").await;
    (user["id"].as_str().unwrap().to_string(), token)
}

/// Signs in and returns the bearer token
pub async fn signin(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = post(app, "/auth/signin", None, json!({"email": email, "password": password})).await;
    assert_eq!(status, StatusCode::OK, "signin failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

/// Inserts an administrator directly and signs them in
pub async fn register_admin(test_app: &TestApp) -> String {
    let mut admin = User::new(
        "admin".to_string(),
        "admin@example.com".to_string(),
        hash_password("password123"),
    );
    admin.set_admin(true);
    repo::insert_user(&test_app.pool, &admin).await.unwrap();

    signin(&test_app.app, "admin@example.com", "password123").await
}

/// Lists a book for sale and exchange; `extra` fields override the defaults
pub async fn create_book(app: &Router, token: &str, title: &str, extra: Value) -> Value {
    let mut payload = json!({
        "title": title,
        "author": "Test Author",
        "isbn": "9780000000000",
        "genre": "Fiction",
        "condition": "good",
        "price": 10.0,
        "for_exchange": true,
    });
    if let (Some(payload), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
        payload.extend(extra.clone());
    }

    let (status, book) = post(app, "/books", Some(token), payload).await;
    assert_eq!(status, StatusCode::OK, "create book failed: {}", book);
    book
}
