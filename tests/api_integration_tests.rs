use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use api_error_contract::api::{handlers::AppStateInner, routes::create_router};
use api_error_contract::errors::{ErrorDispatcher, GENERIC_ERROR_MESSAGE};

fn create_test_app(development_mode: bool) -> Router {
    let state = Arc::new(AppStateInner::new("test-instance", development_mode));
    create_router(state, ErrorDispatcher::new(development_mode))
}

// Returns status, content type and raw body
async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap_or(json!({})))
}

fn sorted_keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, _, body) = get(create_test_app(false), "/health").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["instance_id"], "test-instance");
    assert_eq!(body["development_mode"], false);
}

#[tokio::test]
async fn test_generic_failure_body() {
    let (status, content_type, body) = get(create_test_app(false), "/demo/generic/409").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        sorted_keys(&body),
        ["errorCode", "errorDetail", "errorMessage", "id", "status", "statusMessage"]
    );
    assert_eq!(body["status"], 409);
    assert_eq!(body["statusMessage"], "Conflict");
    assert_eq!(body["errorCode"], "DEMO_FAILURE");
    assert_eq!(body["errorMessage"], "Requested failure");
}

#[tokio::test]
async fn test_generic_failure_with_unknown_status() {
    let (status, _, body) = get(create_test_app(false), "/demo/generic/599").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status.as_u16(), 599);
    assert!(body.get("statusMessage").is_none());
}

#[tokio::test]
async fn test_generic_failure_stacktrace_only_in_development() {
    let (_, _, body) = get(create_test_app(false), "/demo/generic/400").await;
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body.get("stacktrace").is_none());

    let (_, _, body) = get(create_test_app(true), "/demo/generic/400").await;
    let body: Value = serde_json::from_str(&body).unwrap();
    let trace = body["stacktrace"].as_str().unwrap();
    assert!(trace.starts_with("Requested failure"));
    assert!(trace.contains("Stack backtrace:"));
    assert!(trace.lines().count() > 3);
}

#[tokio::test]
async fn test_unstructured_failure_in_production() {
    let (status, _, raw) = get(create_test_app(false), "/demo/unstructured").await;
    let body: Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errorMessage"], GENERIC_ERROR_MESSAGE);
    assert_eq!(
        sorted_keys(&body),
        ["errorMessage", "id", "status", "statusMessage"]
    );
    assert!(!raw.contains("10.0.0.7"));
    assert!(!raw.contains("demo data"));
}

#[tokio::test]
async fn test_unstructured_failure_in_development() {
    let (status, _, body) = get(create_test_app(true), "/demo/unstructured").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errorMessage"], GENERIC_ERROR_MESSAGE);
    assert_eq!(body["errorDetail"], "loading demo data");

    let trace = body["stacktrace"].as_str().unwrap();
    assert!(trace.contains("connection refused"));
    assert!(trace.contains("Stack backtrace"));
}

#[tokio::test]
async fn test_panicking_handler_gets_generic_500() {
    let (status, content_type, raw) = get(create_test_app(false), "/demo/panic").await;
    let body: Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        sorted_keys(&body),
        ["errorMessage", "id", "status", "statusMessage"]
    );
    assert_eq!(body["errorMessage"], GENERIC_ERROR_MESSAGE);
    assert!(!raw.contains("replica"));
}

#[tokio::test]
async fn test_panicking_handler_in_development() {
    let (status, _, body) = get(create_test_app(true), "/demo/panic").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["errorDetail"],
        "handler panicked: no replica available for demo data"
    );
    assert!(body["stacktrace"].is_string());
}

#[tokio::test]
async fn test_bare_status_has_empty_body() {
    let (status, content_type, body) = get(create_test_app(true), "/demo/status/204").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(content_type.is_none());
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_bare_404() {
    let (status, _, body) = get(create_test_app(false), "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_create_and_fetch_user() {
    let app = create_test_app(false);
    let (status, created) = post_json(
        app.clone(),
        "/users",
        json!({"name": "Ada", "email": "ada@example.com", "age": 36}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);

    let (status, _, body) = get(app, "/users/1").await;
    let fetched: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "ada@example.com");
}

#[tokio::test]
async fn test_missing_user_is_structured_404() {
    let (status, _, body) = get(create_test_app(false), "/users/42").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusMessage"], "Not Found");
    assert_eq!(body["errorCode"], "NOT_FOUND");
    assert_eq!(body["errorDetail"], "No user with id 42");
}

#[tokio::test]
async fn test_unparseable_user_id_is_structured() {
    let (status, content_type, body) = get(create_test_app(false), "/users/abc").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body["status"], 400);
    assert_eq!(body["statusMessage"], "Bad Request");
    assert_eq!(body["errorCode"], "MALFORMED_PATH");
    assert!(body["errorDetail"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn test_out_of_range_status_path_is_structured() {
    for uri in ["/demo/generic/70000", "/demo/status/70000"] {
        let (status, content_type, body) = get(create_test_app(false), uri).await;
        let body: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body["errorCode"], "MALFORMED_PATH");
        assert_eq!(body["errorMessage"], "Request path could not be read");
    }
}

#[tokio::test]
async fn test_invalid_user_lists_every_field() {
    let (status, body) = post_json(
        create_test_app(false),
        "/users",
        json!({"email": "not-an-email", "age": -3}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errorCode"], "VALIDATION_FAILED");
    assert_eq!(body["errorMessage"], "User is invalid");

    let mut fields: Vec<&str> = body["fieldErrors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    fields.sort();
    assert_eq!(fields, ["age", "email", "name"]);

    let email = body["fieldErrors"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["field"] == "email")
        .unwrap();
    assert_eq!(email["errorCode"], "FORMAT");
    assert!(email["errorDetailUrl"].is_string());
}

#[tokio::test]
async fn test_duplicate_user_is_conflict() {
    let app = create_test_app(false);
    let user = json!({"name": "Ada", "email": "ada@example.com"});

    let (status, _) = post_json(app.clone(), "/users", user.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(app, "/users", user).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errorCode"], "CONFLICT");
}

#[tokio::test]
async fn test_malformed_body_is_structured() {
    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, content_type, body) = send(create_test_app(false), request).await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body["errorCode"], "MALFORMED_BODY");
}

#[tokio::test]
async fn test_request_id_header_is_echoed() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = create_test_app(false).oneshot(request).await.unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
}
