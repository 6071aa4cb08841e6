use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use sea_orm::DatabaseConnection;
use tower::ServiceExt;

use yamdb_api::infra::mail::MailTransport;
use yamdb_api::router::build_router;
use yamdb_api::state::AppState;
use yamdb_domain::role::Role;
use yamdb_testing::auth::{MockAuth, test_secret};

/// Router over a connection that was never opened; only paths that fail
/// before touching storage are exercised.
fn offline_router() -> Router {
    build_router(AppState {
        db: DatabaseConnection::default(),
        jwt_secret: test_secret(),
        access_token_ttl_secs: 3600,
        mailer: MailTransport::from_config(None, "noreply@yamdb.fake"),
    })
}

async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = offline_router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn should_answer_liveness_without_database() {
    let (status, _) = send(Request::get("/healthz").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    let (status, _) = send(Request::get("/readyz").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_reject_anonymous_profile_request() {
    let (status, body) = send(
        Request::get("/api/v1/users/me")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_reject_malformed_bearer_token() {
    let (status, body) = send(
        Request::get("/api/v1/users/me")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "INVALID_TOKEN");
}

#[tokio::test]
async fn should_reject_anonymous_catalog_write() {
    let (status, body) = send(
        Request::post("/api/v1/categories")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Books","slug":"books"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_reject_malformed_query_string() {
    let (status, body) = send(
        Request::get("/api/v1/titles?year=nineteen")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "VALIDATION_ERROR");
    assert!(body["errors"]["query"].is_array());
}

#[tokio::test]
async fn should_validate_signup_before_storage() {
    let (status, body) = send(
        Request::post("/api/v1/auth/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"nope","username":"me"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["username"].is_array());
}

#[tokio::test]
async fn should_fail_closed_when_caller_cannot_be_reloaded() {
    let mut request = Request::get("/api/v1/users/me")
        .body(Body::empty())
        .unwrap();
    request
        .headers_mut()
        .extend(MockAuth::new(1, Role::Admin).headers());

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "INTERNAL");
}

fn post_json(uri: &str, body: &'static str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn should_require_signup_email() {
    let (status, body) = send(post_json("/api/v1/auth/signup", r#"{"username":"bob"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "VALIDATION_ERROR");
    assert_eq!(body["errors"]["email"][0], "This field is required.");
}

#[tokio::test]
async fn should_require_confirmation_code_for_token() {
    let (status, body) = send(post_json("/api/v1/auth/token", r#"{"username":"bob"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "VALIDATION_ERROR");
    assert_eq!(body["errors"]["confirmation_code"][0], "This field is required.");
}

#[tokio::test]
async fn should_reject_signup_without_json_content_type() {
    let (status, body) = send(
        Request::post("/api/v1/auth/signup")
            .body(Body::from(r#"{"username":"bob","email":"bob@yamdb.fake"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["non_field_errors"].is_array());
}

#[tokio::test]
async fn should_check_permission_before_body_on_title_create() {
    let (status, body) = send(post_json("/api/v1/titles", "{}")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_check_permission_before_body_on_review_create() {
    let (status, body) = send(post_json(
        "/api/v1/titles/1/reviews",
        r#"{"text":"ok","score":"ten"}"#,
    ))
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_reject_non_numeric_title_id() {
    let (status, body) = send(
        Request::get("/api/v1/titles/abc")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "VALIDATION_ERROR");
    assert!(body["errors"]["path"].is_array());
}

#[tokio::test]
async fn should_reject_non_numeric_review_id() {
    let (status, body) = send(
        Request::get("/api/v1/titles/1/reviews/x/comments")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["path"].is_array());
}
