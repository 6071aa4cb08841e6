use axum::http::StatusCode;

/// Handler for `GET /healthz`: liveness only, no dependencies are checked.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
