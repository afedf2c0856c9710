use axum::{http::StatusCode, response::IntoResponse};
use crate::test_utils::TestContext;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use timebook_api::middleware::error_handling::AppError;
use timebook_core::errors::BookingError;

#[rstest]
#[case(BookingError::NotFound("missing".into()), StatusCode::NOT_FOUND)]
#[case(BookingError::Validation("bad".into()), StatusCode::BAD_REQUEST)]
#[case(BookingError::Conflict("taken".into()), StatusCode::CONFLICT)]
#[case(BookingError::Authentication("who".into()), StatusCode::UNAUTHORIZED)]
#[case(BookingError::Authorization("no".into()), StatusCode::FORBIDDEN)]
#[case(BookingError::Database(eyre::eyre!("boom")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: BookingError, #[case] status: StatusCode) {
    let response = AppError(error).into_response();
    assert_eq!(response.status(), status);
}

#[tokio::test]
async fn test_internal_error_hides_detail() {
    let response = AppError(BookingError::Database(eyre::eyre!(
        "relation \"appointments\" does not exist"
    )))
    .into_response();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body: Value = serde_json::from_slice(&bytes).expect("Body should be JSON");

    assert_eq!(
        body,
        json!({ "code": "INTERNAL_ERROR", "message": "Internal server error" })
    );
}

#[tokio::test]
async fn test_conflict_body_carries_message() {
    let response = AppError(BookingError::Conflict("Slot taken".into())).into_response();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body: Value = serde_json::from_slice(&bytes).expect("Body should be JSON");

    assert_eq!(body, json!({ "code": "CONFLICT", "message": "Slot taken" }));
}

#[tokio::test]
async fn test_invalid_caller_headers_are_unauthorized() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get("/api/appointments")
        .add_header(
            axum::http::HeaderName::from_static("x-user-id"),
            axum::http::HeaderValue::from_static("not-a-uuid"),
        )
        .add_header(
            axum::http::HeaderName::from_static("x-user-role"),
            axum::http::HeaderValue::from_static("user"),
        )
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = ctx
        .server
        .get("/api/appointments")
        .add_header(
            axum::http::HeaderName::from_static("x-user-id"),
            axum::http::HeaderValue::from_static("6f1c2d3e-4b5a-4c7d-8e9f-0a1b2c3d4e5f"),
        )
        .add_header(
            axum::http::HeaderName::from_static("x-user-role"),
            axum::http::HeaderValue::from_static("superuser"),
        )
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new();

    let health: Value = ctx.server.get("/health").await.json();
    assert_eq!(health, json!({ "status": "ok", "store": "ok" }));

    let version: Value = ctx.server.get("/version").await.json();
    assert_eq!(version["name"], json!("timebook-api"));
}
