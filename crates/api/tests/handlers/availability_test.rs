use axum::http::StatusCode;
use crate::test_utils::{AsCaller, TestContext};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
async fn test_grid_availability_for_a_day() {
    let ctx = TestContext::new();
    let service = ctx.add_service("Haircut", 30).await;

    let response = ctx
        .server
        .get(&format!(
            "/api/masters/{}/services/{}/slots",
            ctx.master_id, service.id
        ))
        .add_query_param("start_date", "2024-01-02")
        .add_query_param("end_date", "2024-01-02")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let windows = body["windows"].as_array().unwrap();
    assert_eq!(windows.len(), 9);
    assert_eq!(windows[0]["start_time"], json!("2024-01-02T09:00:00Z"));
    assert_eq!(windows[0]["end_time"], json!("2024-01-02T09:30:00Z"));
    assert_eq!(windows[0]["available"], json!(true));
    assert_eq!(body["end_date"], json!("2024-01-03T00:00:00Z"));
}

#[tokio::test]
async fn test_booked_appointment_marks_window() {
    let ctx = TestContext::new();
    let service = ctx.add_service("Haircut", 60).await;
    ctx.server
        .post("/api/appointments")
        .as_caller(Uuid::new_v4(), "user")
        .json(&json!({
            "master_id": ctx.master_id,
            "service_id": service.id,
            "start_time": "2024-01-02T10:00:00Z"
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let body: Value = ctx
        .server
        .get(&format!(
            "/api/masters/{}/services/{}/slots",
            ctx.master_id, service.id
        ))
        .add_query_param("start_date", "2024-01-02T00:00:00Z")
        .add_query_param("end_date", "2024-01-03T00:00:00Z")
        .await
        .json();

    let booked: Vec<&str> = body["windows"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|window| window["is_booked"] == json!(true))
        .map(|window| window["start_time"].as_str().unwrap())
        .collect();
    assert_eq!(booked, vec!["2024-01-02T10:00:00Z"]);
}

#[tokio::test]
async fn test_unknown_service_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get(&format!(
            "/api/masters/{}/services/{}/slots",
            ctx.master_id,
            Uuid::new_v4()
        ))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_date_is_validation_error() {
    let ctx = TestContext::new();
    let service = ctx.add_service("Haircut", 30).await;

    let response = ctx
        .server
        .get(&format!(
            "/api/masters/{}/services/{}/slots",
            ctx.master_id, service.id
        ))
        .add_query_param("start_date", "02/01/2024")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
}
