use axum::http::StatusCode;
use crate::test_utils::{AsCaller, TestContext};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[tokio::test]
async fn test_slot_crud_for_master() {
    let ctx = TestContext::new();
    let service = ctx.add_service("Haircut", 60).await;

    // Create
    let response = ctx
        .server
        .post("/api/master/time-slots")
        .as_caller(ctx.master_id, "master")
        .json(&json!({
            "service_id": service.id,
            "start_time": "2024-01-02T09:00:00Z",
            "end_time": "2024-01-02T10:00:00Z"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let slot: Value = response.json();
    let id = slot["id"].as_str().unwrap().to_string();
    assert_eq!(slot["is_booked"], json!(false));

    // Overlapping declaration for the same service
    let response = ctx
        .server
        .post("/api/master/time-slots")
        .as_caller(ctx.master_id, "master")
        .json(&json!({
            "service_id": service.id,
            "start_time": "2024-01-02T09:30:00Z",
            "end_time": "2024-01-02T10:30:00Z"
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // Update
    let response = ctx
        .server
        .put(&format!("/api/master/time-slots/{}", id))
        .as_caller(ctx.master_id, "master")
        .json(&json!({ "end_time": "2024-01-02T09:45:00Z" }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["end_time"], json!("2024-01-02T09:45:00Z"));

    // List
    let listed: Vec<Value> = ctx
        .server
        .get("/api/master/time-slots")
        .add_query_param("from", "2024-01-02")
        .add_query_param("to", "2024-01-02")
        .as_caller(ctx.master_id, "master")
        .await
        .json();
    assert_eq!(listed.len(), 1);

    // Delete
    ctx.server
        .delete(&format!("/api/master/time-slots/{}", id))
        .as_caller(ctx.master_id, "master")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert!(ctx.store.slots().await[0].deleted_at.is_some());
}

#[tokio::test]
async fn test_inverted_slot_is_bad_request() {
    let ctx = TestContext::new();
    let service = ctx.add_service("Haircut", 60).await;

    let response = ctx
        .server
        .post("/api/master/time-slots")
        .as_caller(ctx.master_id, "master")
        .json(&json!({
            "service_id": service.id,
            "start_time": "2024-01-02T10:00:00Z",
            "end_time": "2024-01-02T09:00:00Z"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_by_interval_then_by_id() {
    let ctx = TestContext::new();
    let service = ctx.add_service("Haircut", 60).await;

    let response = ctx
        .server
        .post("/api/master/time-slots/toggle")
        .as_caller(ctx.master_id, "master")
        .json(&json!({
            "service_id": service.id,
            "start_time": "2024-01-02T13:00:00Z",
            "end_time": "2024-01-02T14:00:00Z",
            "is_booked": true
        }))
        .await;
    response.assert_status_ok();
    let slot: Value = response.json();
    assert_eq!(slot["is_booked"], json!(true));

    let response = ctx
        .server
        .post(&format!(
            "/api/master/time-slots/{}/toggle",
            slot["id"].as_str().unwrap()
        ))
        .as_caller(ctx.master_id, "master")
        .json(&json!({ "is_booked": false }))
        .await;
    response.assert_status_ok();
    let slot: Value = response.json();
    assert_eq!(slot["is_booked"], json!(false));
    assert_eq!(ctx.store.slots().await.len(), 1);

    let response = ctx
        .server
        .post("/api/master/time-slots/toggle")
        .as_caller(ctx.master_id, "master")
        .json(&json!({ "is_booked": true }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clients_cannot_manage_slots() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get("/api/master/time-slots")
        .as_caller(uuid::Uuid::new_v4(), "user")
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}
