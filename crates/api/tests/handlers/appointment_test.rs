use axum::http::StatusCode;
use crate::test_utils::{AsCaller, TestContext};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
async fn test_booking_lifecycle_over_http() {
    let ctx = TestContext::new();
    let haircut = ctx.add_service("Haircut", 30).await;
    let shave = ctx.add_service("Shave", 30).await;
    let first_user = Uuid::new_v4();
    let second_user = Uuid::new_v4();

    // Step 1: first client books 10:00
    let response = ctx
        .server
        .post("/api/appointments")
        .as_caller(first_user, "user")
        .json(&json!({
            "master_id": ctx.master_id,
            "service_id": haircut.id,
            "start_time": "2024-01-01T10:00:00Z",
            "notes": "short on the sides"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let first: Value = response.json();
    assert_eq!(first["status"], json!("pending"));
    assert_eq!(first["end_time"], json!("2024-01-01T10:30:00Z"));
    assert_eq!(first["service"]["name"], json!("Haircut"));

    // Step 2: second client overlaps with another service
    let response = ctx
        .server
        .post("/api/appointments")
        .as_caller(second_user, "user")
        .json(&json!({
            "master_id": ctx.master_id,
            "service_id": shave.id,
            "start_time": "2024-01-01 10:15:00"
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], json!("CONFLICT"));

    // Step 3: master confirms the first booking
    let id = first["id"].as_str().unwrap();
    let response = ctx
        .server
        .put(&format!("/api/master/appointments/{}/confirm", id))
        .as_caller(ctx.master_id, "master")
        .await;
    response.assert_status_ok();
    let confirmed: Value = response.json();
    assert_eq!(confirmed["status"], json!("confirmed"));

    let slots = ctx.store.slots().await;
    assert_eq!(slots.len(), 1);
    assert!(slots[0].is_booked);

    // Step 4: master rejects it again, freeing the slot
    let response = ctx
        .server
        .put(&format!("/api/master/appointments/{}/reject", id))
        .as_caller(ctx.master_id, "master")
        .await;
    response.assert_status_ok();
    let rejected: Value = response.json();
    assert_eq!(rejected["status"], json!("rejected"));
    assert!(!ctx.store.slots().await[0].is_booked);
}

#[tokio::test]
async fn test_option_is_required_when_service_has_options() {
    let ctx = TestContext::new();
    let (service, option) = ctx.add_service_with_option("Colouring", 90).await;
    let user = Uuid::new_v4();

    let response = ctx
        .server
        .post("/api/appointments")
        .as_caller(user, "user")
        .json(&json!({
            "master_id": ctx.master_id,
            "service_id": service.id,
            "start_time": "2024-01-02T09:00:00Z"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));

    let response = ctx
        .server
        .post("/api/appointments")
        .as_caller(user, "user")
        .json(&json!({
            "master_id": ctx.master_id,
            "service_id": service.id,
            "service_option_id": option.id,
            "start_time": "2024-01-02T09:00:00Z"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["end_time"], json!("2024-01-02T10:30:00Z"));
    assert_eq!(body["service_option"]["id"], json!(option.id));
}

#[tokio::test]
async fn test_malformed_start_time_is_bad_request() {
    let ctx = TestContext::new();
    let service = ctx.add_service("Haircut", 30).await;

    let response = ctx
        .server
        .post("/api/appointments")
        .as_caller(Uuid::new_v4(), "user")
        .json(&json!({
            "master_id": ctx.master_id,
            "service_id": service.id,
            "start_time": "next tuesday"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.store.appointments().await.is_empty());
}

#[tokio::test]
async fn test_unknown_service_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/appointments")
        .as_caller(Uuid::new_v4(), "user")
        .json(&json!({
            "master_id": ctx.master_id,
            "service_id": Uuid::new_v4(),
            "start_time": "2024-01-02T09:00:00Z"
        }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn test_master_booking_is_confirmed_immediately() {
    let ctx = TestContext::new();
    let service = ctx.add_service("Massage", 60).await;
    let client = Uuid::new_v4();

    let response = ctx
        .server
        .post("/api/master/appointments")
        .as_caller(ctx.master_id, "master")
        .json(&json!({
            "user_id": client,
            "service_id": service.id,
            "start_time": "2024-01-03T14:00:00Z"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["status"], json!("confirmed"));
    assert_eq!(body["user_id"], json!(client));
    assert!(ctx.store.slots().await.iter().all(|slot| slot.is_booked));
}

#[tokio::test]
async fn test_other_master_cannot_confirm() {
    let ctx = TestContext::new();
    let service = ctx.add_service("Haircut", 30).await;
    let user = Uuid::new_v4();
    let created: Value = ctx
        .server
        .post("/api/appointments")
        .as_caller(user, "user")
        .json(&json!({
            "master_id": ctx.master_id,
            "service_id": service.id,
            "start_time": "2024-01-02T11:00:00Z"
        }))
        .await
        .json();

    let response = ctx
        .server
        .put(&format!(
            "/api/master/appointments/{}/confirm",
            created["id"].as_str().unwrap()
        ))
        .as_caller(Uuid::new_v4(), "master")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_lists_and_confirms_any_calendar() {
    let ctx = TestContext::new();
    let service = ctx.add_service("Haircut", 30).await;
    let user = Uuid::new_v4();
    let admin = Uuid::new_v4();
    let created: Value = ctx
        .server
        .post("/api/appointments")
        .as_caller(user, "user")
        .json(&json!({
            "master_id": ctx.master_id,
            "service_id": service.id,
            "start_time": "2024-01-02T12:00:00Z"
        }))
        .await
        .json();
    let id = created["id"].as_str().unwrap().to_string();

    let response = ctx
        .server
        .put(&format!("/api/admin/appointments/{}/confirm", id))
        .as_caller(admin, "admin")
        .await;
    response.assert_status_ok();

    let response = ctx
        .server
        .get("/api/admin/appointments")
        .add_query_param("master_id", ctx.master_id)
        .add_query_param("status", "confirmed")
        .as_caller(admin, "admin")
        .await;
    response.assert_status_ok();
    let listed: Vec<Value> = response.json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], json!(id));

    let response = ctx
        .server
        .get("/api/appointments")
        .as_caller(user, "user")
        .await;
    let own: Vec<Value> = response.json();
    assert_eq!(own.len(), 1);
}

#[tokio::test]
async fn test_role_gates_on_routes() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get("/api/admin/appointments")
        .as_caller(Uuid::new_v4(), "master")
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], json!("FORBIDDEN"));

    let response = ctx.server.get("/api/master/appointments").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], json!("UNAUTHORIZED"));
}
