//! End-to-end tests of the REST API over the in-memory repository.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use clinic_desk::db::repositories::LocalRepository;
use clinic_desk::db::repository::FullRepository;
use clinic_desk::http::{create_router, AppState};

fn app() -> Router {
    let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
    create_router(AppState::new(repo))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_patient(app: &Router, first: &str, last: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/v1/patients",
        Some(json!({ "first_name": first, "last_name": last, "phone": "555-0100" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn check_in(app: &Router, patient_id: i64, priority: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/v1/queue",
        Some(json!({ "patient_id": patient_id, "priority": priority })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_check_in_flow() {
    let app = app();
    let patient = create_patient(&app, "Ana", "Diaz").await;

    let first = check_in(&app, patient, "normal").await;
    assert_eq!(first["queue_number"], 1);
    assert_eq!(first["status"], "waiting");
    assert_eq!(first["patient_name"], "Ana Diaz");

    let second = check_in(&app, patient, "urgent").await;
    assert_eq!(second["queue_number"], 2);

    let (status, page) = send(&app, Method::GET, "/v1/queue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["page"], 1);
    assert_eq!(page["limit"], 10);
    assert_eq!(page["items"][0]["id"], second["id"]);
}

#[tokio::test]
async fn test_check_in_unknown_patient_is_404() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/queue",
        Some(json!({ "patient_id": 77 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_priority_is_400_with_field() {
    let app = app();
    let patient = create_patient(&app, "Bo", "Zhang").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/queue",
        Some(json!({ "patient_id": patient, "priority": "asap" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["fields"][0]["field"], "priority");
}

#[tokio::test]
async fn test_status_cannot_move_backwards() {
    let app = app();
    let patient = create_patient(&app, "Cy", "Lee").await;
    let entry = check_in(&app, patient, "normal").await;
    let uri = format!("/v1/queue/{}/status", entry["id"]);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "with_doctor" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "with_doctor");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "waiting" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_priority_change_reorders_queue() {
    let app = app();
    let a = create_patient(&app, "Ann", "First").await;
    let b = create_patient(&app, "Bob", "Second").await;
    check_in(&app, a, "normal").await;
    let late = check_in(&app, b, "normal").await;

    let uri = format!("/v1/queue/{}/priority", late["id"]);
    let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({ "priority": "urgent" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, page) = send(&app, Method::GET, "/v1/queue", None).await;
    assert_eq!(page["items"][0]["patient_name"], "Bob Second");
}

#[tokio::test]
async fn test_queue_filters_and_pagination() {
    let app = app();
    let patient = create_patient(&app, "Dee", "Moss").await;
    for _ in 0..3 {
        check_in(&app, patient, "normal").await;
    }
    check_in(&app, patient, "urgent").await;

    let (status, page) = send(&app, Method::GET, "/v1/queue?priority=normal&page=2&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_queue_status_filter_keeps_rank() {
    let app = app();
    let patient = create_patient(&app, "Gus", "Hale").await;
    let seen = check_in(&app, patient, "normal").await;
    let normal = check_in(&app, patient, "normal").await;
    let urgent = check_in(&app, patient, "urgent").await;

    let uri = format!("/v1/queue/{}/status", seen["id"]);
    let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "with_doctor" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, page) = send(&app, Method::GET, "/v1/queue?status=waiting", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], urgent["id"]);
    assert_eq!(items[1]["id"], normal["id"]);
    assert!(items.iter().all(|item| item["status"] == "waiting"));
}

#[tokio::test]
async fn test_out_of_range_limit_is_rejected() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/v1/patients?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "limit");
}

#[tokio::test]
async fn test_update_queue_entry_wait_time() {
    let app = app();
    let patient = create_patient(&app, "Eli", "Ross").await;
    let entry = check_in(&app, patient, "normal").await;
    let uri = format!("/v1/queue/{}", entry["id"]);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "estimated_wait_time": 25 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estimated_wait_time"], 25);

    let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({ "estimated_wait_time": -5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "priority": "urgent" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estimated_wait_time"], 25);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "estimated_wait_time": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["estimated_wait_time"].is_null());
}

#[tokio::test]
async fn test_remove_queue_entry() {
    let app = app();
    let patient = create_patient(&app, "Fay", "Ito").await;
    let entry = check_in(&app, patient, "normal").await;
    let uri = format!("/v1/queue/{}", entry["id"]);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patient_crud() {
    let app = app();
    let id = create_patient(&app, "Gus", "Park").await;
    let uri = format!("/v1/patients/{}", id);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "phone": "555-0199" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "555-0199");
    assert_eq!(body["first_name"], "Gus");

    let (status, page) = send(&app, Method::GET, "/v1/patients?search=park", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_required_patient_fields() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/v1/patients", Some(json!({ "first_name": "Only" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert!(fields.contains(&"last_name"));
    assert!(fields.contains(&"phone"));
}

#[tokio::test]
async fn test_doctor_and_appointment_flow() {
    let app = app();
    let patient = create_patient(&app, "Hana", "Sato").await;
    let (status, doctor) = send(
        &app,
        Method::POST,
        "/v1/doctors",
        Some(json!({
            "first_name": "Greg",
            "last_name": "House",
            "specialization": "Diagnostics",
            "phone": "555-0300"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(doctor["is_available"], true);

    let (status, appointment) = send(
        &app,
        Method::POST,
        "/v1/appointments",
        Some(json!({
            "patient_id": patient,
            "doctor_id": doctor["id"],
            "appointment_datetime": "2026-10-20T09:30:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", appointment);
    assert_eq!(appointment["status"], "booked");

    let (status, page) = send(&app, Method::GET, "/v1/appointments?date=2026-10-20", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);

    let uri = format!("/v1/doctors/{}", doctor["id"]);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, page) = send(&app, Method::GET, "/v1/doctors?specialization=diagnostics&available=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_user_duplicate_is_conflict() {
    let app = app();
    let body = json!({
        "username": "desk1",
        "email": "desk1@clinic.test",
        "full_name": "Desk One"
    });
    let (status, user) = send(&app, Method::POST, "/v1/users", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["role"], "staff");

    let (status, _) = send(&app, Method::POST, "/v1/users", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
