//! Integration tests for the Salon API

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use salon_api::{create_router, AppState};
use salon_core::Repositories;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`
use tower_http::cors::CorsLayer;

/// Helper to create a test app on in-memory stores
fn create_test_app() -> Router {
    create_router(AppState::new(Repositories::in_memory()), CorsLayer::permissive())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// Customer, staff member and a 50.00 haircut; returns their ids
async fn seed(app: &Router) -> (String, String, String) {
    let (status, customer) = send(
        app,
        "POST",
        "/api/v1/customers",
        Some(json!({ "name": "Julia Costa", "email": "julia@email.com", "phone": "11999990000" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, staff) = send(
        app,
        "POST",
        "/api/v1/staff",
        Some(json!({ "name": "Maria Silva", "email": "maria@salao.com", "role": "Cabeleireira" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, service) = send(
        app,
        "POST",
        "/api/v1/services",
        Some(json!({
            "name": "Corte de Cabelo",
            "description": "Corte feminino",
            "category": "Cabelo",
            "price": 50.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (
        customer["id"].as_str().unwrap().to_string(),
        staff["id"].as_str().unwrap().to_string(),
        service["id"].as_str().unwrap().to_string(),
    )
}

fn booking(customer: &str, staff: &str, service: &str, date: &str, time: &str) -> Value {
    json!({
        "customer_id": customer,
        "staff_id": staff,
        "service_id": service,
        "appointment_date": date,
        "appointment_time": time,
        "notes": ""
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "salon-api");
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["endpoints"]["appointments"], "/api/v1/appointments");
}

#[tokio::test]
async fn test_booking_conflict_and_cancellation() {
    let app = create_test_app();
    let (customer, staff, service) = seed(&app).await;

    let (status, first) = send(
        &app,
        "POST",
        "/api/v1/appointments",
        Some(booking(&customer, &staff, &service, "2024-03-10", "14:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "scheduled");
    assert_eq!(first["total_price"], 50.0);
    assert_eq!(first["appointment_date"], "2024-03-10");
    assert_eq!(first["appointment_time"], "14:00:00");

    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/appointments",
        Some(booking(&customer, &staff, &service, "2024-03-10", "14:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "Conflicting appointment booking");

    let id = first["id"].as_str().unwrap();
    let (status, cancelled) = send(
        &app,
        "PATCH",
        &format!("/api/v1/appointments/{}/status", id),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/appointments",
        Some(booking(&customer, &staff, &service, "2024-03-10", "14:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_booking_rejections() {
    let app = create_test_app();
    let (customer, staff, service) = seed(&app).await;
    let unknown = "00000000-0000-4000-8000-000000000000";

    let cases = [
        (booking(unknown, &staff, &service, "2024-03-10", "14:00"), "Customer not found"),
        (booking(&customer, unknown, &service, "2024-03-10", "14:00"), "Staff not found"),
        (booking(&customer, &staff, unknown, "2024-03-10", "14:00"), "Service not found"),
        (booking(&customer, &staff, &service, "", "14:00"), "Invalid date"),
        (booking(&customer, &staff, &service, "2024-03-10", ""), "Invalid time"),
        (booking("nope", &staff, &service, "2024-03-10", "14:00"), "Invalid customer ID"),
        (
            booking(&customer, &staff, &service, "10/03/2024", "14:00"),
            "Invalid date format (YYYY-MM-DD)",
        ),
        (
            booking(&customer, &staff, &service, "2024-03-10", "2pm"),
            "Invalid time format (HH:MM)",
        ),
    ];

    for (body, message) in cases {
        let (status, json) = send(&app, "POST", "/api/v1/appointments", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", message);
        assert_eq!(json["error"], message);
    }

    let (_, list) = send(&app, "GET", "/api/v1/appointments", None).await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_update_and_status_errors() {
    let app = create_test_app();
    let (customer, staff, service) = seed(&app).await;

    let (_, booked) = send(
        &app,
        "POST",
        "/api/v1/appointments",
        Some(booking(&customer, &staff, &service, "2024-03-10", "14:00")),
    )
    .await;
    let id = booked["id"].as_str().unwrap();

    let mut update = booking(&customer, &staff, &service, "2024-03-10", "14:00");
    update["status"] = json!("confirmed");
    update["notes"] = json!("bring reference photo");
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/v1/appointments/{}", id),
        Some(update.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "confirmed");
    assert_eq!(updated["notes"], "bring reference photo");

    update["status"] = json!("bogus");
    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/v1/appointments/{}", id),
        Some(update),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid status: bogus");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/v1/appointments/{}/status", id),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, current) = send(&app, "GET", &format!("/api/v1/appointments/{}", id), None).await;
    assert_eq!(current["status"], "confirmed");

    let missing = "00000000-0000-4000-8000-000000000000";
    let (status, json) = send(
        &app,
        "PATCH",
        &format!("/api/v1/appointments/{}/status", missing),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Appointment not found");

    let (status, json) = send(&app, "GET", "/api/v1/appointments/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid appointment ID");
}

#[tokio::test]
async fn test_delete_appointment() {
    let app = create_test_app();
    let (customer, staff, service) = seed(&app).await;

    let (_, booked) = send(
        &app,
        "POST",
        "/api/v1/appointments",
        Some(booking(&customer, &staff, &service, "2024-03-10", "14:00")),
    )
    .await;
    let uri = format!("/api/v1/appointments/{}", booked["id"].as_str().unwrap());

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_and_pagination() {
    let app = create_test_app();
    let (customer, staff, service) = seed(&app).await;

    for hour in 9..=20 {
        let time = format!("{:02}:00", hour);
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/appointments",
            Some(booking(&customer, &staff, &service, "2024-03-10", &time)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    send(
        &app,
        "POST",
        "/api/v1/appointments",
        Some(booking(&customer, &staff, &service, "2024-03-12", "10:00")),
    )
    .await;

    let (_, page) = send(&app, "GET", "/api/v1/appointments", None).await;
    assert_eq!(page["total"], 13);
    assert_eq!(page["page"], 1);
    assert_eq!(page["limit"], 10);
    assert_eq!(page["appointments"].as_array().unwrap().len(), 10);
    assert_eq!(page["appointments"][0]["appointment_time"], "09:00:00");

    let (_, page) = send(&app, "GET", "/api/v1/appointments?page=2&limit=10", None).await;
    assert_eq!(page["appointments"].as_array().unwrap().len(), 3);

    let (_, page) = send(&app, "GET", "/api/v1/appointments?page=0&limit=500", None).await;
    assert_eq!(page["page"], 1);
    assert_eq!(page["limit"], 10);

    let (_, page) = send(&app, "GET", "/api/v1/appointments?page=9", None).await;
    assert!(page["appointments"].as_array().unwrap().is_empty());

    let (_, by_date) = send(&app, "GET", "/api/v1/appointments?date=2024-03-12", None).await;
    assert_eq!(by_date.as_array().unwrap().len(), 1);

    let (_, by_staff) = send(
        &app,
        "GET",
        &format!("/api/v1/appointments?staff_id={}", staff),
        None,
    )
    .await;
    assert_eq!(by_staff.as_array().unwrap().len(), 13);

    let (_, by_customer) = send(
        &app,
        "GET",
        &format!("/api/v1/appointments?customer_id={}", customer),
        None,
    )
    .await;
    assert_eq!(by_customer.as_array().unwrap().len(), 13);

    let (status, in_range) = send(
        &app,
        "GET",
        "/api/v1/appointments?start_date=2024-03-11&end_date=2024-03-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(in_range.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "GET",
        "/api/v1/appointments?start_date=2024-03-31&end_date=2024-03-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/v1/appointments?start_date=2024-03-01", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, scheduled) = send(&app, "GET", "/api/v1/appointments?status=scheduled", None).await;
    assert_eq!(scheduled.as_array().unwrap().len(), 13);

    let (status, _) = send(&app, "GET", "/api/v1/appointments?status=done", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/v1/appointments?date=tomorrow", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_customer_endpoints() {
    let app = create_test_app();
    let (customer, _, _) = seed(&app).await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/customers",
        Some(json!({ "name": "Other Julia", "email": "JULIA@email.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("already exists"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/customers",
        Some(json!({ "name": "", "email": "x@email.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, found) = send(&app, "GET", "/api/v1/customers/email/julia@email.com", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], customer.as_str());

    let (_, found) = send(&app, "GET", "/api/v1/customers/search?q=JULIA", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (_, count) = send(&app, "GET", "/api/v1/customers/count", None).await;
    assert_eq!(count["count"], 1);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/v1/customers/{}", customer),
        Some(json!({ "name": "Julia C. Costa", "email": "julia@email.com", "phone": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Julia C. Costa");

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/customers/{}", customer), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(&app, "GET", &format!("/api/v1/customers/{}", customer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Customer not found");
}

#[tokio::test]
async fn test_staff_and_service_endpoints() {
    let app = create_test_app();
    seed(&app).await;

    send(
        &app,
        "POST",
        "/api/v1/staff",
        Some(json!({ "name": "Ana Santos", "email": "ana@salao.com", "role": "Manicure" })),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/staff",
        Some(json!({ "name": "No Role", "email": "norole@salao.com", "role": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, roles) = send(&app, "GET", "/api/v1/staff/roles", None).await;
    assert_eq!(roles["roles"], json!(["Cabeleireira", "Manicure"]));

    let (_, manicures) = send(&app, "GET", "/api/v1/staff?role=manicure", None).await;
    assert_eq!(manicures.as_array().unwrap().len(), 1);

    let (_, everyone) = send(&app, "GET", "/api/v1/staff", None).await;
    assert_eq!(everyone["staff"].as_array().unwrap().len(), 2);
    assert_eq!(everyone["total"], 2);

    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/services",
        Some(json!({ "name": "Free", "category": "Cabelo", "price": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Price must be greater than zero");

    let (_, categories) = send(&app, "GET", "/api/v1/services/categories", None).await;
    assert_eq!(categories["categories"], json!(["Cabelo"]));

    let (_, hair) = send(&app, "GET", "/api/v1/services?category=Cabelo", None).await;
    assert_eq!(hair.as_array().unwrap().len(), 1);

    let (_, found) = send(&app, "GET", "/api/v1/services/search?q=feminino", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, json) = send(
        &app,
        "GET",
        "/api/v1/services/00000000-0000-4000-8000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Service not found");
}

#[tokio::test]
async fn test_entity_lists_are_paged() {
    let app = create_test_app();
    seed(&app).await;

    for i in 0..4 {
        send(
            &app,
            "POST",
            "/api/v1/customers",
            Some(json!({ "name": format!("Cliente {}", i), "email": format!("c{}@email.com", i) })),
        )
        .await;
        send(
            &app,
            "POST",
            "/api/v1/staff",
            Some(json!({ "name": format!("Equipe {}", i), "email": format!("e{}@salao.com", i), "role": "Manicure" })),
        )
        .await;
        send(
            &app,
            "POST",
            "/api/v1/services",
            Some(json!({ "name": format!("Unha {}", i), "category": "Unhas", "price": 30.0 })),
        )
        .await;
    }

    let (status, page) = send(&app, "GET", "/api/v1/customers?page=2&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["customers"].as_array().unwrap().len(), 2);
    assert_eq!(page["total"], 5);
    assert_eq!(page["page"], 2);
    assert_eq!(page["limit"], 2);

    let (_, last) = send(&app, "GET", "/api/v1/customers?page=3&limit=2", None).await;
    assert_eq!(last["customers"].as_array().unwrap().len(), 1);

    // Bad paging values fall back to the defaults
    let (_, defaults) = send(&app, "GET", "/api/v1/staff?page=0&limit=500", None).await;
    assert_eq!(defaults["page"], 1);
    assert_eq!(defaults["limit"], 10);
    assert_eq!(defaults["staff"].as_array().unwrap().len(), 5);

    let (_, past_end) = send(&app, "GET", "/api/v1/services?page=9&limit=2", None).await;
    assert!(past_end["services"].as_array().unwrap().is_empty());
    assert_eq!(past_end["total"], 5);

    // Filters skip paging and return a bare array
    let (_, nails) = send(&app, "GET", "/api/v1/services?category=unhas&limit=1", None).await;
    assert_eq!(nails.as_array().unwrap().len(), 4);

    let (_, manicures) = send(&app, "GET", "/api/v1/staff?role=Manicure&page=2", None).await;
    assert_eq!(manicures.as_array().unwrap().len(), 4);

    let (_, named) = send(&app, "GET", "/api/v1/customers?name=cliente", None).await;
    assert_eq!(named.as_array().unwrap().len(), 4);

    // Name search looks at the name only
    let (_, by_email) = send(&app, "GET", "/api/v1/customers?name=email.com", None).await;
    assert!(by_email.as_array().unwrap().is_empty());

    // A blank name is no filter
    let (_, blank) = send(&app, "GET", "/api/v1/customers?name=", None).await;
    assert_eq!(blank["total"], 5);
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let app = create_test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/customers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
