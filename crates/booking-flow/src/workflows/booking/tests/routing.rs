use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::booking::payment::MockPaymentGateway;
use crate::workflows::booking::router::{booking_router, show_handler};
use crate::workflows::booking::service::BookingService;
use crate::workflows::fleet::VehicleCatalog;

fn router() -> Router {
    let (service, _, _) = build_service(MockPaymentGateway::always_approve());
    booking_router(Arc::new(service))
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&payload).expect("encode body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router responds");
    let status = response.status();
    (status, read_json_body(response).await)
}

async fn start(router: &Router) -> String {
    let (status, body) = send(router, "POST", "/api/v1/bookings", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"]
        .as_str()
        .expect("session id string")
        .to_string()
}

#[tokio::test]
async fn full_single_booking_over_http() {
    let router = router();
    let id = start(&router).await;
    let base = format!("/api/v1/bookings/{id}");

    let (status, body) = send(
        &router,
        "POST",
        &format!("{base}/job-type"),
        Some(json!({ "job_type": "single" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "location");
    assert_eq!(body["location_type"], "pickup");

    let pickup = serde_json::to_value(location("Acme")).expect("encode location");
    let (status, _) = send(&router, "POST", &format!("{base}/location"), Some(pickup.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&router, "POST", &format!("{base}/location"), Some(pickup)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "goods");
    assert_eq!(body["location_type"], "delivery");

    let goods = serde_json::to_value(pallet_goods(2, 900.0)).expect("encode goods");
    let (status, body) = send(&router, "POST", &format!("{base}/goods"), Some(goods)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "vehicle");
    assert_eq!(body["shows_pallet_transfer"], true);
    assert_eq!(body["load"]["pallets"], 2);

    let (status, options) = send(&router, "GET", &format!("{base}/vehicles"), None).await;
    assert_eq!(status, StatusCode::OK);
    let ute = options
        .as_array()
        .expect("vehicle list")
        .iter()
        .find(|option| option["key"] == "ute")
        .expect("ute listed");
    assert_eq!(ute["valid"], false);

    let (status, body) = send(
        &router,
        "POST",
        &format!("{base}/vehicle"),
        Some(json!({ "vehicle_key": "van", "truck_body_type": "pantech" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "transfer");

    let (status, body) = send(
        &router,
        "POST",
        &format!("{base}/transfer"),
        Some(json!({ "account": "loscam", "account_number": "LC-4410" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "review");

    let (status, body) = send(&router, "POST", &format!("{base}/review"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "payment");

    let (status, body) = send(&router, "POST", &format!("{base}/payment"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "confirmed");
    assert!(body["confirmation"]["job_id"]
        .as_str()
        .expect("job id")
        .starts_with("JOB-"));
    assert_eq!(body["record"]["job_type"], Value::Null);
}

#[tokio::test]
async fn validation_failures_are_unprocessable() {
    let router = router();
    let id = start(&router).await;
    let base = format!("/api/v1/bookings/{id}");

    send(
        &router,
        "POST",
        &format!("{base}/job-type"),
        Some(json!({ "job_type": "multi-pickup" })),
    )
    .await;
    let (status, body) = send(
        &router,
        "POST",
        &format!("{base}/location-count"),
        Some(json!({ "count": 31 })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("between 2 and 30"));
}

#[tokio::test]
async fn wrong_step_submissions_conflict() {
    let router = router();
    let id = start(&router).await;

    let (status, body) = send(&router, "POST", &format!("/api/v1/bookings/{id}/review"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "the flow is on the job type step, not review");

    let (status, _) = send(&router, "POST", &format!("/api/v1/bookings/{id}/back"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn back_and_restart_return_views() {
    let router = router();
    let id = start(&router).await;
    let base = format!("/api/v1/bookings/{id}");

    send(
        &router,
        "POST",
        &format!("{base}/job-type"),
        Some(json!({ "job_type": "multi-drop" })),
    )
    .await;
    let (status, body) = send(&router, "POST", &format!("{base}/back"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "job_type");
    assert_eq!(body["job_type"], "multi-drop");

    let (status, body) = send(&router, "POST", &format!("{base}/restart"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "job_type");
    assert!(body.get("job_type").is_none());
}

#[tokio::test]
async fn show_handler_reports_unknown_sessions() {
    let (service, _, _) = build_service(MockPaymentGateway::always_approve());
    let response = show_handler::<MemorySessions, MemoryDocuments>(
        State(Arc::new(service)),
        Path("booking-unknown".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repository_outage_is_an_internal_error() {
    let service = BookingService::new(
        Arc::new(UnavailableSessions),
        Arc::new(MemoryDocuments::default()),
        Arc::new(MockPaymentGateway::always_approve()),
        Arc::new(VehicleCatalog::standard()),
    );
    let router = booking_router(Arc::new(service));

    let (status, body) = send(&router, "POST", "/api/v1/bookings", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "repository unavailable: database offline");
}
