use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use booking_flow::workflows::booking::{
    booking_router, BookingService, DocumentSink, SessionRepository,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_booking_routes<R, D>(service: Arc<BookingService<R, D>>) -> axum::Router
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    booking_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/fleet", axum::routing::get(fleet_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// The fleet the vehicle step validates against.
pub(crate) async fn fleet_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let vehicles = state.catalog.vehicles();
    (
        StatusCode::OK,
        Json(json!({
            "count": vehicles.len(),
            "vehicles": vehicles,
        })),
    )
}
