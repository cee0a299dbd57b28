use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::confirmation::DocumentSink;
use super::domain::{GoodsRecord, JobType, LocationRecord, PalletTransfer, VehicleSelection};
use super::repository::{BookingSession, RepositoryError, SessionId, SessionRepository};
use super::service::{BookingService, BookingServiceError};
use super::views::BookingView;

#[derive(Debug, Deserialize)]
pub struct JobTypeRequest {
    pub job_type: JobType,
}

#[derive(Debug, Deserialize)]
pub struct LocationCountRequest {
    pub count: usize,
}

/// Router builder exposing the booking flow over HTTP.
pub fn booking_router<R, D>(service: Arc<BookingService<R, D>>) -> Router
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    Router::new()
        .route("/api/v1/bookings", post(start_handler::<R, D>))
        .route("/api/v1/bookings/:session_id", get(show_handler::<R, D>))
        .route(
            "/api/v1/bookings/:session_id/vehicles",
            get(vehicles_handler::<R, D>),
        )
        .route(
            "/api/v1/bookings/:session_id/job-type",
            post(job_type_handler::<R, D>),
        )
        .route(
            "/api/v1/bookings/:session_id/location-count",
            post(location_count_handler::<R, D>),
        )
        .route(
            "/api/v1/bookings/:session_id/location",
            post(location_handler::<R, D>),
        )
        .route(
            "/api/v1/bookings/:session_id/goods",
            post(goods_handler::<R, D>),
        )
        .route(
            "/api/v1/bookings/:session_id/vehicle",
            post(vehicle_handler::<R, D>),
        )
        .route(
            "/api/v1/bookings/:session_id/transfer",
            post(transfer_handler::<R, D>),
        )
        .route(
            "/api/v1/bookings/:session_id/review",
            post(review_handler::<R, D>),
        )
        .route(
            "/api/v1/bookings/:session_id/payment",
            post(payment_handler::<R, D>),
        )
        .route(
            "/api/v1/bookings/:session_id/back",
            post(back_handler::<R, D>),
        )
        .route(
            "/api/v1/bookings/:session_id/restart",
            post(restart_handler::<R, D>),
        )
        .with_state(service)
}

type SharedService<R, D> = State<Arc<BookingService<R, D>>>;

pub(crate) async fn start_handler<R, D>(State(service): SharedService<R, D>) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    match service.start() {
        Ok(session) => {
            let view = BookingView::from_session(&session);
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(BookingServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "session already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn show_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    session_response(service.get(&SessionId(session_id)))
}

pub(crate) async fn vehicles_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    match service.vehicles(&SessionId(session_id)) {
        Ok(options) => (StatusCode::OK, axum::Json(options)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn job_type_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<JobTypeRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    session_response(service.select_job_type(&SessionId(session_id), request.job_type))
}

pub(crate) async fn location_count_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<LocationCountRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    session_response(service.submit_location_count(&SessionId(session_id), request.count))
}

pub(crate) async fn location_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(session_id): Path<String>,
    axum::Json(location): axum::Json<LocationRecord>,
) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    session_response(service.submit_location(&SessionId(session_id), location))
}

pub(crate) async fn goods_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(session_id): Path<String>,
    axum::Json(goods): axum::Json<GoodsRecord>,
) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    session_response(service.submit_goods(&SessionId(session_id), goods))
}

pub(crate) async fn vehicle_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(session_id): Path<String>,
    axum::Json(selection): axum::Json<VehicleSelection>,
) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    session_response(service.submit_vehicle(&SessionId(session_id), selection))
}

pub(crate) async fn transfer_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(session_id): Path<String>,
    axum::Json(transfer): axum::Json<PalletTransfer>,
) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    session_response(service.submit_transfer(&SessionId(session_id), transfer))
}

pub(crate) async fn review_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    session_response(service.confirm_review(&SessionId(session_id)))
}

pub(crate) async fn payment_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    session_response(service.pay(&SessionId(session_id)).await)
}

pub(crate) async fn back_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    session_response(service.go_back(&SessionId(session_id)))
}

pub(crate) async fn restart_handler<R, D>(
    State(service): SharedService<R, D>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    D: DocumentSink + 'static,
{
    session_response(service.restart(&SessionId(session_id)))
}

fn session_response(result: Result<BookingSession, BookingServiceError>) -> Response {
    match result {
        Ok(session) => {
            let view = BookingView::from_session(&session);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: BookingServiceError) -> Response {
    let status = match &error {
        BookingServiceError::Flow(flow) if flow.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        BookingServiceError::Flow(_) => StatusCode::CONFLICT,
        BookingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        BookingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        BookingServiceError::Repository(RepositoryError::Unavailable(_))
        | BookingServiceError::Document(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
