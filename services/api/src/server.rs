use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState, InMemoryDocumentSink, InMemorySessionRepository};
use crate::routes::with_booking_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use booking_flow::config::AppConfig;
use booking_flow::error::AppError;
use booking_flow::telemetry;
use booking_flow::workflows::booking::{BookingService, MockPaymentGateway};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(load_catalog(&config.booking)?);
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalog: catalog.clone(),
    };

    let gateway = MockPaymentGateway::new(
        config.booking.payment_delay(),
        config.booking.payment_success_rate,
    );
    let booking_service = Arc::new(BookingService::new(
        Arc::new(InMemorySessionRepository::default()),
        Arc::new(InMemoryDocumentSink::default()),
        Arc::new(gateway),
        catalog,
    ));

    let app = with_booking_routes(booking_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        payment_delay_ms = config.booking.payment_delay_ms,
        "booking flow service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
