use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryVehicleRepository};
use crate::routes::with_desk_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bid_desk::config::AppConfig;
use bid_desk::desk::VehicleDeskService;
use bid_desk::error::AppError;
use bid_desk::telemetry;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let rate = config.valuation.exchange_rate.aed_per_eur();
    let repository = Arc::new(InMemoryVehicleRepository::default());
    let desk_service = Arc::new(VehicleDeskService::new(
        repository,
        config.valuation.clone(),
    ));

    let app = with_desk_routes(desk_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, aed_per_eur = rate, "bid desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
