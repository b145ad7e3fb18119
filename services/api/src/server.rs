use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryStores};
use crate::routes::with_performance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use trajectory_engine::config::AppConfig;
use trajectory_engine::error::AppError;
use trajectory_engine::telemetry;

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

    let stores = InMemoryStores::default();
    let trajectory_service = Arc::new(stores.trajectory_service());
    let risk_service = Arc::new(stores.risk_service(config.analysis.clone()));

    let app = with_performance_routes(trajectory_service, risk_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_concurrency = config.analysis.max_concurrency,
        "performance trajectory engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
