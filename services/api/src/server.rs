use crate::cli::ServeArgs;
use crate::infra::{build_engine, build_service, AppState, InMemoryEmployeeRepository};
use crate::routes::with_employee_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use evalmate::config::AppConfig;
use evalmate::error::AppError;
use evalmate::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = build_engine(&config.scoring)?;
    let repository = Arc::new(InMemoryEmployeeRepository::default());
    let service = Arc::new(build_service(&engine, repository, &config.scoring));

    let app = with_employee_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        readiness_field = %config.scoring.readiness_field,
        "employee evaluation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
