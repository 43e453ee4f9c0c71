use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySessionRepository};
use crate::routes::with_cap_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cap_engine::cap::CapComplianceService;
use cap_engine::config::AppConfig;
use cap_engine::error::AppError;
use cap_engine::telemetry;
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

    let sessions = Arc::new(InMemorySessionRepository::default());
    let cap_service = Arc::new(
        CapComplianceService::new(sessions, config.cap.rules.clone())?
            .with_default_pools(config.cap.pools.clone()),
    );

    let app = with_cap_routes(cap_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        salary_budget = config.cap.rules.salary_budget,
        pool_a = config.cap.pools.pool_a_total,
        pool_b = config.cap.pools.pool_b_total,
        "cap compliance engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
