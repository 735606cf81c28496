use crate::cli::ServeArgs;
use crate::infra::{load_log_from_path, AppState};
use crate::routes::with_engagement_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use community_tally::config::AppConfig;
use community_tally::error::AppError;
use community_tally::telemetry;
use community_tally::workflows::engagement::{
    EngagementService, InMemoryActivityLog, SystemClock,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let log = match args.seed_log.take() {
        Some(path) => {
            let log = load_log_from_path(&path)?;
            info!(records = log.len(), path = %path.display(), "activity log seeded");
            log
        }
        None => InMemoryActivityLog::default(),
    };

    if config.engagement.admin_id.is_none() {
        warn!("TALLY_ADMIN_ID is not set; report and export endpoints will reject every request");
    }

    let engagement_service = Arc::new(EngagementService::new(
        Arc::new(log),
        Arc::new(SystemClock),
        config.engagement.clone(),
    ));

    let app = with_engagement_routes(engagement_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "community tally service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
