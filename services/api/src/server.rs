use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryReportRepository};
use crate::routes::with_audit_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mail_audit::audit::AuditService;
use mail_audit::config::AppConfig;
use mail_audit::error::AppError;
use mail_audit::telemetry;
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

    let engine = config.audit.engine();
    if engine.is_empty() {
        warn!(
            warnings = engine.warnings().len(),
            "no audit rules are active; every report will score zero"
        );
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        rules_active: engine.rule_count(),
    };

    let repository = Arc::new(InMemoryReportRepository::default());
    let audit_service = Arc::new(AuditService::new(repository, Arc::new(engine)));

    let app = with_audit_routes(audit_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "mail audit service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
