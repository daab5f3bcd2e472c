use crate::infra::AppState;
use crate::ingest::parse_eml;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use mail_audit::audit::{audit_router, AuditService, ReportRepository, StoredReport};
use mail_audit::error::AppError;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_audit_routes<R>(service: Arc<AuditService<R>>) -> axum::Router
where
    R: ReportRepository + 'static,
{
    let uploads = axum::Router::new()
        .route("/api/v1/audits/eml", axum::routing::post(eml_upload_endpoint::<R>))
        .with_state(service.clone());

    audit_router(service)
        .merge(uploads)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let rules_active = state.rules_active;
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "rules_active": rules_active })
    } else {
        json!({ "status": "initializing", "rules_active": rules_active })
    };

    (status, Json(payload))
}

/// Audits a raw RFC 5322 message posted as the request body.
pub(crate) async fn eml_upload_endpoint<R>(
    State(service): State<Arc<AuditService<R>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<StoredReport>), AppError>
where
    R: ReportRepository + 'static,
{
    let email = parse_eml(&body)
        .ok_or_else(|| AppError::Input("request body is not a parsable message".to_string()))?;
    let record = service.audit(&email)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
