use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::NormalizedEmail;
use super::repository::{ReportId, ReportRepository, RepositoryError};
use super::service::{AuditService, AuditServiceError};

/// Router builder exposing HTTP endpoints for audits and report lookup.
pub fn audit_router<R>(service: Arc<AuditService<R>>) -> Router
where
    R: ReportRepository + 'static,
{
    Router::new()
        .route("/api/v1/audits", post(audit_handler::<R>))
        .route("/api/v1/audits/thread", post(thread_handler::<R>))
        .route("/api/v1/audits/:report_id", get(report_handler::<R>))
        .with_state(service)
}

pub(crate) async fn audit_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    axum::Json(email): axum::Json<NormalizedEmail>,
) -> Response
where
    R: ReportRepository + 'static,
{
    match service.audit(&email) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn thread_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    axum::Json(emails): axum::Json<Vec<NormalizedEmail>>,
) -> Response
where
    R: ReportRepository + 'static,
{
    match service.audit_thread(&emails) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
{
    let id = ReportId(report_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(AuditServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "report_id": id.0,
                "error": "report not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

fn error_response(error: AuditServiceError) -> Response {
    let status = match &error {
        AuditServiceError::EmptyThread => StatusCode::UNPROCESSABLE_ENTITY,
        AuditServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AuditServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AuditServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
