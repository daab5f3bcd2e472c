use serde::{Deserialize, Serialize};

use super::catalog::LoadWarning;
use super::report::AuditReport;

/// Opaque identifier for a stored report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

/// Report plus the rule-set context it was produced under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredReport {
    pub report_id: ReportId,
    /// Zero means the engine had no active rules, not that the email passed.
    pub rules_active: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub load_warnings: Vec<LoadWarning>,
    pub report: AuditReport,
}

/// Storage abstraction owned by the orchestration layer.
pub trait ReportRepository: Send + Sync {
    fn insert(&self, record: StoredReport) -> Result<StoredReport, RepositoryError>;
    fn fetch(&self, id: &ReportId) -> Result<Option<StoredReport>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("report already exists")]
    Conflict,
    #[error("report not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
