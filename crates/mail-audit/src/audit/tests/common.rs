use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::audit::domain::{EvaluationContext, NormalizedEmail, RuleResult, RuleStatus};
use crate::audit::repository::{RepositoryError, ReportId, ReportRepository, StoredReport};
use crate::audit::rules::{Rule, RuleError};
use crate::audit::{audit_router, AuditService, RulesEngine};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn hours_ago(hours: i64) -> String {
    (now() - Duration::hours(hours)).to_rfc3339()
}

pub(super) fn fifty_word_body() -> String {
    let opening = "Dear Team, thank you for the update on the migration plan.";
    let middle = "The rollout schedule looks reasonable and the checklist covers the database, \
                  the cache layer, and the notification workers we discussed on Monday.";
    let closing = "I will confirm weekend staffing by Thursday afternoon so the operations \
                   team can plan, kind regards, Dana";
    format!("{opening} {middle} {closing}")
}

pub(super) fn well_formed_email() -> NormalizedEmail {
    NormalizedEmail {
        subject: "Migration plan".to_string(),
        sender: "dana@example.com".to_string(),
        recipient: "team@example.com".to_string(),
        timestamp: Some(hours_ago(1)),
        body: fifty_word_body(),
        attachments: Vec::new(),
    }
}

pub(super) fn terse_email() -> NormalizedEmail {
    NormalizedEmail {
        subject: "re".to_string(),
        sender: "sam@example.com".to_string(),
        recipient: "team@example.com".to_string(),
        timestamp: Some(hours_ago(100)),
        body: "ok, will do".to_string(),
        attachments: Vec::new(),
    }
}

pub(super) fn engine() -> RulesEngine {
    RulesEngine::standard()
}

/// Rule that always reports an evaluation error.
pub(super) struct FailingRule;

impl Rule for FailingRule {
    fn name(&self) -> &str {
        "failing"
    }

    fn description(&self) -> &str {
        "always errors"
    }

    fn weight(&self) -> f64 {
        1.0
    }

    fn evaluate(
        &self,
        _email: &NormalizedEmail,
        _context: &EvaluationContext,
    ) -> Result<RuleResult, RuleError> {
        Err(RuleError::Evaluation("dictionary service offline".to_string()))
    }
}

/// Rule that panics mid-evaluation.
pub(super) struct PanickingRule;

impl Rule for PanickingRule {
    fn name(&self) -> &str {
        "panicking"
    }

    fn description(&self) -> &str {
        "always panics"
    }

    fn weight(&self) -> f64 {
        1.0
    }

    fn evaluate(
        &self,
        _email: &NormalizedEmail,
        _context: &EvaluationContext,
    ) -> Result<RuleResult, RuleError> {
        panic!("index out of range")
    }
}

pub(super) fn fixed_result(rule: &str, status: RuleStatus, score: u8) -> RuleResult {
    RuleResult {
        rule: rule.to_string(),
        description: format!("{rule} check"),
        weight: 1.0,
        status,
        score,
        justification: "fixed".to_string(),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ReportId, StoredReport>>>,
}

impl ReportRepository for MemoryRepository {
    fn insert(&self, record: StoredReport) -> Result<StoredReport, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.report_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.report_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<StoredReport>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct UnavailableRepository;

impl ReportRepository for UnavailableRepository {
    fn insert(&self, _record: StoredReport) -> Result<StoredReport, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ReportId) -> Result<Option<StoredReport>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (AuditService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AuditService::new(repository.clone(), Arc::new(engine()));
    (service, repository)
}

pub(super) fn router_with_service(service: AuditService<MemoryRepository>) -> axum::Router {
    audit_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
