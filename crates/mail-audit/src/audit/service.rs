use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{EvaluationContext, NormalizedEmail};
use super::engine::RulesEngine;
use super::report::{EmailFeedback, ScoreAggregator};
use super::repository::{RepositoryError, ReportId, ReportRepository, StoredReport};

/// Service composing a shared rules engine with report storage.
pub struct AuditService<R> {
    engine: Arc<RulesEngine>,
    repository: Arc<R>,
}

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("audit-{id:06}"))
}

impl<R> AuditService<R>
where
    R: ReportRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: Arc<RulesEngine>) -> Self {
        Self { engine, repository }
    }

    pub fn engine(&self) -> &RulesEngine {
        &self.engine
    }

    /// Audit a single email and persist the resulting report.
    pub fn audit(&self, email: &NormalizedEmail) -> Result<StoredReport, AuditServiceError> {
        self.audit_thread_at(std::slice::from_ref(email), Utc::now())
    }

    pub fn audit_at(
        &self,
        email: &NormalizedEmail,
        now: DateTime<Utc>,
    ) -> Result<StoredReport, AuditServiceError> {
        self.audit_thread_at(std::slice::from_ref(email), now)
    }

    /// Audit every email of a thread into one combined report.
    pub fn audit_thread(
        &self,
        emails: &[NormalizedEmail],
    ) -> Result<StoredReport, AuditServiceError> {
        self.audit_thread_at(emails, Utc::now())
    }

    pub fn audit_thread_at(
        &self,
        emails: &[NormalizedEmail],
        now: DateTime<Utc>,
    ) -> Result<StoredReport, AuditServiceError> {
        if emails.is_empty() {
            return Err(AuditServiceError::EmptyThread);
        }

        let context = EvaluationContext::at(now);
        let feedback = emails
            .iter()
            .map(|email| EmailFeedback {
                email: email.identity(),
                results: self.engine.evaluate_with(email, &context),
            })
            .collect();
        let report = ScoreAggregator::aggregate_thread(feedback);

        let record = StoredReport {
            report_id: next_report_id(),
            rules_active: self.engine.rule_count(),
            load_warnings: self.engine.warnings().to_vec(),
            report,
        };
        let stored = self.repository.insert(record)?;

        info!(
            report_id = %stored.report_id.0,
            emails = emails.len(),
            thread_score = stored.report.thread_score,
            "audit report stored"
        );
        Ok(stored)
    }

    /// Fetch a previously stored report.
    pub fn get(&self, report_id: &ReportId) -> Result<StoredReport, AuditServiceError> {
        let record = self
            .repository
            .fetch(report_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

/// Error raised by the audit service.
#[derive(Debug, thiserror::Error)]
pub enum AuditServiceError {
    #[error("an audit needs at least one email")]
    EmptyThread,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
