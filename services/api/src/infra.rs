use chrono::{DateTime, Utc};
use mail_audit::audit::{RepositoryError, ReportId, ReportRepository, StoredReport};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) rules_active: usize,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReportRepository {
    records: Arc<Mutex<HashMap<ReportId, StoredReport>>>,
}

impl ReportRepository for InMemoryReportRepository {
    fn insert(&self, record: StoredReport) -> Result<StoredReport, RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&record.report_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.report_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<StoredReport>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }
}

#[cfg(test)]
impl InMemoryReportRepository {
    pub(crate) fn len(&self) -> usize {
        self.records.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("report store lock poisoned".to_string())
}

pub(crate) fn parse_now(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 instant ({err})"))
}
