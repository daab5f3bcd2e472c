//! Rule evaluation and scoring pipeline for email audits.
//!
//! Rules are resolved from a declarative catalog once per engine, evaluated
//! independently against each email, and reduced into a weighted report. The
//! repository, service, and router modules wrap the pipeline for callers that
//! need to keep reports around.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod report;
pub mod repository;
pub mod router;
pub mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{LoadWarning, LoadedRules, RuleCatalog, RuleConstructor};
pub use config::{RuleCatalogConfig, RuleConfig, RuleConfigError};
pub use domain::{
    Attachment, EmailIdentity, EvaluationContext, NormalizedEmail, RuleResult, RuleStatus,
};
pub use engine::RulesEngine;
pub use report::{AuditReport, EmailFeedback, ReportSummary, ScoreAggregator};
pub use repository::{ReportId, ReportRepository, RepositoryError, StoredReport};
pub use router::audit_router;
pub use rules::{ClarityRule, GreetingRule, Rule, RuleError, TimelinessRule};
pub use service::{AuditService, AuditServiceError};
