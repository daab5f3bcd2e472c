//! Communication quality auditing for email correspondence.
//!
//! A [`audit::RulesEngine`] evaluates every configured rule against one
//! [`audit::NormalizedEmail`] and the [`audit::ScoreAggregator`] folds the
//! verdicts into an [`audit::AuditReport`].

pub mod audit;
pub mod config;
pub mod error;
pub mod telemetry;
