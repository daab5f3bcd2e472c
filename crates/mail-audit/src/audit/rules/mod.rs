mod clarity;
mod greeting;
mod timeliness;

pub use clarity::ClarityRule;
pub use greeting::GreetingRule;
pub use timeliness::{parse_timestamp, TimelinessRule};

use super::config::{RuleConfig, RuleConfigError};
use super::domain::{EvaluationContext, NormalizedEmail, RuleResult, RuleStatus};

/// A single, independently scored compliance check.
///
/// Implementations hold only their own configuration; `evaluate` must not
/// depend on other rules or on earlier evaluations.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn weight(&self) -> f64;
    fn evaluate(
        &self,
        email: &NormalizedEmail,
        context: &EvaluationContext,
    ) -> Result<RuleResult, RuleError>;
}

/// Unexpected failure inside a rule. The engine turns these into
/// `RuleStatus::Error` verdicts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("{0}")]
    Evaluation(String),
}

/// Name, description, and weight shared by every built-in rule.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RuleIdentity {
    pub name: String,
    pub description: String,
    pub weight: f64,
}

impl RuleIdentity {
    pub(crate) fn from_config(config: &RuleConfig) -> Result<Self, RuleConfigError> {
        Ok(Self {
            name: config.name.clone(),
            description: config.description.clone(),
            weight: config.validated_weight()?,
        })
    }

    /// `weight × factor`, the scale every built-in scoring policy uses.
    pub(crate) fn points(&self, factor: f64) -> f64 {
        self.weight * factor
    }

    pub(crate) fn verdict(
        &self,
        status: RuleStatus,
        points: f64,
        justification: impl Into<String>,
    ) -> RuleResult {
        RuleResult {
            rule: self.name.clone(),
            description: self.description.clone(),
            weight: self.weight,
            status,
            score: clamp_score(points),
            justification: justification.into(),
        }
    }
}

pub(crate) fn clamp_score(points: f64) -> u8 {
    if points.is_nan() {
        return 0;
    }
    points.round().clamp(0.0, 100.0) as u8
}
