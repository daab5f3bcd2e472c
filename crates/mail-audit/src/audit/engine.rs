use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use super::catalog::{LoadWarning, LoadedRules, RuleCatalog};
use super::config::RuleCatalogConfig;
use super::domain::{EvaluationContext, NormalizedEmail, RuleResult, RuleStatus};
use super::rules::{Rule, RuleError};

/// Evaluates the active rule set against one email at a time.
///
/// The engine keeps no per-evaluation state, so a shared reference can audit
/// any number of emails. Reconfiguration takes `&mut self` and therefore
/// cannot overlap an evaluation on the same instance.
#[derive(Default)]
pub struct RulesEngine {
    rules: Vec<Box<dyn Rule>>,
    warnings: Vec<LoadWarning>,
}

impl RulesEngine {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            rules,
            warnings: Vec::new(),
        }
    }

    pub fn from_loaded(loaded: LoadedRules) -> Self {
        Self {
            rules: loaded.rules,
            warnings: loaded.warnings,
        }
    }

    /// Engine over the built-in catalog and default rule configuration.
    pub fn standard() -> Self {
        Self::from_config(&RuleCatalogConfig::standard())
    }

    pub fn from_config(config: &RuleCatalogConfig) -> Self {
        Self::from_loaded(RuleCatalog::builtin().load(config))
    }

    /// Loads the catalog file at `path`. Unreadable or malformed files produce
    /// an engine with zero active rules; see [`RulesEngine::warnings`].
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::from_loaded(RuleCatalog::builtin().load_path(path))
    }

    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// True when no rules are active, which callers must not confuse with an
    /// audit where every rule passed.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Removes the rule registered under `name`, returning whether one existed.
    pub fn remove_rule(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|rule| rule.name() != name);
        self.rules.len() != before
    }

    pub fn evaluate(&self, email: &NormalizedEmail) -> Vec<RuleResult> {
        self.evaluate_with(email, &EvaluationContext::current())
    }

    pub fn evaluate_at(&self, email: &NormalizedEmail, now: DateTime<Utc>) -> Vec<RuleResult> {
        self.evaluate_with(email, &EvaluationContext::at(now))
    }

    /// Produces exactly one result per active rule, in catalog order.
    pub fn evaluate_with(
        &self,
        email: &NormalizedEmail,
        context: &EvaluationContext,
    ) -> Vec<RuleResult> {
        self.rules
            .iter()
            .map(|rule| evaluate_isolated(rule.as_ref(), email, context))
            .collect()
    }
}

fn evaluate_isolated(
    rule: &dyn Rule,
    email: &NormalizedEmail,
    context: &EvaluationContext,
) -> RuleResult {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(email, context)));

    let cause = match outcome {
        Ok(Ok(result)) => {
            debug!(
                rule = rule.name(),
                status = result.status.label(),
                score = result.score,
                "rule evaluated"
            );
            return result;
        }
        Ok(Err(RuleError::Evaluation(message))) => message,
        Err(payload) => format!("rule panicked: {}", panic_message(payload.as_ref())),
    };

    error!(rule = rule.name(), %cause, "rule evaluation failed");
    RuleResult {
        rule: rule.name().to_string(),
        description: rule.description().to_string(),
        weight: rule.weight(),
        status: RuleStatus::Error,
        score: 0,
        justification: format!("Rule evaluation failed: {cause}"),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
