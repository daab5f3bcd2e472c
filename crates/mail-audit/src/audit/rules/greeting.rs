use super::super::config::{RuleConfig, RuleConfigError};
use super::super::domain::{EvaluationContext, NormalizedEmail, RuleResult, RuleStatus};
use super::{Rule, RuleError, RuleIdentity};

/// Number of leading body characters searched for a greeting.
const GREETING_WINDOW: usize = 200;

/// Passes when the opening of the body contains a configured greeting.
#[derive(Debug, Clone)]
pub struct GreetingRule {
    identity: RuleIdentity,
    keywords: Vec<String>,
}

impl GreetingRule {
    pub fn from_config(config: RuleConfig) -> Result<Self, RuleConfigError> {
        let identity = RuleIdentity::from_config(&config)?;
        // An empty list never matches.
        let keywords = config.keywords("keywords")?.unwrap_or_default();
        Ok(Self { identity, keywords })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Rule for GreetingRule {
    fn name(&self) -> &str {
        &self.identity.name
    }

    fn description(&self) -> &str {
        &self.identity.description
    }

    fn weight(&self) -> f64 {
        self.identity.weight
    }

    fn evaluate(
        &self,
        email: &NormalizedEmail,
        _context: &EvaluationContext,
    ) -> Result<RuleResult, RuleError> {
        let opening: String = email
            .body
            .to_lowercase()
            .chars()
            .take(GREETING_WINDOW)
            .collect();

        let matched = self
            .keywords
            .iter()
            .find(|keyword| !keyword.is_empty() && opening.contains(keyword.as_str()));

        Ok(match matched {
            Some(keyword) => self.identity.verdict(
                RuleStatus::Pass,
                self.identity.points(100.0),
                format!("Found professional greeting: {keyword}"),
            ),
            None => self.identity.verdict(
                RuleStatus::Fail,
                0.0,
                format!("No professional greeting found in the first {GREETING_WINDOW} characters"),
            ),
        })
    }
}
