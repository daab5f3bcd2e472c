use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_weight() -> f64 {
    1.0
}

/// Declarative description of one rule instance.
///
/// Rule-specific parameters sit alongside the common keys in the catalog file
/// and are collected into `parameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(flatten)]
    pub parameters: BTreeMap<String, Value>,
}

impl RuleConfig {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            weight: default_weight(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub(crate) fn validated_weight(&self) -> Result<f64, RuleConfigError> {
        if self.weight.is_finite() && self.weight >= 0.0 {
            Ok(self.weight)
        } else {
            Err(RuleConfigError::InvalidWeight {
                rule: self.name.clone(),
                weight: self.weight,
            })
        }
    }

    pub(crate) fn number(&self, key: &'static str) -> Result<Option<f64>, RuleConfigError> {
        match self.parameters.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_f64()
                .filter(|number| number.is_finite() && *number >= 0.0)
                .map(Some)
                .ok_or_else(|| self.invalid(key, "a non-negative number")),
        }
    }

    pub(crate) fn count(&self, key: &'static str) -> Result<Option<usize>, RuleConfigError> {
        match self.parameters.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .or_else(|| {
                    value
                        .as_f64()
                        .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0)
                        .map(|n| n as u64)
                })
                .and_then(|count| usize::try_from(count).ok())
                .map(Some)
                .ok_or_else(|| self.invalid(key, "a non-negative integer")),
        }
    }

    pub(crate) fn keywords(
        &self,
        key: &'static str,
    ) -> Result<Option<Vec<String>>, RuleConfigError> {
        match self.parameters.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(|keyword| keyword.to_lowercase()))
                .collect::<Option<Vec<_>>>()
                .map(Some)
                .ok_or_else(|| self.invalid(key, "a list of strings")),
            Some(_) => Err(self.invalid(key, "a list of strings")),
        }
    }

    fn invalid(&self, key: &'static str, expected: &'static str) -> RuleConfigError {
        RuleConfigError::InvalidParameter {
            rule: self.name.clone(),
            key,
            expected,
        }
    }
}

/// Ordered rule list as stored in the catalog file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleCatalogConfig {
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl RuleCatalogConfig {
    /// Built-in catalog used when no file is configured.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                RuleConfig::new(
                    "professional_greeting",
                    "Email opens with a professional greeting",
                )
                .with_parameter(
                    "keywords",
                    vec!["dear", "hello", "hi", "good morning", "good afternoon"],
                ),
                RuleConfig::new(
                    "response_time",
                    "Email was answered within the response window",
                )
                .with_parameter("max_hours", 48),
                RuleConfig::new("grammar_clarity", "Email is concise, clear, and courteous")
                    .with_parameter("min_words", 10)
                    .with_parameter("max_sentences", 20),
            ],
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Raised when a rule entry carries parameters its variant cannot use.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleConfigError {
    #[error("rule '{rule}' parameter '{key}' must be {expected}")]
    InvalidParameter {
        rule: String,
        key: &'static str,
        expected: &'static str,
    },
    #[error("rule '{rule}' weight {weight} must be a non-negative number")]
    InvalidWeight { rule: String, weight: f64 },
}
