use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use super::config::{RuleCatalogConfig, RuleConfig, RuleConfigError};
use super::rules::{ClarityRule, GreetingRule, Rule, TimelinessRule};

/// Builds a rule variant from its declarative configuration.
pub type RuleConstructor = fn(RuleConfig) -> Result<Box<dyn Rule>, RuleConfigError>;

/// Registry mapping catalog names to rule variants.
///
/// New rule types are added by registering a constructor; the engine never
/// needs to know about concrete variants.
#[derive(Clone)]
pub struct RuleCatalog {
    registry: BTreeMap<String, RuleConstructor>,
}

/// Non-fatal problems found while resolving a rule catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadWarning {
    #[error("unknown rule '{name}' skipped")]
    UnknownRule { name: String },
    #[error("duplicate rule '{name}' skipped")]
    DuplicateRule { name: String },
    #[error("{reason}")]
    InvalidRule { name: String, reason: String },
    #[error("rule configuration at {path} is unreadable: {reason}")]
    Unreadable { path: String, reason: String },
    #[error("rule configuration is malformed: {reason}")]
    Malformed { reason: String },
}

/// Rules instantiated from a catalog together with anything that was skipped.
#[derive(Default)]
pub struct LoadedRules {
    pub rules: Vec<Box<dyn Rule>>,
    pub warnings: Vec<LoadWarning>,
}

impl LoadedRules {
    fn degraded(warning: LoadWarning) -> Self {
        warn!(%warning, "rule catalog unavailable; continuing with zero active rules");
        Self {
            rules: Vec::new(),
            warnings: vec![warning],
        }
    }
}

fn greeting(config: RuleConfig) -> Result<Box<dyn Rule>, RuleConfigError> {
    Ok(Box::new(GreetingRule::from_config(config)?))
}

fn timeliness(config: RuleConfig) -> Result<Box<dyn Rule>, RuleConfigError> {
    Ok(Box::new(TimelinessRule::from_config(config)?))
}

fn clarity(config: RuleConfig) -> Result<Box<dyn Rule>, RuleConfigError> {
    Ok(Box::new(ClarityRule::from_config(config)?))
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleCatalog {
    pub fn empty() -> Self {
        Self {
            registry: BTreeMap::new(),
        }
    }

    /// Catalog with the greeting, timeliness, and clarity variants.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.register("professional_greeting", greeting);
        catalog.register("response_time", timeliness);
        catalog.register("grammar_clarity", clarity);
        catalog
    }

    pub fn register(&mut self, name: impl Into<String>, constructor: RuleConstructor) {
        self.registry.insert(name.into(), constructor);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    pub fn instantiate(&self, config: RuleConfig) -> Result<Box<dyn Rule>, LoadWarning> {
        let Some(constructor) = self.registry.get(&config.name) else {
            return Err(LoadWarning::UnknownRule { name: config.name });
        };
        let name = config.name.clone();
        constructor(config).map_err(|err| LoadWarning::InvalidRule {
            name,
            reason: err.to_string(),
        })
    }

    /// Resolves every entry in order, skipping the ones that cannot be built.
    pub fn load(&self, config: &RuleCatalogConfig) -> LoadedRules {
        let mut loaded = LoadedRules::default();
        let mut seen = HashSet::new();

        for entry in &config.rules {
            if !seen.insert(entry.name.clone()) {
                let warning = LoadWarning::DuplicateRule {
                    name: entry.name.clone(),
                };
                warn!(%warning, "skipping rule");
                loaded.warnings.push(warning);
                continue;
            }

            match self.instantiate(entry.clone()) {
                Ok(rule) => loaded.rules.push(rule),
                Err(warning) => {
                    warn!(%warning, "skipping rule");
                    loaded.warnings.push(warning);
                }
            }
        }

        info!(
            active = loaded.rules.len(),
            skipped = loaded.warnings.len(),
            "rule catalog loaded"
        );
        loaded
    }

    /// Parses a JSON catalog. Malformed input yields zero rules.
    pub fn load_json(&self, raw: &str) -> LoadedRules {
        match RuleCatalogConfig::from_json_str(raw) {
            Ok(config) => self.load(&config),
            Err(err) => LoadedRules::degraded(LoadWarning::Malformed {
                reason: err.to_string(),
            }),
        }
    }

    /// Reads and parses a JSON catalog file. Unreadable or malformed files
    /// yield zero rules.
    pub fn load_path(&self, path: impl AsRef<Path>) -> LoadedRules {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(raw) => self.load_json(&raw),
            Err(err) => LoadedRules::degraded(LoadWarning::Unreadable {
                path: path.display().to_string(),
                reason: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_registers_three_variants() {
        let names: Vec<_> = RuleCatalog::builtin().names().map(str::to_string).collect();
        assert_eq!(
            names,
            vec!["grammar_clarity", "professional_greeting", "response_time"]
        );
    }

    #[test]
    fn standard_catalog_loads_in_declared_order() {
        let loaded = RuleCatalog::builtin().load(&RuleCatalogConfig::standard());
        let names: Vec<_> = loaded.rules.iter().map(|rule| rule.name()).collect();
        assert_eq!(
            names,
            vec!["professional_greeting", "response_time", "grammar_clarity"]
        );
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn duplicate_names_keep_the_first_entry() {
        let config = RuleCatalogConfig {
            rules: vec![
                RuleConfig::new("response_time", "first").with_parameter("max_hours", 12),
                RuleConfig::new("response_time", "second"),
            ],
        };

        let loaded = RuleCatalog::builtin().load(&config);

        assert_eq!(loaded.rules.len(), 1);
        assert_eq!(loaded.rules[0].description(), "first");
        assert_eq!(
            loaded.warnings,
            vec![LoadWarning::DuplicateRule {
                name: "response_time".to_string()
            }]
        );
    }

    #[test]
    fn invalid_parameters_skip_only_that_entry() {
        let config = RuleCatalogConfig {
            rules: vec![
                RuleConfig::new("response_time", "").with_parameter("max_hours", "soon"),
                RuleConfig::new("grammar_clarity", ""),
            ],
        };

        let loaded = RuleCatalog::builtin().load(&config);

        assert_eq!(loaded.rules.len(), 1);
        assert_eq!(loaded.rules[0].name(), "grammar_clarity");
        assert!(matches!(
            &loaded.warnings[..],
            [LoadWarning::InvalidRule { name, .. }] if name == "response_time"
        ));
    }

    #[test]
    fn malformed_json_degrades_to_empty_rule_set() {
        let loaded = RuleCatalog::builtin().load_json("{ \"rules\": [ { \"weight\": 1 } ] }");
        assert!(loaded.rules.is_empty());
        assert!(matches!(
            &loaded.warnings[..],
            [LoadWarning::Malformed { .. }]
        ));
    }

    #[test]
    fn missing_file_degrades_to_empty_rule_set() {
        let loaded = RuleCatalog::builtin().load_path("/nonexistent/mail-audit/rules.json");
        assert!(loaded.rules.is_empty());
        assert!(matches!(
            &loaded.warnings[..],
            [LoadWarning::Unreadable { path, .. }] if path.ends_with("rules.json")
        ));
    }
}
