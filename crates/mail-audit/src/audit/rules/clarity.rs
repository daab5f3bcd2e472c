use super::super::config::{RuleConfig, RuleConfigError};
use super::super::domain::{EvaluationContext, NormalizedEmail, RuleResult, RuleStatus};
use super::{Rule, RuleError, RuleIdentity};

const DEFAULT_MIN_WORDS: usize = 10;
const DEFAULT_MAX_SENTENCES: usize = 20;
const DEFAULT_POLITE_KEYWORDS: [&str; 5] = ["please", "thank", "regards", "sincerely", "best"];

const SENTENCE_CAP_FACTOR: f64 = 70.0;
const ELLIPSIS_PENALTY: f64 = 10.0;
const EXCLAMATION_PENALTY: f64 = 10.0;
const IMPOLITE_PENALTY: f64 = 15.0;
const FAIL_THRESHOLD: f64 = 50.0;
const SCORE_CEILING: f64 = 100.0;

/// Heuristic length, structure, and courtesy checks on the body text.
#[derive(Debug, Clone)]
pub struct ClarityRule {
    identity: RuleIdentity,
    min_words: usize,
    max_sentences: usize,
    polite_keywords: Vec<String>,
}

/// Token counts the clarity checks are computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TextProfile {
    pub words: usize,
    pub sentences: usize,
    pub ellipses: usize,
    pub double_exclamations: usize,
}

impl TextProfile {
    pub(crate) fn of(body: &str) -> Self {
        Self {
            words: body.split_whitespace().count(),
            sentences: body
                .split(['.', '!', '?'])
                .filter(|fragment| !fragment.trim().is_empty())
                .count(),
            ellipses: body.matches("..").count(),
            double_exclamations: body.matches("!!").count(),
        }
    }
}

impl ClarityRule {
    pub fn from_config(config: RuleConfig) -> Result<Self, RuleConfigError> {
        let identity = RuleIdentity::from_config(&config)?;
        let min_words = config.count("min_words")?.unwrap_or(DEFAULT_MIN_WORDS);
        let max_sentences = config
            .count("max_sentences")?
            .unwrap_or(DEFAULT_MAX_SENTENCES);
        let polite_keywords = config
            .keywords("polite_keywords")?
            .unwrap_or_else(|| {
                DEFAULT_POLITE_KEYWORDS
                    .iter()
                    .map(|keyword| keyword.to_string())
                    .collect()
            });

        Ok(Self {
            identity,
            min_words,
            max_sentences,
            polite_keywords,
        })
    }

    pub fn min_words(&self) -> usize {
        self.min_words
    }

    pub fn max_sentences(&self) -> usize {
        self.max_sentences
    }

    fn is_polite(&self, body: &str) -> bool {
        let lowered = body.to_lowercase();
        self.polite_keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && lowered.contains(keyword.as_str()))
    }
}

impl Rule for ClarityRule {
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
        let body = email.body.as_str();
        if body.trim().is_empty() {
            return Ok(self
                .identity
                .verdict(RuleStatus::Fail, 0.0, "Email body is empty"));
        }

        let profile = TextProfile::of(body);
        if profile.words < self.min_words {
            return Ok(self.identity.verdict(
                RuleStatus::Fail,
                0.0,
                format!(
                    "Email too short ({} words; minimum {} required)",
                    profile.words, self.min_words
                ),
            ));
        }

        // Deductions start from the reported ceiling so weights above 1.0
        // cannot hide them.
        let mut score = self.identity.points(100.0).min(SCORE_CEILING);
        let mut issues = Vec::new();

        if profile.sentences > self.max_sentences {
            score = score.min(self.identity.points(SENTENCE_CAP_FACTOR));
            issues.push(format!(
                "too many sentences ({}; maximum {} recommended)",
                profile.sentences, self.max_sentences
            ));
        }
        if profile.ellipses > 2 {
            score = (score - ELLIPSIS_PENALTY).max(0.0);
            issues.push(format!("excessive ellipses ({})", profile.ellipses));
        }
        if profile.double_exclamations > 1 {
            score = (score - EXCLAMATION_PENALTY).max(0.0);
            issues.push(format!(
                "repeated exclamation marks ({})",
                profile.double_exclamations
            ));
        }
        if !self.is_polite(body) {
            score = (score - IMPOLITE_PENALTY).max(0.0);
            issues.push("no polite phrasing found".to_string());
        }

        if issues.is_empty() {
            return Ok(self.identity.verdict(
                RuleStatus::Pass,
                score,
                "Email length and clarity are good",
            ));
        }

        let status = if score <= FAIL_THRESHOLD {
            RuleStatus::Fail
        } else {
            RuleStatus::Partial
        };
        Ok(self.identity.verdict(status, score, issues.join(", ")))
    }
}
