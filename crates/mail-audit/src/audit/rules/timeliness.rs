use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::super::config::{RuleConfig, RuleConfigError};
use super::super::domain::{EvaluationContext, NormalizedEmail, RuleResult, RuleStatus};
use super::{Rule, RuleError, RuleIdentity};

const DEFAULT_MAX_HOURS: f64 = 48.0;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses an email timestamp into UTC.
///
/// Offset-aware values (RFC 3339, RFC 2822) are converted; naive values are
/// read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Checks that the email was sent within `max_hours` of "now".
///
/// Late replies keep half credit.
#[derive(Debug, Clone)]
pub struct TimelinessRule {
    identity: RuleIdentity,
    max_hours: f64,
}

impl TimelinessRule {
    pub fn from_config(config: RuleConfig) -> Result<Self, RuleConfigError> {
        let identity = RuleIdentity::from_config(&config)?;
        let max_hours = config.number("max_hours")?.unwrap_or(DEFAULT_MAX_HOURS);
        Ok(Self {
            identity,
            max_hours,
        })
    }

    pub fn max_hours(&self) -> f64 {
        self.max_hours
    }
}

impl Rule for TimelinessRule {
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
        context: &EvaluationContext,
    ) -> Result<RuleResult, RuleError> {
        let Some(raw) = email.timestamp.as_deref() else {
            return Ok(self.identity.verdict(
                RuleStatus::Fail,
                0.0,
                "No timestamp available to measure response time",
            ));
        };

        let Some(sent_at) = parse_timestamp(raw) else {
            return Ok(self.identity.verdict(
                RuleStatus::Fail,
                0.0,
                format!("Unparsable timestamp '{raw}'; response time could not be measured"),
            ));
        };

        // Clock skew can place the timestamp slightly in the future.
        let elapsed_hours =
            ((context.now - sent_at).num_milliseconds() as f64 / 3_600_000.0).max(0.0);

        Ok(if elapsed_hours <= self.max_hours {
            self.identity.verdict(
                RuleStatus::Pass,
                self.identity.points(100.0),
                format!(
                    "Response time of {elapsed_hours:.1} hours within {} hours",
                    self.max_hours
                ),
            )
        } else {
            self.identity.verdict(
                RuleStatus::Fail,
                self.identity.points(50.0),
                format!(
                    "Response time of {elapsed_hours:.1} hours exceeded {} hours",
                    self.max_hours
                ),
            )
        })
    }
}
