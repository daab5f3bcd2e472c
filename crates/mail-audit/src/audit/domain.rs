use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attachment metadata enumerated by the ingestion layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
}

/// Plain-text view of one message, produced upstream from the raw MIME source.
///
/// `timestamp` keeps the sender's `Date` value verbatim so rules can tell an
/// absent date apart from one that does not parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEmail {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl NormalizedEmail {
    pub fn identity(&self) -> EmailIdentity {
        EmailIdentity {
            subject: self.subject.clone(),
            sender: self.sender.clone(),
            recipient: self.recipient.clone(),
            timestamp: self.timestamp.clone(),
        }
    }
}

/// Identifies which message a feedback bundle belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailIdentity {
    pub subject: String,
    pub sender: String,
    pub recipient: String,
    pub timestamp: Option<String>,
}

/// Inputs shared by every rule during a single evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationContext {
    pub now: DateTime<Utc>,
}

impl EvaluationContext {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn current() -> Self {
        Self { now: Utc::now() }
    }
}

/// Outcome class of a verdict. `Error` means the audit mechanism itself
/// degraded, not that the email failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    Pass,
    Partial,
    Fail,
    Error,
}

impl RuleStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RuleStatus::Pass => "pass",
            RuleStatus::Partial => "partial",
            RuleStatus::Fail => "fail",
            RuleStatus::Error => "error",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, RuleStatus::Pass)
    }
}

/// Verdict of one rule against one email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule: String,
    pub description: String,
    pub weight: f64,
    pub status: RuleStatus,
    pub score: u8,
    pub justification: String,
}
