use serde::{Deserialize, Serialize};

use super::domain::{EmailIdentity, RuleResult};

/// Results for one email, in the order the engine produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailFeedback {
    pub email: EmailIdentity,
    pub results: Vec<RuleResult>,
}

/// Rule names split by whether they passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

/// Aggregated audit outcome handed to renderers and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub thread_score: f64,
    pub feedback: Vec<EmailFeedback>,
    pub summary: ReportSummary,
}

impl AuditReport {
    pub fn result_count(&self) -> usize {
        self.feedback
            .iter()
            .map(|bundle| bundle.results.len())
            .sum()
    }
}

/// Reduces rule verdicts into an [`AuditReport`].
pub struct ScoreAggregator;

impl ScoreAggregator {
    pub fn aggregate(email: EmailIdentity, results: Vec<RuleResult>) -> AuditReport {
        Self::aggregate_thread(vec![EmailFeedback { email, results }])
    }

    /// Scores every result of every email together. A rule that passed for one
    /// email and not for another is listed under both headings.
    pub fn aggregate_thread(feedback: Vec<EmailFeedback>) -> AuditReport {
        let results = feedback.iter().flat_map(|bundle| bundle.results.iter());
        let thread_score = thread_score(results.clone());

        let mut summary = ReportSummary::default();
        for result in results {
            let bucket = if result.status.is_pass() {
                &mut summary.strengths
            } else {
                &mut summary.improvements
            };
            if !bucket.contains(&result.rule) {
                bucket.push(result.rule.clone());
            }
        }

        AuditReport {
            thread_score,
            feedback,
            summary,
        }
    }
}

/// Mean score as a percentage rounded to two decimals; zero when empty.
pub fn thread_score<'a>(results: impl Iterator<Item = &'a RuleResult>) -> f64 {
    let (total, count) = results.fold((0u64, 0u64), |(total, count), result| {
        (total + u64::from(result.score), count + 1)
    });
    if count == 0 {
        return 0.0;
    }

    let percentage = total as f64 / (100.0 * count as f64) * 100.0;
    (percentage * 100.0).round() / 100.0
}
