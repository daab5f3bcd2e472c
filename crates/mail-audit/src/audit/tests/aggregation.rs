use super::common::*;
use crate::audit::domain::RuleStatus;
use crate::audit::report::{thread_score, EmailFeedback, ScoreAggregator};

#[test]
fn thread_score_is_mean_percentage() {
    let results = vec![
        fixed_result("greeting", RuleStatus::Pass, 100),
        fixed_result("timeliness", RuleStatus::Fail, 50),
    ];

    let report = ScoreAggregator::aggregate(well_formed_email().identity(), results);

    assert_eq!(report.thread_score, 75.0);
}

#[test]
fn empty_results_score_zero() {
    let report = ScoreAggregator::aggregate(well_formed_email().identity(), Vec::new());
    assert_eq!(report.thread_score, 0.0);
    assert_eq!(report.feedback.len(), 1);
}

#[test]
fn thread_score_rounds_to_two_decimals() {
    let results = [
        fixed_result("a", RuleStatus::Pass, 100),
        fixed_result("b", RuleStatus::Partial, 85),
        fixed_result("c", RuleStatus::Fail, 0),
    ];
    assert_eq!(thread_score(results.iter()), 61.67);
}

#[test]
fn thread_score_stays_within_bounds() {
    let all_max: Vec<_> = (0..7)
        .map(|idx| fixed_result(&format!("r{idx}"), RuleStatus::Pass, 100))
        .collect();
    let all_min: Vec<_> = (0..7)
        .map(|idx| fixed_result(&format!("r{idx}"), RuleStatus::Error, 0))
        .collect();

    assert_eq!(thread_score(all_max.iter()), 100.0);
    assert_eq!(thread_score(all_min.iter()), 0.0);
}

#[test]
fn every_non_pass_status_is_an_improvement() {
    let results = vec![
        fixed_result("greeting", RuleStatus::Pass, 100),
        fixed_result("timeliness", RuleStatus::Fail, 50),
        fixed_result("clarity", RuleStatus::Partial, 85),
        fixed_result("tone", RuleStatus::Error, 0),
    ];

    let report = ScoreAggregator::aggregate(well_formed_email().identity(), results.clone());

    assert_eq!(report.summary.strengths, vec!["greeting"]);
    assert_eq!(
        report.summary.improvements,
        vec!["timeliness", "clarity", "tone"]
    );
    assert_eq!(report.feedback[0].results, results);
}

#[test]
fn thread_summary_deduplicates_rule_names() {
    let first = EmailFeedback {
        email: well_formed_email().identity(),
        results: vec![
            fixed_result("greeting", RuleStatus::Pass, 100),
            fixed_result("timeliness", RuleStatus::Pass, 100),
        ],
    };
    let second = EmailFeedback {
        email: terse_email().identity(),
        results: vec![
            fixed_result("greeting", RuleStatus::Fail, 0),
            fixed_result("timeliness", RuleStatus::Pass, 100),
        ],
    };

    let report = ScoreAggregator::aggregate_thread(vec![first, second]);

    assert_eq!(report.thread_score, 75.0);
    assert_eq!(report.summary.strengths, vec!["greeting", "timeliness"]);
    assert_eq!(report.summary.improvements, vec!["greeting"]);
    assert_eq!(report.feedback.len(), 2);
    assert_eq!(report.feedback[1].email.sender, "sam@example.com");
}
