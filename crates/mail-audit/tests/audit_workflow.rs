//! End-to-end audits through the public engine, catalog, and aggregator API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use mail_audit::audit::{
    Attachment, NormalizedEmail, RuleCatalog, RuleCatalogConfig, RuleStatus, RulesEngine,
    ScoreAggregator,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0)
        .single()
        .expect("valid instant")
}

fn shipped_catalog() -> String {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/rules.json");
    std::fs::read_to_string(path).expect("shipped catalog readable")
}

fn reply(body: &str, hours_ago: i64) -> NormalizedEmail {
    NormalizedEmail {
        subject: "Re: lease renewal".to_string(),
        sender: "leasing@example.com".to_string(),
        recipient: "resident@example.com".to_string(),
        timestamp: Some((now() - Duration::hours(hours_ago)).to_rfc3339()),
        body: body.to_string(),
        attachments: vec![Attachment {
            filename: "renewal.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size: 48_213,
        }],
    }
}

#[test]
fn shipped_catalog_matches_builtin_defaults() {
    let from_file = RuleCatalogConfig::from_json_str(&shipped_catalog()).expect("catalog parses");
    let loaded = RuleCatalog::builtin().load(&from_file);

    assert!(loaded.warnings.is_empty());
    let names: Vec<_> = loaded.rules.iter().map(|rule| rule.name().to_string()).collect();
    let standard: Vec<_> = RuleCatalogConfig::standard()
        .rules
        .into_iter()
        .map(|rule| rule.name)
        .collect();
    assert_eq!(names, standard);
}

#[test]
fn courteous_prompt_reply_scores_full_marks() {
    let engine = RulesEngine::from_loaded(RuleCatalog::builtin().load_json(&shipped_catalog()));
    let email = reply(
        "Dear Jordan, thank you for confirming the renewal terms. The signed copy is attached \
         and the new rent takes effect on the first of next month. Please let us know if you \
         have any questions. Best regards, the leasing office",
        3,
    );

    let report = ScoreAggregator::aggregate(email.identity(), engine.evaluate_at(&email, now()));

    assert_eq!(report.thread_score, 100.0);
    assert_eq!(
        report.summary.strengths,
        vec!["professional_greeting", "response_time", "grammar_clarity"]
    );
    assert!(report.summary.improvements.is_empty());
}

#[test]
fn late_terse_reply_earns_partial_credit_only_for_timeliness() {
    let engine = RulesEngine::standard();
    let email = reply("Attached.", 100);

    let results = engine.evaluate_at(&email, now());
    let report = ScoreAggregator::aggregate(email.identity(), results);

    let statuses: Vec<_> = report.feedback[0]
        .results
        .iter()
        .map(|result| (result.rule.as_str(), result.status, result.score))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("professional_greeting", RuleStatus::Fail, 0),
            ("response_time", RuleStatus::Fail, 50),
            ("grammar_clarity", RuleStatus::Fail, 0),
        ]
    );
    assert_eq!(report.thread_score, 16.67);
    assert!(report.summary.strengths.is_empty());
}

#[test]
fn partial_catalog_keeps_valid_entries() {
    let raw = r#"{
        "rules": [
            { "name": "professional_greeting", "keywords": ["dear"] },
            { "name": "sentiment", "description": "unsupported" },
            { "name": "grammar_clarity", "weight": 0.5 }
        ]
    }"#;

    let engine = RulesEngine::from_loaded(RuleCatalog::builtin().load_json(raw));

    assert_eq!(engine.rule_names(), vec!["professional_greeting", "grammar_clarity"]);
    assert_eq!(engine.warnings().len(), 1);
    assert!(engine.warnings()[0].to_string().contains("sentiment"));
}

#[test]
fn report_serializes_with_lowercase_statuses() {
    let engine = RulesEngine::standard();
    let email = reply("Attached.", 100);
    let report = ScoreAggregator::aggregate(email.identity(), engine.evaluate_at(&email, now()));

    let json = serde_json::to_value(&report).expect("report serializes");

    assert_eq!(json["feedback"][0]["results"][1]["status"], "fail");
    assert_eq!(json["feedback"][0]["email"]["subject"], "Re: lease renewal");
    assert_eq!(json["summary"]["improvements"].as_array().map(Vec::len), Some(3));
}
