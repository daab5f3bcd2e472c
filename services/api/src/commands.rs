use crate::infra::{parse_now, InMemoryReportRepository};
use crate::ingest::load_emails;
use crate::render::{render_html, render_text};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use mail_audit::audit::{AuditService, NormalizedEmail, RulesEngine, StoredReport};
use mail_audit::config::{AppConfig, AuditConfig};
use mail_audit::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Json,
    Text,
    Html,
}

#[derive(Args, Debug)]
pub(crate) struct AuditArgs {
    /// Email files to audit as one thread (.eml messages or .json records)
    #[arg(required = true)]
    pub(crate) files: Vec<PathBuf>,
    /// Rule catalog to load instead of the configured one
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_now)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RulesArgs {
    /// Rule catalog to load instead of the configured one
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

pub(crate) fn run_audit(args: AuditArgs) -> Result<(), AppError> {
    let AuditArgs {
        files,
        rules,
        now,
        format,
    } = args;

    let engine = resolve_engine(rules)?;
    let emails = load_emails(&files)?;
    let record = audit_emails(engine, &emails, now.unwrap_or_else(Utc::now))?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&record)
                .map_err(|err| AppError::Input(format!("report is not serializable: {err}")))?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", render_text(&record)),
        OutputFormat::Html => println!("{}", render_html(&record)),
    }
    Ok(())
}

pub(crate) fn run_rules(args: RulesArgs) -> Result<(), AppError> {
    let engine = resolve_engine(args.rules)?;

    println!("Active rules ({})", engine.rule_count());
    for rule in engine.rules() {
        println!(
            "- {} (weight {:.2}): {}",
            rule.name(),
            rule.weight(),
            rule.description()
        );
    }
    if !engine.warnings().is_empty() {
        println!("\nWarnings");
        for warning in engine.warnings() {
            println!("- {warning}");
        }
    }
    Ok(())
}

fn resolve_engine(rules: Option<PathBuf>) -> Result<RulesEngine, AppError> {
    let audit = match rules {
        Some(path) => AuditConfig {
            rules_path: Some(path),
        },
        None => AppConfig::load()?.audit,
    };
    Ok(audit.engine())
}

pub(crate) fn audit_emails(
    engine: RulesEngine,
    emails: &[NormalizedEmail],
    now: DateTime<Utc>,
) -> Result<StoredReport, AppError> {
    let repository = Arc::new(InMemoryReportRepository::default());
    let service = AuditService::new(repository, Arc::new(engine));
    Ok(service.audit_thread_at(emails, now)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use mail_audit::audit::AuditServiceError;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0)
            .single()
            .expect("valid instant")
    }

    #[test]
    fn audit_emails_uses_the_supplied_instant() {
        let email = NormalizedEmail {
            subject: "Re: parking".to_string(),
            timestamp: Some((now() - Duration::hours(2)).to_rfc3339()),
            body: "Hi Sam.".to_string(),
            ..NormalizedEmail::default()
        };

        let record = audit_emails(RulesEngine::standard(), &[email], now()).expect("audit runs");

        let timeliness = &record.report.feedback[0].results[1];
        assert_eq!(timeliness.rule, "response_time");
        assert_eq!(timeliness.score, 100);
        assert_eq!(record.rules_active, 3);
    }

    #[test]
    fn empty_input_is_rejected() {
        let result = audit_emails(RulesEngine::standard(), &[], now());
        assert!(matches!(
            result,
            Err(AppError::Audit(AuditServiceError::EmptyThread))
        ));
    }

    #[test]
    fn explicit_rules_path_overrides_configuration() {
        let engine = resolve_engine(Some(PathBuf::from("/nonexistent/rules.json")))
            .expect("missing catalog degrades instead of failing");
        assert!(engine.is_empty());
        assert_eq!(engine.warnings().len(), 1);
    }
}
