use mail_audit::audit::{EmailFeedback, LoadWarning, StoredReport};
use std::fmt::Write;

/// Human-readable rendering of a stored report for terminal output.
pub(crate) fn render_text(record: &StoredReport) -> String {
    let mut out = String::new();
    let report = &record.report;

    let _ = writeln!(out, "Audit report {}", record.report_id.0);
    let _ = writeln!(
        out,
        "Thread score: {:.2} ({} rules active)",
        report.thread_score, record.rules_active
    );
    if record.rules_active == 0 {
        let _ = writeln!(out, "No rules were active; the score carries no signal.");
    }
    render_warnings(&mut out, &record.load_warnings);

    for (index, bundle) in report.feedback.iter().enumerate() {
        render_feedback(&mut out, index + 1, bundle);
    }

    let _ = writeln!(out, "\nStrengths: {}", list_or_none(&report.summary.strengths));
    let _ = writeln!(
        out,
        "Improvements: {}",
        list_or_none(&report.summary.improvements)
    );
    out
}

/// Standalone HTML page for a stored report.
pub(crate) fn render_html(record: &StoredReport) -> String {
    let report = &record.report;
    let id = escape_html(&record.report_id.0);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    let _ = write!(html, "<title>Audit report {id}</title></head><body>");
    let _ = write!(html, "<h1>Audit report {id}</h1>");
    let _ = write!(
        html,
        "<p class=\"thread-score\">Thread score: {:.2} ({} rules active)</p>",
        report.thread_score, record.rules_active
    );

    if !record.load_warnings.is_empty() {
        html.push_str("<h2>Rule catalog warnings</h2><ul>");
        for warning in &record.load_warnings {
            let _ = write!(html, "<li>{}</li>", escape_html(&warning.to_string()));
        }
        html.push_str("</ul>");
    }

    for (index, bundle) in report.feedback.iter().enumerate() {
        let email = &bundle.email;
        let _ = write!(
            html,
            "<h2>Email {}: {}</h2><p>{} &rarr; {}</p>",
            index + 1,
            escape_html(&email.subject),
            escape_html(or_unknown(&email.sender)),
            escape_html(or_unknown(&email.recipient))
        );
        html.push_str("<table><tr><th>Rule</th><th>Status</th><th>Score</th>");
        html.push_str("<th>Justification</th></tr>");
        for result in &bundle.results {
            let _ = write!(
                html,
                "<tr class=\"{status}\"><td>{}</td><td>{status}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&result.rule),
                result.score,
                escape_html(&result.justification),
                status = result.status.label()
            );
        }
        html.push_str("</table>");
    }

    html.push_str("<h2>Strengths</h2>");
    push_name_list(&mut html, &report.summary.strengths);
    html.push_str("<h2>Improvements</h2>");
    push_name_list(&mut html, &report.summary.improvements);
    html.push_str("</body></html>");
    html
}

fn push_name_list(html: &mut String, names: &[String]) {
    if names.is_empty() {
        html.push_str("<p>none</p>");
        return;
    }
    html.push_str("<ul>");
    for name in names {
        let _ = write!(html, "<li>{}</li>", escape_html(name));
    }
    html.push_str("</ul>");
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn render_warnings(out: &mut String, warnings: &[LoadWarning]) {
    if warnings.is_empty() {
        return;
    }
    let _ = writeln!(out, "Rule catalog warnings");
    for warning in warnings {
        let _ = writeln!(out, "- {warning}");
    }
}

fn render_feedback(out: &mut String, position: usize, bundle: &EmailFeedback) {
    let email = &bundle.email;
    let subject = if email.subject.is_empty() {
        "(no subject)"
    } else {
        email.subject.as_str()
    };
    let _ = writeln!(out, "\nEmail {position}: {subject}");
    let _ = writeln!(
        out,
        "  {} -> {} at {}",
        or_unknown(&email.sender),
        or_unknown(&email.recipient),
        email.timestamp.as_deref().unwrap_or("unknown time")
    );
    for result in &bundle.results {
        let _ = writeln!(
            out,
            "  [{}] {} {}/100: {}",
            result.status.label().to_ascii_uppercase(),
            result.rule,
            result.score,
            result.justification
        );
    }
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "unknown"
    } else {
        value
    }
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
