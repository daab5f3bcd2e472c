//! Turns files on disk into [`NormalizedEmail`] records.
//!
//! `.eml` files are parsed as RFC 5322 messages. `.json` files hold either a
//! single normalized record or an array of them.

use mail_audit::audit::{Attachment, NormalizedEmail};
use mail_audit::error::AppError;
use mail_parser::{HeaderName, Message, MessageParser, MimeHeaders};
use std::fs;
use std::path::Path;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

pub(crate) fn load_emails(paths: &[impl AsRef<Path>]) -> Result<Vec<NormalizedEmail>, AppError> {
    let mut emails = Vec::new();
    for path in paths {
        emails.extend(load_file(path.as_ref())?);
    }
    Ok(emails)
}

pub(crate) fn load_file(path: &Path) -> Result<Vec<NormalizedEmail>, AppError> {
    let raw = fs::read(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        parse_json(&raw).map_err(|err| AppError::Input(format!("{}: {err}", path.display())))
    } else {
        parse_eml(&raw)
            .map(|email| vec![email])
            .ok_or_else(|| AppError::Input(format!("{}: not a parsable message", path.display())))
    }
}

fn parse_json(raw: &[u8]) -> Result<Vec<NormalizedEmail>, serde_json::Error> {
    match serde_json::from_slice::<Vec<NormalizedEmail>>(raw) {
        Ok(thread) => Ok(thread),
        Err(_) => serde_json::from_slice::<NormalizedEmail>(raw).map(|email| vec![email]),
    }
}

/// Returns `None` for blank input or bytes that are not a message.
pub(crate) fn parse_eml(raw: &[u8]) -> Option<NormalizedEmail> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    let parsed = MessageParser::default().parse(raw)?;

    Some(NormalizedEmail {
        subject: parsed.subject().unwrap_or_default().to_string(),
        sender: first_address(parsed.from()),
        recipient: first_address(parsed.to()),
        timestamp: extract_timestamp(&parsed),
        body: extract_body(&parsed),
        attachments: extract_attachments(&parsed),
    })
}

fn first_address(addr: Option<&mail_parser::Address>) -> String {
    addr.and_then(|addr| addr.first())
        .and_then(|a| a.address())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// A `Date` header the parser rejects is kept verbatim so the timeliness
/// rule reports it as unparsable rather than missing.
fn extract_timestamp(parsed: &Message) -> Option<String> {
    if let Some(date) = parsed.date() {
        return Some(date.to_rfc3339());
    }
    parsed
        .header_raw(HeaderName::Date)
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(str::to_string)
}

/// HTML-only messages come back from the parser already converted to text.
fn extract_body(parsed: &Message) -> String {
    parsed
        .body_text(0)
        .map(|text| text.into_owned())
        .unwrap_or_default()
}

fn extract_attachments(parsed: &Message) -> Vec<Attachment> {
    parsed
        .attachments()
        .enumerate()
        .map(|(index, part)| {
            let filename = MimeHeaders::attachment_name(part)
                .map(|name| name.to_string())
                .unwrap_or_else(|| format!("attachment-{}", index + 1));
            let content_type = match MimeHeaders::content_type(part) {
                Some(ct) => match ct.subtype() {
                    Some(subtype) => format!("{}/{}", ct.ctype(), subtype),
                    None => ct.ctype().to_string(),
                },
                None => mime_guess::from_path(&filename)
                    .first_raw()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string(),
            };
            Attachment {
                filename,
                content_type,
                size: part.contents().len() as u64,
            }
        })
        .collect()
}
