//! MIME decoding: raw email bytes into a [`ParsedEmail`].

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use mail_parser::{HeaderName, Message, MessageParser, PartType};
use regex::Regex;

use crate::error::ParseError;
use crate::pipeline::types::ParsedEmail;

/// Subject used when the header is missing or blank.
pub const NO_SUBJECT: &str = "No Subject";

/// Sender used when the From header is missing entirely.
pub const UNKNOWN_SENDER: &str = "Unknown";

static ANGLE_ADDR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>\s]+)>").expect("valid regex"));

static BARE_ADDR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.+-]+@[\w.-]+\.\w+").expect("valid regex"));

/// Decode a raw email.
///
/// Transfer encodings are undone by the parser. Multipart messages yield
/// their first plain-text body, then HTML rendered to text, then the first
/// part with any readable content.
pub fn parse_email(raw: &[u8]) -> Result<ParsedEmail, ParseError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(ParseError::Empty);
    }

    let parsed = MessageParser::default()
        .parse(raw)
        .ok_or(ParseError::Unparsable)?;
    if !has_message_headers(&parsed) {
        return Err(ParseError::Unparsable);
    }

    let (from_address, from_name) = extract_sender(&parsed);
    let subject = parsed
        .subject()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_SUBJECT)
        .to_string();

    Ok(ParsedEmail {
        from_address,
        from_name,
        subject,
        body_text: extract_text(&parsed),
        received_date: extract_date(&parsed),
    })
}

/// Whether the header block looks like an email's.
///
/// Every field name must be printable ASCII without a colon, and at least one
/// of From, Subject or Date must be present. Binary blobs otherwise parse as a
/// single header whose name is the whole first line.
fn has_message_headers(parsed: &Message) -> bool {
    let headers = parsed.headers();
    let names_valid = headers.iter().all(|h| {
        let name = h.name.as_str();
        !name.is_empty() && name.bytes().all(|b| (33..=126).contains(&b) && b != b':')
    });
    let has_core = headers.iter().any(|h| {
        matches!(
            h.name,
            HeaderName::From | HeaderName::Subject | HeaderName::Date
        )
    });
    names_valid && has_core
}

/// Sender address and display name.
fn extract_sender(parsed: &Message) -> (String, Option<String>) {
    let addr = parsed.from().and_then(|a| a.first());

    let name = addr
        .and_then(|a| a.name())
        .map(|n| n.trim().trim_matches('"').trim().to_string())
        .filter(|n| !n.is_empty());

    if let Some(address) = addr.and_then(|a| a.address()).filter(|a| !a.is_empty()) {
        return (address.to_string(), name);
    }

    let raw = parsed
        .header_raw(HeaderName::From)
        .map(str::trim)
        .unwrap_or_default();
    (address_from_raw(raw), name)
}

/// Pull an address out of unparsed From header text.
pub fn address_from_raw(raw: &str) -> String {
    if let Some(cap) = ANGLE_ADDR.captures(raw) {
        return cap[1].to_string();
    }
    if let Some(m) = BARE_ADDR.find(raw) {
        return m.as_str().to_string();
    }
    if raw.is_empty() {
        UNKNOWN_SENDER.to_string()
    } else {
        raw.to_string()
    }
}

/// Extract readable text from a parsed email.
fn extract_text(parsed: &Message) -> String {
    if let Some(text) = parsed.body_text(0) {
        return text.into_owned();
    }
    if let Some(html) = parsed.body_html(0) {
        return strip_html(html.as_ref());
    }
    parsed
        .parts
        .iter()
        .find_map(|part| {
            let text = match &part.body {
                PartType::Text(t) => t.to_string(),
                PartType::Html(h) => strip_html(h),
                PartType::Binary(b) | PartType::InlineBinary(b) => {
                    std::str::from_utf8(b).ok()?.to_string()
                }
                _ => return None,
            };
            (!text.trim().is_empty()).then_some(text)
        })
        .unwrap_or_default()
}

fn extract_date(parsed: &Message) -> Option<DateTime<Utc>> {
    let date = parsed.date().filter(|d| d.is_valid())?;
    DateTime::from_timestamp(date.to_timestamp(), 0)
}

/// Strip HTML tags from content (basic).
pub fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                result.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Plain messages ──────────────────────────────────────────────

    #[test]
    fn parses_simple_message() {
        let raw = b"From: Jane Recruiter <jane@acme-careers.com>\r\n\
Subject: Software Engineering Internship - Summer 2026\r\n\
Date: Tue, 3 Mar 2026 14:30:00 -0500\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Thank you for your application to our internship program.\r\n";

        let email = parse_email(raw).unwrap();
        assert_eq!(email.from_address, "jane@acme-careers.com");
        assert_eq!(email.from_name.as_deref(), Some("Jane Recruiter"));
        assert_eq!(email.subject, "Software Engineering Internship - Summer 2026");
        assert!(email.body_text.contains("Thank you for your application"));
        assert_eq!(
            email.received_date.unwrap().to_rfc3339(),
            "2026-03-03T19:30:00+00:00"
        );
    }

    #[test]
    fn bare_from_address_has_no_name() {
        let raw = b"From: no-reply@shop.com\r\nSubject: Your order has shipped\r\n\r\nTrack it.\r\n";
        let email = parse_email(raw).unwrap();
        assert_eq!(email.from_address, "no-reply@shop.com");
        assert!(email.from_name.is_none());
    }

    #[test]
    fn missing_headers_use_defaults() {
        let raw = b"To: me@example.com\r\nDate: not a date\r\n\r\nHello\r\n";
        let email = parse_email(raw).unwrap();
        assert_eq!(email.subject, NO_SUBJECT);
        assert_eq!(email.from_address, UNKNOWN_SENDER);
        assert!(email.received_date.is_none());
    }

    #[test]
    fn garbage_date_is_none() {
        let raw = b"From: a@b.com\r\nDate: someday soon\r\nSubject: x\r\n\r\nbody\r\n";
        let email = parse_email(raw).unwrap();
        assert!(email.received_date.is_none());
    }

    // ── Encodings and multipart ─────────────────────────────────────

    #[test]
    fn decodes_quoted_printable() {
        let raw = b"From: a@b.com\r\nSubject: QP\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\r\n\
Next steps: caf=C3=A9 interview =3D soon\r\n";
        let email = parse_email(raw).unwrap();
        assert!(email.body_text.contains("café interview = soon"));
    }

    #[test]
    fn decodes_base64() {
        // "Your interview is scheduled."
        let raw = b"From: a@b.com\r\nSubject: B64\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
Content-Transfer-Encoding: base64\r\n\r\n\
WW91ciBpbnRlcnZpZXcgaXMgc2NoZWR1bGVkLg==\r\n";
        let email = parse_email(raw).unwrap();
        assert!(email.body_text.contains("Your interview is scheduled."));
    }

    #[test]
    fn multipart_prefers_plain_text() {
        let raw = b"From: a@b.com\r\nSubject: Multi\r\nMIME-Version: 1.0\r\n\
Content-Type: multipart/alternative; boundary=\"XX\"\r\n\r\n\
--XX\r\nContent-Type: text/html\r\n\r\n<p>html version</p>\r\n\
--XX\r\nContent-Type: text/plain\r\n\r\nplain version\r\n\
--XX--\r\n";
        let email = parse_email(raw).unwrap();
        assert!(email.body_text.contains("plain version"));
        assert!(!email.body_text.contains("<p>"));
    }

    #[test]
    fn html_only_rendered_to_text() {
        let raw = b"From: a@b.com\r\nSubject: Html\r\n\
Content-Type: text/html\r\n\r\n<div><b>Offer</b> letter attached</div>\r\n";
        let email = parse_email(raw).unwrap();
        assert!(email.body_text.contains("Offer"));
        assert!(email.body_text.contains("letter attached"));
        assert!(!email.body_text.contains('<'));
    }

    // ── Errors ──────────────────────────────────────────────────────

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(parse_email(b""), Err(ParseError::Empty)));
        assert!(matches!(parse_email(b" \r\n "), Err(ParseError::Empty)));
    }

    #[test]
    fn binary_blob_rejected() {
        let raw = b"\x00\x01\x02\xff\xfe internship application blob";
        assert!(matches!(parse_email(raw), Err(ParseError::Unparsable)));
    }

    #[test]
    fn message_without_core_headers_rejected() {
        let raw = b"X-Mailer: blob\r\nTo: me@example.com\r\n\r\ninternship application\r\n";
        assert!(matches!(parse_email(raw), Err(ParseError::Unparsable)));
    }

    #[test]
    fn plain_text_without_header_block_rejected() {
        let raw = b"Dear team, my internship application is attached.\r\n";
        assert!(matches!(parse_email(raw), Err(ParseError::Unparsable)));
    }

    #[test]
    fn parsing_is_deterministic() {
        let raw = b"From: Acme <hr@acme.com>\r\nSubject: Offer\r\n\r\nCongratulations\r\n";
        assert_eq!(parse_email(raw).unwrap(), parse_email(raw).unwrap());
    }

    // ── Helpers ─────────────────────────────────────────────────────

    #[test]
    fn address_from_raw_variants() {
        assert_eq!(address_from_raw("Acme <jobs@acme.com>"), "jobs@acme.com");
        assert_eq!(address_from_raw("reply to jobs@acme.io now"), "jobs@acme.io");
        assert_eq!(address_from_raw("undisclosed"), "undisclosed");
        assert_eq!(address_from_raw(""), UNKNOWN_SENDER);
    }

    #[test]
    fn strip_html_basic() {
        assert_eq!(strip_html("<p>Hello</p>"), "Hello");
        assert_eq!(
            strip_html("<div><b>Bold</b> and <i>italic</i></div>"),
            "Bold and italic"
        );
        assert_eq!(strip_html("No HTML here"), "No HTML here");
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn strip_html_separates_block_text() {
        assert_eq!(strip_html("<p>one</p><p>two</p>"), "one two");
    }
}
