//! Field extraction: heuristic, best-effort, never fatal.
//!
//! One pure function per field so each fallback chain can be tested alone:
//! - position: subject → first [`POSITION_BODY_SCAN_CHARS`] of body → placeholder
//! - company: display name (unless generic) → registrable domain label → placeholder
//! - urls: body order of first appearance, tracking links dropped, at most [`MAX_URLS`]
//! - submission date: received timestamp (or processing time) as a date

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

use crate::pipeline::types::{ExtractedFields, ParsedEmail, STATUS_APPLIED};

pub const UNKNOWN_POSITION: &str = "Unknown Position";
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// How much of the body the position scan looks at.
pub const POSITION_BODY_SCAN_CHARS: usize = 500;

/// Upper bound on extracted URLs.
pub const MAX_URLS: usize = 5;

/// Up to five qualifier words followed by Intern/Internship, any case.
/// Stopwords trim the phrase afterwards.
static ROLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b((?:[a-z][\w&/+.-]*[ \t]+){1,5}intern(?:ship)?s?)\b").expect("valid regex")
});

static SUBJECT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:re|fwd?|fw)\s*:\s*|\[[^\]]*\]\s*)+").expect("valid regex")
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("valid regex"));

/// Words that end a role phrase when scanning backwards from "Intern".
const ROLE_STOPWORDS: &[&str] = &[
    "a", "about", "an", "and", "application", "applied", "apply", "applying", "as", "at", "dear",
    "for", "fw", "fwd", "hello", "hi", "in", "is", "my", "of", "on", "our", "re", "thank",
    "thanks", "the", "this", "to", "with", "you", "your",
];

/// Recruiting words removed from display names and domain labels.
const COMPANY_AFFIXES: &[&str] = &[
    "acquisition", "career", "careers", "hiring", "hr", "jobs", "mail", "recruiting",
    "recruitment", "talent", "team", "university",
];

/// Display-name tokens that mark a mail system or an individual, not a company.
const GENERIC_SENDER_TOKENS: &[&str] = &[
    "ashby", "daemon", "donotreply", "greenhouse", "icims", "jobvite", "lever", "mailer",
    "noreply", "notification", "notifications", "postmaster", "recruiter", "smartrecruiters",
    "taleo", "workday",
];

/// Second-level labels that sit under a country code (`co.uk`, `com.au`).
const SECOND_LEVEL_LABELS: &[&str] = &["ac", "co", "com", "edu", "gov", "net", "org"];

/// URL fragments of tracking and subscription links.
const TRACKING_MARKERS: &[&str] = &["unsubscribe", "pixel", "track", "beacon"];

/// Extract all row fields from a matched email.
///
/// Deterministic for a given email and processing time. When the email has
/// no usable Date header the submission date is the processing date, so the
/// same bytes extracted on either side of midnight differ in that field
/// only; every other field depends on the email alone.
pub fn extract_fields(email: &ParsedEmail, processed_at: DateTime<Utc>) -> ExtractedFields {
    ExtractedFields {
        position: extract_position(&email.subject, &email.body_text),
        company: extract_company(email.from_name.as_deref(), &email.from_address),
        status: STATUS_APPLIED,
        submission_date: submission_date(email.received_date, processed_at),
        source_email: email.from_address.clone(),
        urls: extract_urls(&email.body_text),
        subject: email.subject.clone(),
    }
}

// ── Position ────────────────────────────────────────────────────────

pub fn extract_position(subject: &str, body: &str) -> String {
    let body_head: String = body.chars().take(POSITION_BODY_SCAN_CHARS).collect();
    role_in(&clean_subject(subject))
        .or_else(|| role_in(&body_head))
        .unwrap_or_else(|| UNKNOWN_POSITION.to_string())
}

/// Remove reply/forward markers and `[tag]` prefixes.
pub fn clean_subject(subject: &str) -> String {
    SUBJECT_PREFIX.replace(subject.trim(), "").trim().to_string()
}

fn role_in(text: &str) -> Option<String> {
    ROLE.captures_iter(text).find_map(|cap| {
        let words: Vec<&str> = cap[1].split_whitespace().collect();
        let (title, qualifiers) = words.split_last()?;

        let mut kept: Vec<&str> = qualifiers
            .iter()
            .rev()
            .take_while(|w| !ROLE_STOPWORDS.contains(&w.to_lowercase().as_str()))
            .copied()
            .collect();
        if kept.is_empty() {
            return None;
        }
        kept.reverse();
        kept.push(*title);
        Some(kept.join(" "))
    })
}

// ── Company ─────────────────────────────────────────────────────────

pub fn extract_company(from_name: Option<&str>, from_address: &str) -> String {
    from_name
        .and_then(company_from_display_name)
        .or_else(|| company_from_domain(from_address))
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string())
}

/// Display name with recruiting affixes removed, unless it names a mail
/// system or a person's recruiting role.
pub fn company_from_display_name(name: &str) -> Option<String> {
    let lower = name.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    let squashed: String = tokens.concat();
    if tokens.iter().any(|t| GENERIC_SENDER_TOKENS.contains(t))
        || squashed.contains("noreply")
        || squashed.contains("donotreply")
    {
        return None;
    }

    let kept: Vec<&str> = name
        .split_whitespace()
        .filter(|w| {
            let bare = w
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            !COMPANY_AFFIXES.contains(&bare.as_str())
        })
        .collect();
    let company = kept
        .join(" ")
        .trim_matches(|c: char| !c.is_alphanumeric() && c != ')' && c != '.')
        .to_string();

    (company.chars().count() > 2).then_some(company)
}

/// Title-cased registrable label of the sender's domain.
///
/// `jane@acme-careers.com` → `Acme`, `hr@mail.globex.co.uk` → `Globex`.
pub fn company_from_domain(address: &str) -> Option<String> {
    let (_, domain) = address.rsplit_once('@')?;
    let domain = domain
        .trim()
        .trim_end_matches(|c: char| c == '>' || c == '.')
        .to_lowercase();
    let mut labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();
    if labels.is_empty() {
        return None;
    }

    if labels.len() > 1 {
        let tld = labels.pop()?;
        if tld.len() == 2
            && labels.len() > 1
            && labels.last().is_some_and(|l| SECOND_LEVEL_LABELS.contains(l))
        {
            labels.pop();
        }
    }
    let label = labels.last()?;

    let parts: Vec<&str> = label.split('-').filter(|p| !p.is_empty()).collect();
    let meaningful: Vec<&str> = parts
        .iter()
        .copied()
        .filter(|p| !COMPANY_AFFIXES.contains(p) && *p != "noreply")
        .collect();
    let chosen = if meaningful.is_empty() { parts } else { meaningful };
    if chosen.is_empty() {
        return None;
    }

    Some(
        chosen
            .iter()
            .map(|p| capitalize(p))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ── URLs ────────────────────────────────────────────────────────────

/// URLs in order of first appearance, deduplicated, at most [`MAX_URLS`].
pub fn extract_urls(body: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();

    for m in URL.find_iter(body) {
        let url = m
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '\'']);
        let has_host = url
            .split_once("://")
            .is_some_and(|(_, rest)| !rest.is_empty());
        if !has_host {
            continue;
        }

        let lower = url.to_lowercase();
        if TRACKING_MARKERS.iter().any(|t| lower.contains(t)) {
            continue;
        }
        if urls.iter().any(|u| u == url) {
            continue;
        }

        urls.push(url.to_string());
        if urls.len() == MAX_URLS {
            break;
        }
    }

    urls
}

// ── Dates ───────────────────────────────────────────────────────────

pub fn submission_date(
    received: Option<DateTime<Utc>>,
    processed_at: DateTime<Utc>,
) -> NaiveDate {
    received.unwrap_or(processed_at).date_naive()
}
