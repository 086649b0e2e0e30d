//! Shared types for the email processing pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::RecordError;

// ── Message reference ───────────────────────────────────────────────

/// One record of an invocation: where the raw email lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    /// Message identifier (used for logging and the summary).
    pub message_id: String,
    /// Bucket named by the event, if it named one.
    pub bucket: Option<String>,
    /// Full blob key.
    pub key: String,
}

// ── Parsed email ────────────────────────────────────────────────────

/// Headers and readable body decoded from a raw email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEmail {
    /// Sender address as it appears in the From header.
    pub from_address: String,
    /// Display name portion of the From header.
    pub from_name: Option<String>,
    pub subject: String,
    pub body_text: String,
    /// `None` when the Date header is missing or unparsable.
    pub received_date: Option<DateTime<Utc>>,
}

// ── Extracted fields ────────────────────────────────────────────────

/// Status every new row starts in.
pub const STATUS_APPLIED: &str = "Applied";

/// Fields extracted from a matched email. Every field has a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedFields {
    pub position: String,
    pub company: String,
    pub status: &'static str,
    pub submission_date: NaiveDate,
    pub source_email: String,
    /// At most five, in order of first appearance.
    pub urls: Vec<String>,
    /// Carried for the optional "Email Subject" property.
    pub subject: String,
}

impl ExtractedFields {
    /// The canonical application URL: the first URL found, if any.
    pub fn application_url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }
}

// ── Outcomes ────────────────────────────────────────────────────────

/// Terminal outcome of one record.
#[derive(Debug)]
pub enum RecordOutcome {
    /// Row created; carries the id the database service assigned.
    Submitted { row_id: String },
    /// No keyword matched. Not an error.
    Dropped,
    /// Retrieval, parse, or submission failed.
    Failed(RecordError),
}

impl RecordOutcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submitted { .. } => "submitted",
            Self::Dropped => "dropped",
            Self::Failed(_) => "failed",
        }
    }
}

/// Per-record entry of the invocation summary.
#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    pub message_id: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RecordReport {
    pub fn new(message_id: &str, outcome: &RecordOutcome) -> Self {
        let detail = match outcome {
            RecordOutcome::Submitted { row_id } => Some(row_id.clone()),
            RecordOutcome::Dropped => None,
            RecordOutcome::Failed(e) => Some(e.to_string()),
        };
        Self {
            message_id: message_id.to_string(),
            outcome: outcome.label(),
            detail,
        }
    }
}

/// Value returned to the invoking mechanism.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InvocationSummary {
    pub submitted: usize,
    pub dropped: usize,
    pub failed: usize,
    pub records: Vec<RecordReport>,
}

impl InvocationSummary {
    pub fn push(&mut self, message_id: &str, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Submitted { .. } => self.submitted += 1,
            RecordOutcome::Dropped => self.dropped += 1,
            RecordOutcome::Failed(_) => self.failed += 1,
        }
        self.records.push(RecordReport::new(message_id, outcome));
    }
}
