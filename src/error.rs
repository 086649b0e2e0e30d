//! Error types for the inbox tracker.

/// Top-level error type for one invocation.
///
/// Only configuration and validation failures surface here; per-record
/// failures are caught at the record boundary as [`RecordError`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Malformed invocation input. Aborts the whole invocation.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Event has no records")]
    MissingRecords,

    #[error("Record {index} is malformed: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("Event is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Blob store read failures.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Access denied: {bucket}/{key}")]
    AccessDenied { bucket: String, key: String },

    #[error("Blob store request for {key} failed: {reason}")]
    Backend { key: String, reason: String },
}

/// Raw email bytes that could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Email is empty")]
    Empty,

    #[error("Email structure could not be parsed")]
    Unparsable,
}

/// Database service rejected or never received the create-row request.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Database service returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Data source lookup failed: {0}")]
    DataSourceLookup(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid response from database service: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for SubmissionError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

/// Failure of a single record. Never propagates to sibling records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),
}

impl RecordError {
    /// Short label for logging and the invocation summary.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Retrieval(_) => "retrieval",
            Self::Parse(_) => "parse",
            Self::Submission(_) => "submission",
        }
    }
}
