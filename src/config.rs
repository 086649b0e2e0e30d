//! Configuration types.
//!
//! Read once at process entry and passed by reference into the processor.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default blob key prefix the mail service stores raw messages under.
pub const DEFAULT_KEY_PREFIX: &str = "emails/";

/// Default database service endpoint.
pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com/v1";

/// API version header sent with every database request.
pub const DEFAULT_NOTION_VERSION: &str = "2025-09-03";

/// Keywords that mark an email as application-related.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "internship",
    "application",
    "applied",
    "interview",
    "assessment",
    "thank you for applying",
    "we received your application",
    "position",
    "opportunity",
    "job",
    "career",
    "talent",
    "recruiting",
    "next steps",
    "coding challenge",
    "offer",
    "congratulations",
];

/// Process-wide configuration. Immutable for the lifetime of an invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bucket holding raw emails.
    pub bucket: String,
    /// Prefix prepended to a message id to form the blob key.
    pub key_prefix: String,
    /// Read blobs from this directory instead of the object store.
    pub blob_dir: Option<PathBuf>,
    /// Keyword set for the inclusion gate (lowercased).
    pub keywords: Vec<String>,
    /// Database service settings.
    pub notion: NotionConfig,
}

/// Database service settings.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_key: SecretString,
    pub database_id: String,
    /// Skips the data-source lookup when set.
    pub data_source_id: Option<String>,
    pub api_url: String,
    pub version: String,
    pub optional: OptionalProperties,
}

/// Row properties that only exist in some database schemas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalProperties {
    /// Emit "Email Subject".
    pub subject: bool,
    /// Emit "Email Received Date".
    pub received_date: bool,
    /// Emit "Application URL".
    pub application_url: bool,
}

impl Config {
    /// Build config from environment variables, loading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let flag = |key: &str| -> Result<bool, ConfigError> {
            match optional(key) {
                Some(v) => parse_bool(key, &v),
                None => Ok(false),
            }
        };

        let api_key = SecretString::from(required("NOTION_API_KEY")?);
        let database_id = required("NOTION_DB_ID")?;
        let bucket = required("S3_BUCKET_NAME")?;

        let keywords = match optional("TRACKER_KEYWORDS") {
            Some(list) => parse_keywords(&list),
            None => DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        };
        if keywords.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "TRACKER_KEYWORDS".into(),
                message: "keyword list is empty".into(),
            });
        }

        let api_url = optional("NOTION_API_URL")
            .unwrap_or_else(|| DEFAULT_NOTION_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            bucket,
            key_prefix: optional("EMAIL_KEY_PREFIX").unwrap_or_else(|| DEFAULT_KEY_PREFIX.into()),
            blob_dir: optional("BLOB_STORE_DIR").map(PathBuf::from),
            keywords,
            notion: NotionConfig {
                api_key,
                database_id,
                data_source_id: optional("NOTION_DATA_SOURCE_ID"),
                api_url,
                version: optional("NOTION_VERSION")
                    .unwrap_or_else(|| DEFAULT_NOTION_VERSION.into()),
                optional: OptionalProperties {
                    subject: flag("NOTION_INCLUDE_SUBJECT")?,
                    received_date: flag("NOTION_INCLUDE_RECEIVED_DATE")?,
                    application_url: flag("NOTION_INCLUDE_APPLICATION_URL")?,
                },
            },
        })
    }
}

/// Split a comma-separated keyword list, lowercased, blanks dropped.
fn parse_keywords(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}
