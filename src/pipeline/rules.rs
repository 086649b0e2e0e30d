//! Keyword filter: the inclusion gate for application-related email.
//!
//! Case-insensitive substring match over subject + body. Any single keyword
//! qualifies the email; non-matching emails are dropped without error.

use tracing::debug;

use crate::pipeline::types::ParsedEmail;

/// Fixed keyword set, compiled once per process.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    /// Lowercased, non-empty keywords in configured order.
    keywords: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// First keyword found in the subject or body, in configured order.
    pub fn evaluate(&self, email: &ParsedEmail) -> Option<&str> {
        let haystack = format!("{} {}", email.subject, email.body_text).to_lowercase();

        let hit = self
            .keywords
            .iter()
            .find(|k| haystack.contains(k.as_str()))
            .map(String::as_str);

        if let Some(keyword) = hit {
            debug!(sender = %email.from_address, keyword, "Email matched keyword");
        }
        hit
    }
}
