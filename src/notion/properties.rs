//! Row property mapping.

use chrono::NaiveDate;
use serde_json::{Map, Value, json};

use crate::config::OptionalProperties;
use crate::pipeline::types::ExtractedFields;

/// Longest text the database accepts in a single text object.
pub const MAX_TEXT_LEN: usize = 2000;

pub const PROP_POSITION: &str = "Position";
pub const PROP_COMPANY: &str = "Company";
pub const PROP_STATUS: &str = "Status";
pub const PROP_SUBMISSION_DATE: &str = "Submission Date";
pub const PROP_SOURCE_EMAIL: &str = "Source Email";
pub const PROP_LAST_UPDATED: &str = "Last Updated";
pub const PROP_EMAIL_SUBJECT: &str = "Email Subject";
pub const PROP_RECEIVED_DATE: &str = "Email Received Date";
pub const PROP_APPLICATION_URL: &str = "Application URL";

/// The external representation of one extracted email.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseRow {
    pub properties: Map<String, Value>,
}

impl DatabaseRow {
    /// Map extracted fields onto named properties.
    pub fn from_fields(
        fields: &ExtractedFields,
        last_updated: NaiveDate,
        optional: OptionalProperties,
    ) -> Self {
        let mut properties = Map::new();
        properties.insert(PROP_POSITION.into(), title(&fields.position));
        properties.insert(PROP_COMPANY.into(), rich_text(&fields.company));
        properties.insert(
            PROP_STATUS.into(),
            json!({ "status": { "name": fields.status } }),
        );
        properties.insert(PROP_SUBMISSION_DATE.into(), date(fields.submission_date));
        properties.insert(
            PROP_SOURCE_EMAIL.into(),
            json!({ "email": fields.source_email }),
        );
        properties.insert(PROP_LAST_UPDATED.into(), date(last_updated));

        if optional.subject {
            properties.insert(PROP_EMAIL_SUBJECT.into(), rich_text(&fields.subject));
        }
        if optional.received_date {
            properties.insert(PROP_RECEIVED_DATE.into(), date(fields.submission_date));
        }
        if optional.application_url
            && let Some(url) = fields.application_url()
        {
            properties.insert(
                PROP_APPLICATION_URL.into(),
                json!({ "url": truncate(url, MAX_TEXT_LEN) }),
            );
        }

        Self { properties }
    }

    /// Title-property text, for logging.
    pub fn position(&self) -> Option<&str> {
        self.properties
            .get(PROP_POSITION)?
            .pointer("/title/0/text/content")?
            .as_str()
    }
}

fn title(text: &str) -> Value {
    json!({ "title": [ { "text": { "content": truncate(text, MAX_TEXT_LEN) } } ] })
}

fn rich_text(text: &str) -> Value {
    json!({ "rich_text": [ { "text": { "content": truncate(text, MAX_TEXT_LEN) } } ] })
}

fn date(day: NaiveDate) -> Value {
    json!({ "date": { "start": day.format("%Y-%m-%d").to_string() } })
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::STATUS_APPLIED;

    fn make_fields() -> ExtractedFields {
        ExtractedFields {
            position: "Software Engineering Internship".into(),
            company: "Acme".into(),
            status: STATUS_APPLIED,
            submission_date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            source_email: "jane@acme-careers.com".into(),
            urls: vec!["https://acme.com/apply".into()],
            subject: "Software Engineering Internship - Summer 2026".into(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()
    }

    #[test]
    fn required_properties_mapped() {
        let row = DatabaseRow::from_fields(&make_fields(), today(), OptionalProperties::default());
        let props = Value::Object(row.properties.clone());

        assert_eq!(
            props["Position"]["title"][0]["text"]["content"],
            "Software Engineering Internship"
        );
        assert_eq!(props["Company"]["rich_text"][0]["text"]["content"], "Acme");
        assert_eq!(props["Status"]["status"]["name"], "Applied");
        assert_eq!(props["Submission Date"]["date"]["start"], "2026-03-03");
        assert_eq!(props["Source Email"]["email"], "jane@acme-careers.com");
        assert_eq!(props["Last Updated"]["date"]["start"], "2026-03-05");
        assert_eq!(row.properties.len(), 6);
        assert_eq!(row.position(), Some("Software Engineering Internship"));
    }

    #[test]
    fn optional_properties_follow_flags() {
        let optional = OptionalProperties {
            subject: true,
            received_date: true,
            application_url: true,
        };
        let row = DatabaseRow::from_fields(&make_fields(), today(), optional);
        let props = Value::Object(row.properties);

        assert_eq!(
            props["Email Subject"]["rich_text"][0]["text"]["content"],
            "Software Engineering Internship - Summer 2026"
        );
        assert_eq!(props["Email Received Date"]["date"]["start"], "2026-03-03");
        assert_eq!(props["Application URL"]["url"], "https://acme.com/apply");
    }

    #[test]
    fn application_url_omitted_without_urls() {
        let mut fields = make_fields();
        fields.urls.clear();
        let optional = OptionalProperties {
            application_url: true,
            ..Default::default()
        };
        let row = DatabaseRow::from_fields(&fields, today(), optional);
        assert!(!row.properties.contains_key(PROP_APPLICATION_URL));
    }

    #[test]
    fn long_text_truncated() {
        let mut fields = make_fields();
        fields.position = "é".repeat(MAX_TEXT_LEN + 10);
        let row = DatabaseRow::from_fields(&fields, today(), OptionalProperties::default());
        assert_eq!(row.position().unwrap().chars().count(), MAX_TEXT_LEN);
    }

    #[test]
    fn truncate_short_text_untouched() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("", 3), "");
    }
}
