//! Invocation event unwrapping.
//!
//! Accepts both notification shapes the trigger can deliver:
//! - mail-service records (`ses.mail.messageId`): key = prefix + message id
//! - object-store records (`s3.bucket.name` + `s3.object.key`): key as given,
//!   form-decoded

use serde::Deserialize;

use crate::error::ValidationError;
use crate::pipeline::types::MessageRef;

#[derive(Debug, Deserialize)]
pub struct InvocationEvent {
    #[serde(rename = "Records", default)]
    pub records: Option<Vec<EventRecord>>,
}

#[derive(Debug, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub ses: Option<SesRecord>,
    #[serde(default)]
    pub s3: Option<S3Record>,
}

#[derive(Debug, Deserialize)]
pub struct SesRecord {
    pub mail: SesMail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SesMail {
    pub message_id: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Record {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Object {
    pub key: String,
}

/// Parse raw event JSON and unwrap it into message references.
pub fn parse_event(raw: &str, key_prefix: &str) -> Result<Vec<MessageRef>, ValidationError> {
    let event: InvocationEvent = serde_json::from_str(raw)?;
    unwrap_event(event, key_prefix)
}

/// Turn an invocation event into the ordered list of records to process.
///
/// Fails if the event has no records or any record names no object; nothing
/// is processed in that case.
pub fn unwrap_event(
    event: InvocationEvent,
    key_prefix: &str,
) -> Result<Vec<MessageRef>, ValidationError> {
    let records = event
        .records
        .filter(|r| !r.is_empty())
        .ok_or(ValidationError::MissingRecords)?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| unwrap_record(index, record, key_prefix))
        .collect()
}

fn unwrap_record(
    index: usize,
    record: EventRecord,
    key_prefix: &str,
) -> Result<MessageRef, ValidationError> {
    let malformed = |reason: &str| ValidationError::MalformedRecord {
        index,
        reason: reason.to_string(),
    };

    if let Some(ses) = record.ses {
        let message_id = ses.mail.message_id.trim().to_string();
        if message_id.is_empty() {
            return Err(malformed("empty messageId"));
        }
        return Ok(MessageRef {
            key: format!("{key_prefix}{message_id}"),
            message_id,
            bucket: None,
        });
    }

    if let Some(s3) = record.s3 {
        let key = decode_object_key(&s3.object.key);
        if key.is_empty() {
            return Err(malformed("empty object key"));
        }
        let message_id = key.strip_prefix(key_prefix).unwrap_or(&key).to_string();
        return Ok(MessageRef {
            message_id,
            bucket: Some(s3.bucket.name),
            key,
        });
    }

    Err(malformed("record names neither a message nor an object"))
}

/// Object keys arrive form-encoded (`+` for space, `%XX` escapes).
fn decode_object_key(key: &str) -> String {
    url::form_urlencoded::parse(key.as_bytes())
        .map(|(name, value)| {
            if value.is_empty() {
                name.into_owned()
            } else {
                format!("{name}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}
