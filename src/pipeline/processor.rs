//! Email processor: runs each record through fetch → parse → match →
//! extract → submit.
//!
//! Records are processed sequentially. A failing record is logged and
//! reported; it never stops the records after it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{Error, RecordError};
use crate::notion::{DatabaseRow, RowSink};
use crate::pipeline::event;
use crate::pipeline::extract::extract_fields;
use crate::pipeline::mime::parse_email;
use crate::pipeline::rules::KeywordFilter;
use crate::pipeline::types::{InvocationSummary, MessageRef, RecordOutcome};
use crate::store::BlobStore;

/// The single pipeline component.
pub struct EmailProcessor<'a> {
    config: &'a Config,
    blobs: Arc<dyn BlobStore>,
    sink: Arc<dyn RowSink>,
    filter: KeywordFilter,
}

impl<'a> EmailProcessor<'a> {
    pub fn new(config: &'a Config, blobs: Arc<dyn BlobStore>, sink: Arc<dyn RowSink>) -> Self {
        Self {
            config,
            blobs,
            sink,
            filter: KeywordFilter::new(&config.keywords),
        }
    }

    /// Run one invocation from raw event JSON.
    ///
    /// Only a malformed event fails the invocation; record failures are
    /// folded into the summary.
    pub async fn handle_event(&self, raw_event: &str) -> Result<InvocationSummary, Error> {
        let refs = event::parse_event(raw_event, &self.config.key_prefix)?;
        Ok(self.process_batch(&refs).await)
    }

    /// Process records one at a time, isolating failures per record.
    pub async fn process_batch(&self, refs: &[MessageRef]) -> InvocationSummary {
        info!(
            count = refs.len(),
            keywords = self.filter.keywords().len(),
            sink = self.sink.name(),
            "Processing invocation records"
        );

        let mut summary = InvocationSummary::default();
        for message in refs {
            let outcome = self.process(message, Utc::now()).await;
            summary.push(&message.message_id, &outcome);
        }

        info!(
            submitted = summary.submitted,
            dropped = summary.dropped,
            failed = summary.failed,
            "Invocation complete"
        );
        summary
    }

    /// Process a single record to its terminal outcome.
    pub async fn process(&self, message: &MessageRef, processed_at: DateTime<Utc>) -> RecordOutcome {
        match self.try_process(message, processed_at).await {
            Ok(Some(row_id)) => {
                info!(message_id = %message.message_id, row_id = %row_id, "Row submitted");
                RecordOutcome::Submitted { row_id }
            }
            Ok(None) => RecordOutcome::Dropped,
            Err(e) => {
                match &e {
                    RecordError::Submission(_) => {
                        error!(message_id = %message.message_id, error = %e, "Row submission failed")
                    }
                    _ => warn!(
                        message_id = %message.message_id,
                        stage = e.stage(),
                        error = %e,
                        "Skipping record"
                    ),
                }
                RecordOutcome::Failed(e)
            }
        }
    }

    /// `Ok(None)` means the keyword filter dropped the email.
    async fn try_process(
        &self,
        message: &MessageRef,
        processed_at: DateTime<Utc>,
    ) -> Result<Option<String>, RecordError> {
        let bucket = message.bucket.as_deref().unwrap_or(&self.config.bucket);
        info!(
            message_id = %message.message_id,
            store = self.blobs.name(),
            "Fetching {bucket}/{}",
            message.key
        );

        let raw = self.blobs.get(bucket, &message.key).await?;
        let email = parse_email(&raw)?;
        debug!(
            message_id = %message.message_id,
            sender = %email.from_address,
            subject = %email.subject,
            "Email parsed"
        );

        let Some(keyword) = self.filter.evaluate(&email) else {
            info!(
                message_id = %message.message_id,
                "Email does not match any keyword, dropping"
            );
            return Ok(None);
        };
        debug!(message_id = %message.message_id, keyword, "Keyword matched");

        let fields = extract_fields(&email, processed_at);
        debug!(
            message_id = %message.message_id,
            position = %fields.position,
            company = %fields.company,
            urls = fields.urls.len(),
            "Fields extracted"
        );

        let row = DatabaseRow::from_fields(
            &fields,
            processed_at.date_naive(),
            self.config.notion.optional,
        );
        debug!(
            message_id = %message.message_id,
            sink = self.sink.name(),
            position = row.position().unwrap_or_default(),
            "Creating row"
        );
        let row_id = self.sink.create_row(&row).await?;
        Ok(Some(row_id))
    }
}
