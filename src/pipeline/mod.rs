//! Email-to-row pipeline.
//!
//! Every record in an invocation flows through:
//! 1. `event::parse_event()`: unwrap the event into message references
//! 2. `BlobStore::get()`: fetch the raw MIME bytes
//! 3. `mime::parse_email()`: sender, subject, text body, date
//! 4. `KeywordFilter::evaluate()`: drop anything not application-related
//! 5. `extract::extract_fields()`: position, company, dates, links
//! 6. `RowSink::create_row()`: one database row per kept email
//!
//! **Records are independent.** A failure is reported for that record only.

pub mod event;
pub mod extract;
pub mod mime;
pub mod processor;
pub mod rules;
pub mod types;
