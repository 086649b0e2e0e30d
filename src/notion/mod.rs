//! Database service integration: row properties and the HTTP client.
//!
//! Rows are created against a fixed schema contract:
//! Position (title), Company (rich text), Status (status), Submission Date
//! (date), Source Email (email), Last Updated (date), plus the optional
//! Email Subject / Email Received Date / Application URL properties.

pub mod client;
pub mod properties;

pub use client::{NotionClient, RowSink};
pub use properties::DatabaseRow;
