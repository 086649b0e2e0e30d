//! Inbox Tracker: turns application emails into database rows.

pub mod config;
pub mod error;
pub mod notion;
pub mod pipeline;
pub mod store;
