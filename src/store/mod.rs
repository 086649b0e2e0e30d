//! Blob store access: raw email bytes keyed by message identifier.

pub mod fs;
pub mod s3;
pub mod traits;

pub use fs::FsBlobStore;
pub use s3::S3BlobStore;
pub use traits::BlobStore;
