//! Storage module for mockup images
//!
//! Downloads rendered mockups and re-hosts them in S3 under deterministic,
//! human-readable keys.

pub mod naming;
mod s3;

pub use naming::ObjectName;
pub use s3::{load_aws_config, MockupUploader, S3Uploader, StorageError, StoredMockup};
