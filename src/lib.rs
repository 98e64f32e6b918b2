//! Mockup Resolver
//!
//! Resolves Printful variant identifiers across the catalog, store and legacy
//! ID spaces, builds the product's mockup style catalog and re-hosts the
//! matching mockup images in S3.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod providers;
pub mod storage;

use crate::config::Settings;
use crate::storage::MockupUploader;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Settings,
    pub uploader: Arc<dyn MockupUploader>,
}
