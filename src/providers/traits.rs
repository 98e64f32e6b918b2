//! Provider trait definitions for the Printful integration
//!
//! The resolution pipeline talks to Printful only through [`PrintfulApi`], one
//! method per upstream resource. The production implementation sends every
//! call through the paced dispatcher; tests substitute a scripted fake.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Provider error types
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {path}")]
    NotFound { path: String, body: String },

    #[error("Upstream error: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unexpected response shape: {0}")]
    DataShape(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// HTTP 404 on a lookup; the resolver treats this as "try the next space"
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }

    /// Upstream HTTP status, when the failure came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::NotFound { .. } => Some(404),
            ProviderError::Upstream { status, .. } => Some(*status),
            ProviderError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

// ============================================================================
// Provider Trait
// ============================================================================

/// Printful API surface used by the pipeline
///
/// Every method returns the raw JSON envelope. Envelope shapes differ between
/// API generations, so parsing is left to the mapper.
#[async_trait]
pub trait PrintfulApi: Send + Sync {
    /// v2 catalog variant by catalog ID
    async fn get_catalog_variant(&self, variant_id: &str) -> ProviderResult<Value>;

    /// v2 store (sync) variant by store ID
    async fn get_store_variant(&self, variant_id: &str) -> ProviderResult<Value>;

    /// v1 variant by legacy ID
    async fn get_legacy_variant(&self, variant_id: &str) -> ProviderResult<Value>;

    /// One page of a product's catalog variant listing
    ///
    /// # Arguments
    /// * `product_id` - Catalog product ID
    /// * `limit` - Page size
    /// * `offset` - Number of records to skip
    async fn list_catalog_variants(&self, product_id: &str, limit: u32, offset: u32) -> ProviderResult<Value>;

    /// Mockup templates for a product, optionally narrowed to a variant
    async fn get_mockup_templates(&self, product_id: &str, variant_id: Option<&str>) -> ProviderResult<Value>;

    /// Printfiles (placement definitions) for a product
    async fn get_mockup_printfiles(&self, product_id: &str, variant_id: Option<&str>) -> ProviderResult<Value>;

    /// Mockup styles for a product (fallback when templates are empty)
    async fn get_mockup_styles(&self, product_id: &str) -> ProviderResult<Value>;

    /// Start a mockup generation task
    async fn create_mockup_task(&self, product_id: &str, payload: &Value) -> ProviderResult<Value>;

    /// Fetch the current state of a mockup generation task
    async fn get_mockup_task(&self, task_key: &str) -> ProviderResult<Value>;
}
