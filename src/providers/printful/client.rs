//! Printful API Client Implementation
//!
//! Implements [`PrintfulApi`] over the paced dispatcher. Each method maps to
//! exactly one upstream call, so a resolution's request count is the number
//! of trait calls the pipeline makes.
//!
//! API Docs: https://developers.printful.com/docs/

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::PrintfulSettings;
use crate::providers::http_client::RequestDispatcher;
use crate::providers::traits::{PrintfulApi, ProviderResult};

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Printful API client
pub struct PrintfulClient {
    dispatcher: RequestDispatcher,
}

impl PrintfulClient {
    /// Create a client over an existing dispatcher
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        PrintfulClient { dispatcher }
    }

    /// Create a client with its own dispatcher from settings
    pub fn from_settings(settings: &PrintfulSettings) -> ProviderResult<Self> {
        let dispatcher = RequestDispatcher::new(
            &settings.base_url,
            &settings.api_key,
            Duration::from_millis(settings.rate_limit_ms),
            Duration::from_secs(settings.request_timeout_secs),
        )?;
        Ok(Self::new(dispatcher))
    }
}

fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

fn variant_filter(variant_id: Option<&str>) -> Vec<(&'static str, String)> {
    variant_id
        .map(|id| vec![("variant_ids", id.to_string())])
        .unwrap_or_default()
}

#[async_trait]
impl PrintfulApi for PrintfulClient {
    async fn get_catalog_variant(&self, variant_id: &str) -> ProviderResult<Value> {
        let path = format!("/v2/catalog/variant/{}", segment(variant_id));
        self.dispatcher.get(&path, &[]).await
    }

    async fn get_store_variant(&self, variant_id: &str) -> ProviderResult<Value> {
        let path = format!("/v2/store-variants/{}", segment(variant_id));
        self.dispatcher.get(&path, &[]).await
    }

    async fn get_legacy_variant(&self, variant_id: &str) -> ProviderResult<Value> {
        let path = format!("/v1/products/variant/{}", segment(variant_id));
        self.dispatcher.get(&path, &[]).await
    }

    async fn list_catalog_variants(&self, product_id: &str, limit: u32, offset: u32) -> ProviderResult<Value> {
        let path = format!("/v2/catalog-products/{}/catalog-variants", segment(product_id));
        debug!(product_id = %product_id, limit, offset, "Fetching catalog variant page");
        self.dispatcher
            .get(&path, &[("limit", limit.to_string()), ("offset", offset.to_string())])
            .await
    }

    async fn get_mockup_templates(&self, product_id: &str, variant_id: Option<&str>) -> ProviderResult<Value> {
        let path = format!("/v2/mockup-generator/templates/{}", segment(product_id));
        self.dispatcher.get(&path, &variant_filter(variant_id)).await
    }

    async fn get_mockup_printfiles(&self, product_id: &str, variant_id: Option<&str>) -> ProviderResult<Value> {
        let path = format!("/v2/mockup-generator/printfiles/{}", segment(product_id));
        self.dispatcher.get(&path, &variant_filter(variant_id)).await
    }

    async fn get_mockup_styles(&self, product_id: &str) -> ProviderResult<Value> {
        let path = format!("/v2/mockup-generator/styles/{}", segment(product_id));
        self.dispatcher.get(&path, &[]).await
    }

    async fn create_mockup_task(&self, product_id: &str, payload: &Value) -> ProviderResult<Value> {
        let path = format!("/v2/mockup-generator/create-task/{}", segment(product_id));
        self.dispatcher.post(&path, payload).await
    }

    async fn get_mockup_task(&self, task_key: &str) -> ProviderResult<Value> {
        let path = format!("/v2/mockup-generator/task-fetch/{}", segment(task_key));
        self.dispatcher.get(&path, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_escapes_separators() {
        assert_eq!(segment("4016"), "4016");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
        assert_eq!(segment("gt-123?x"), "gt-123%3Fx");
    }

    #[test]
    fn test_variant_filter() {
        assert!(variant_filter(None).is_empty());
        assert_eq!(variant_filter(Some("4016")), vec![("variant_ids", "4016".to_string())]);
    }

    #[test]
    fn test_from_settings_requires_key() {
        let settings = PrintfulSettings {
            api_key: String::new(),
            ..PrintfulSettings::default()
        };
        assert!(PrintfulClient::from_settings(&settings).is_err());
    }
}
