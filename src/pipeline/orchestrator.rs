//! Mockup pipeline orchestrator
//!
//! One invocation: resolve the variant, build and filter its product's
//! mockup styles, re-host each kept style's image, assemble the response.

use serde::Serialize;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::domain::{FilteredStyle, Variant};
use crate::providers::printful::models::first_text;
use crate::providers::PrintfulApi;
use crate::storage::{MockupUploader, ObjectName, StoredMockup};

use super::error::PipelineResult;
use super::filter::{filter_styles_for_variant, FilterPolicy};
use super::request::MockupRequest;
use super::resolver::VariantResolver;
use super::styles::build_style_catalog;
use super::task::TaskPolling;

// ============================================================================
// Response Types
// ============================================================================

/// Resolved variant, as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantSummary {
    pub id: String,
    pub product_id: String,
    pub name: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl From<&Variant> for VariantSummary {
    fn from(variant: &Variant) -> Self {
        VariantSummary {
            id: variant.variant_id.clone(),
            product_id: variant.product_id.clone(),
            name: variant.name.clone(),
            color: variant.color.clone(),
            size: variant.size.clone(),
        }
    }
}

/// A stored mockup style
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MockupStyleResult {
    pub style_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub style_type: String,
    pub color: Option<String>,
    pub placements: Vec<String>,
    pub available_for_variant: bool,
    pub upload: StoredMockup,
}

/// Successful pipeline result
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MockupResponse {
    pub variant: VariantSummary,
    pub styles: Vec<MockupStyleResult>,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Runs one mockup request end to end
pub struct MockupPipeline<'a> {
    api: &'a dyn PrintfulApi,
    uploader: &'a dyn MockupUploader,
    polling: TaskPolling,
    defaults: FilterPolicy,
}

impl<'a> MockupPipeline<'a> {
    pub fn new(
        api: &'a dyn PrintfulApi,
        uploader: &'a dyn MockupUploader,
        polling: TaskPolling,
        defaults: FilterPolicy,
    ) -> Self {
        MockupPipeline { api, uploader, polling, defaults }
    }

    /// Process a mockup request
    #[instrument(skip_all, fields(variant_id = ?request.query.variant_id, product_id = ?request.query.product_id))]
    pub async fn process(&self, request: &MockupRequest) -> PipelineResult<MockupResponse> {
        match &request.query.variant_id {
            Some(id) => info!(variant_id = %id, "Processing Printful variant"),
            None => info!(
                product_id = ?request.query.product_id,
                color = ?request.query.color_name,
                size = ?request.query.size,
                "Processing Printful variant lookup"
            ),
        }

        let variant = VariantResolver::new(self.api).resolve(&request.query).await?;
        info!(
            variant_id = %variant.variant_id,
            product_id = %variant.product_id,
            source = %variant.source,
            "Resolved Printful variant"
        );
        debug!(name = ?variant.name, color = ?variant.color, size = ?variant.size, "Variant payload parsed");

        let styles = build_style_catalog(self.api, &variant.product_id, &variant.variant_id, self.polling).await?;
        let filtered = filter_styles_for_variant(
            styles,
            &variant.variant_id,
            variant.color.as_deref(),
            request.policy(self.defaults),
        )?;

        let results = self.upload_styles(&variant, filtered).await?;

        info!(variant_id = %variant.variant_id, styles = results.len(), "Successfully processed variant");
        Ok(MockupResponse {
            variant: VariantSummary::from(&variant),
            styles: results,
        })
    }

    async fn upload_styles(&self, variant: &Variant, styles: Vec<FilteredStyle>) -> PipelineResult<Vec<MockupStyleResult>> {
        let fallback_color = variant
            .color
            .clone()
            .or_else(|| first_text(&variant.raw_variant, &["hex_color"]));

        let mut results = Vec::with_capacity(styles.len());
        for FilteredStyle { style, available_for_variant } in styles {
            let name = ObjectName {
                variant_id: &variant.variant_id,
                style_id: &style.style_id,
                color: style.color.as_deref().or(fallback_color.as_deref()),
                placements: &style.placements,
                style_type: &style.style_type,
                title: &style.title,
            };

            let Some(upload) = self.uploader.upload_from_url(style.preview_url.as_deref(), &name).await? else {
                continue;
            };

            results.push(MockupStyleResult {
                style_id: style.style_id,
                title: style.title,
                style_type: style.style_type,
                color: style.color,
                placements: style.placements,
                available_for_variant,
                upload,
            });
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineError;
    use crate::providers::testing::ScriptedApi;
    use crate::storage::StorageError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records object keys instead of touching S3
    #[derive(Default)]
    struct RecordingUploader {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MockupUploader for RecordingUploader {
        async fn upload_from_url(
            &self,
            source_url: Option<&str>,
            name: &ObjectName<'_>,
        ) -> Result<Option<StoredMockup>, StorageError> {
            let Some(url) = source_url else {
                return Ok(None);
            };
            let key = name.object_key(&crate::storage::naming::guess_extension(url));
            self.keys.lock().unwrap().push(key.clone());
            Ok(Some(StoredMockup {
                url: format!("https://bucket.test/{}", key),
                key,
                content_type: "image/png".to_string(),
            }))
        }
    }

    fn request(variant_id: &str) -> MockupRequest {
        let mut request = MockupRequest::default();
        request.query.variant_id = Some(variant_id.to_string());
        request
    }

    fn pipeline<'a>(api: &'a ScriptedApi, uploader: &'a RecordingUploader) -> MockupPipeline<'a> {
        MockupPipeline::new(api, uploader, TaskPolling::default(), FilterPolicy::default())
    }

    fn variant_4016() -> serde_json::Value {
        json!({"data": {"id": 4016, "catalog_product_id": 71, "name": "Tee (Black / L)", "color": "Black", "size": "L"}})
    }

    #[tokio::test]
    async fn test_backfilled_availability_keeps_styles() {
        let api = ScriptedApi::new()
            .on("catalog:4016", variant_4016())
            .on(
                "templates:71",
                json!({"result": {
                    "templates": [
                        {"template_id": 301, "title": "Front", "image_url": "https://cdn.example.com/301.png"},
                        {"template_id": 302, "title": "Back", "image_url": "https://cdn.example.com/302.jpg"}
                    ],
                    "variant_mapping": [
                        {"variant_id": 4016, "templates": [
                            {"template_id": 301, "placement": "front"},
                            {"template_id": 302, "placement": "back"}
                        ]}
                    ]
                }}),
            )
            .on("printfiles:71", json!({"result": {"printfiles": []}}));
        let uploader = RecordingUploader::default();

        let mut req = request("4016");
        req.include_product_wide_list = Some(true);
        let response = pipeline(&api, &uploader).process(&req).await.unwrap();

        assert_eq!(response.variant.id, "4016");
        assert_eq!(response.variant.product_id, "71");
        assert_eq!(response.styles.len(), 2);
        assert!(response.styles.iter().all(|s| s.available_for_variant));
        assert_eq!(response.styles[0].placements, vec!["front"]);
        assert_eq!(
            *uploader.keys.lock().unwrap(),
            vec![
                "4016_style-301_black_front_style-front.png",
                "4016_style-302_black_back_style-back.jpg",
            ]
        );
    }

    #[tokio::test]
    async fn test_styles_without_images_are_omitted() {
        let api = ScriptedApi::new()
            .on("catalog:4016", variant_4016())
            .on(
                "templates:71",
                json!({"result": {"templates": [
                    {"template_id": 1, "image_url": "https://cdn.example.com/1.png", "variant_ids": [4016]},
                    {"template_id": 2, "variant_ids": [4016]}
                ]}}),
            )
            .on("printfiles:71", json!({"result": {}}));
        let uploader = RecordingUploader::default();

        let response = pipeline(&api, &uploader).process(&request("4016")).await.unwrap();

        let ids: Vec<_> = response.styles.iter().map(|s| s.style_id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[tokio::test]
    async fn test_unavailable_styles_fail_without_product_wide_list() {
        let api = ScriptedApi::new()
            .on("catalog:4016", variant_4016())
            .on(
                "templates:71",
                json!({"result": {"templates": [
                    {"template_id": 1, "image_url": "https://cdn.example.com/1.png", "variant_ids": [9999]}
                ]}}),
            )
            .on("printfiles:71", json!({"result": {}}));
        let uploader = RecordingUploader::default();

        let err = pipeline(&api, &uploader).process(&request("4016")).await.unwrap_err();

        assert!(matches!(err, PipelineError::EmptyResultSet { .. }));
        assert!(uploader.keys.lock().unwrap().is_empty());
    }

    #[test]
    fn test_response_serialization() {
        let response = MockupResponse {
            variant: VariantSummary {
                id: "4016".to_string(),
                product_id: "71".to_string(),
                name: None,
                color: Some("Black".to_string()),
                size: Some("L".to_string()),
            },
            styles: vec![MockupStyleResult {
                style_id: "1".to_string(),
                title: "Front".to_string(),
                style_type: "flat".to_string(),
                color: None,
                placements: vec!["front".to_string()],
                available_for_variant: true,
                upload: StoredMockup {
                    key: "k.png".to_string(),
                    url: "https://b.s3.amazonaws.com/k.png".to_string(),
                    content_type: "image/png".to_string(),
                },
            }],
        };

        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["variant"]["productId"], "71");
        assert_eq!(value["styles"][0]["type"], "flat");
        assert_eq!(value["styles"][0]["availableForVariant"], true);
        assert_eq!(value["styles"][0]["upload"]["contentType"], "image/png");
    }
}
