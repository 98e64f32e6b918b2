//! End-to-end pipeline tests over a mocked Printful API.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mockup_resolver::pipeline::{
    FilterPolicy, MockupPipeline, MockupRequest, PipelineError, TaskPolling,
};
use mockup_resolver::providers::printful::PrintfulClient;
use mockup_resolver::providers::RequestDispatcher;
use mockup_resolver::storage::{MockupUploader, ObjectName, StorageError, StoredMockup};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Uploader that records what it was asked to store
#[derive(Default)]
struct RecordingUploader {
    uploads: Mutex<Vec<(String, String)>>,
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
        let key = name.object_key("png");
        self.uploads
            .lock()
            .expect("uploads lock")
            .push((url.to_string(), key.clone()));

        Ok(Some(StoredMockup {
            url: format!("https://mockups.s3.amazonaws.com/{}", key),
            key,
            content_type: "image/png".to_string(),
        }))
    }
}

fn test_client(base_url: &str) -> PrintfulClient {
    let dispatcher =
        RequestDispatcher::new(base_url, "test-key", Duration::from_millis(1), Duration::from_secs(5))
            .expect("dispatcher construction should not fail");
    PrintfulClient::new(dispatcher)
}

fn fast_polling() -> TaskPolling {
    TaskPolling {
        timeout: Duration::from_secs(5),
        interval: Duration::from_millis(10),
    }
}

fn request_for(variant_id: &str) -> MockupRequest {
    let query = HashMap::from([("variantId".to_string(), variant_id.to_string())]);
    MockupRequest::extract(&[], &HashMap::new(), &query).expect("request should extract")
}

async fn mount_json(server: &MockServer, verb: &str, route: &str, body: serde_json::Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn catalog_variant_keeps_matching_templates() {
    let server = MockServer::start().await;

    mount_json(
        &server,
        "GET",
        "/v2/catalog/variant/4016",
        json!({"data": {"id": 4016, "catalog_product_id": 71, "color": "Black", "size": "L"}}),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/v2/mockup-generator/templates/71",
        json!({"result": {"templates": [
            {"template_id": 301, "options": {"color": "Black"}, "printfiles": [10],
             "image_url": "https://cdn.example.com/301.png", "variant_ids": [4016]},
            {"template_id": 302, "options": {"color": "White"}, "printfiles": [10],
             "image_url": "https://cdn.example.com/302.png", "variant_ids": [4016]},
            {"template_id": 303, "options": {"color": "Black"}, "printfiles": [10],
             "image_url": "https://cdn.example.com/303.png", "variant_ids": [4017]}
        ]}}),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/v2/mockup-generator/printfiles/71",
        json!({"result": {"printfiles": [{"id": 10, "placement": "front"}]}}),
    )
    .await;

    let client = test_client(&server.uri());
    let uploader = RecordingUploader::default();
    let pipeline = MockupPipeline::new(&client, &uploader, fast_polling(), FilterPolicy::default());

    let response = pipeline.process(&request_for("4016")).await.expect("pipeline should succeed");

    assert_eq!(response.variant.id, "4016");
    assert_eq!(response.variant.product_id, "71");
    assert_eq!(response.styles.len(), 1);
    assert_eq!(response.styles[0].style_id, "301");
    assert_eq!(response.styles[0].placements, vec!["front"]);
    assert!(response.styles[0].available_for_variant);

    let uploads = uploader.uploads.lock().expect("uploads lock");
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "https://cdn.example.com/301.png");
    assert!(uploads[0].1.contains("4016"));
}

#[tokio::test]
async fn missing_previews_fall_back_to_generation_task() {
    let server = MockServer::start().await;

    mount_json(
        &server,
        "GET",
        "/v2/catalog/variant/4016",
        json!({"data": {"id": 4016, "catalog_product_id": 71, "color": "Black"}}),
    )
    .await;
    mount_json(&server, "GET", "/v2/mockup-generator/templates/71", json!({"result": {"templates": []}})).await;
    mount_json(&server, "GET", "/v2/mockup-generator/printfiles/71", json!({"result": {"printfiles": []}})).await;
    Mock::given(method("GET"))
        .and(path("/v2/mockup-generator/styles/71"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/mockup-generator/create-task/71"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"task_key": "gt-9"}})))
        .expect(1)
        .mount(&server)
        .await;
    mount_json(
        &server,
        "GET",
        "/v2/mockup-generator/task-fetch/gt-9",
        json!({"result": {"status": "completed", "mockups": [
            {"placement": "front", "mockup_url": "https://cdn.example.com/task-front.png"}
        ]}}),
    )
    .await;

    let client = test_client(&server.uri());
    let uploader = RecordingUploader::default();
    let pipeline = MockupPipeline::new(&client, &uploader, fast_polling(), FilterPolicy::default());

    let response = pipeline.process(&request_for("4016")).await.expect("pipeline should succeed");

    assert_eq!(response.styles.len(), 1);
    assert_eq!(response.styles[0].style_id, "mockup-1");
    assert_eq!(response.styles[0].placements, vec!["front"]);

    let uploads = uploader.uploads.lock().expect("uploads lock");
    assert_eq!(uploads[0].0, "https://cdn.example.com/task-front.png");
}

#[tokio::test]
async fn unknown_variant_exhausts_every_namespace_once() {
    let server = MockServer::start().await;

    for route in [
        "/v2/catalog/variant/999",
        "/v2/store-variants/999",
        "/v1/products/variant/999",
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = test_client(&server.uri());
    let uploader = RecordingUploader::default();
    let pipeline = MockupPipeline::new(&client, &uploader, fast_polling(), FilterPolicy::default());

    let err = pipeline.process(&request_for("999")).await.expect_err("resolution should fail");

    assert!(matches!(err, PipelineError::ResolutionExhausted { .. }));
    assert_eq!(err.http_status(), 404);
    assert!(uploader.uploads.lock().expect("uploads lock").is_empty());
}
