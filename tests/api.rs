//! HTTP-level tests for the actix routes.

use std::sync::Arc;

use actix_web::{test, web, App};
use async_trait::async_trait;
use mockup_resolver::api::configure_routes;
use mockup_resolver::config::Settings;
use mockup_resolver::storage::{MockupUploader, ObjectName, StorageError, StoredMockup};
use mockup_resolver::AppState;
use serde_json::Value;

struct NoopUploader;

#[async_trait]
impl MockupUploader for NoopUploader {
    async fn upload_from_url(
        &self,
        _source_url: Option<&str>,
        _name: &ObjectName<'_>,
    ) -> Result<Option<StoredMockup>, StorageError> {
        Ok(None)
    }
}

fn state(settings: Settings) -> web::Data<AppState> {
    web::Data::new(AppState {
        settings,
        uploader: Arc::new(NoopUploader),
    })
}

fn configured() -> Settings {
    let mut settings = Settings::default();
    settings.printful.api_key = "test-key".to_string();
    settings.storage.bucket = "mockups".to_string();
    settings
}

#[actix_web::test]
async fn health_reports_missing_configuration() {
    let app = test::init_service(App::new().app_data(state(Settings::default())).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "degraded");
    assert!(body["problem"].as_str().unwrap_or_default().contains("PRINTFUL_API_KEY"));
}

#[actix_web::test]
async fn health_is_healthy_when_configured() {
    let app = test::init_service(App::new().app_data(state(configured())).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rate_limit_ms"], 3000);
    assert!(body.get("problem").is_none());
}

#[actix_web::test]
async fn query_route_without_variant_is_bad_request() {
    let app = test::init_service(App::new().app_data(state(configured())).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/v1/mockups?colorName=Black").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[actix_web::test]
async fn post_route_requires_configuration() {
    let app = test::init_service(App::new().app_data(state(Settings::default())).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/mockups")
        .set_payload(r#"{"variantId": 4016}"#)
        .insert_header(("content-type", "application/json"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");
}

#[actix_web::test]
async fn openapi_document_is_served() {
    let app = test::init_service(App::new().app_data(state(configured())).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api-docs/openapi.json").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert!(body["paths"]["/api/v1/variants/{variantId}/mockups"].is_object());
}
