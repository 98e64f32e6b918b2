//! OpenAPI 3.0 specification definition

use utoipa::OpenApi;

use crate::api::handlers::{
    health::HealthResponse,
    mockups::{ApiError, ErrorResponse, MockupRequestFields},
};
use crate::pipeline::{MockupResponse, MockupStyleResult, VariantSummary};
use crate::storage::StoredMockup;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mockup Resolver API",
        version = "1.0.0",
        description = "Resolves Printful variants and re-hosts their mockup images in S3"
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "mockups", description = "Variant resolution and mockup endpoints")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::mockups::create_mockups,
        crate::api::handlers::mockups::query_mockups,
        crate::api::handlers::mockups::variant_mockups,
    ),
    components(
        schemas(
            // Health schemas
            HealthResponse,
            // Mockup schemas
            MockupRequestFields,
            MockupResponse,
            MockupStyleResult,
            VariantSummary,
            StoredMockup,
            ErrorResponse,
            ApiError,
        )
    )
)]
pub struct ApiDoc;
