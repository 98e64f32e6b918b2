//! API module - HTTP routes and handlers

pub mod handlers;
pub mod openapi;

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;

/// Configure all API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/mockups")
                    .route("", web::post().to(handlers::mockups::create_mockups))
                    .route("", web::get().to(handlers::mockups::query_mockups))
            )
            .route(
                "/variants/{variantId}/mockups",
                web::get().to(handlers::mockups::variant_mockups),
            )
    )
    .route("/health", web::get().to(handlers::health::health_check))
    // Swagger UI and OpenAPI spec
    .service(
        SwaggerUi::new("/swagger-ui/{_:.*}")
            .url("/api-docs/openapi.json", ApiDoc::openapi())
    );
}
