//! Health check endpoint

use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy", or "degraded" when required settings are missing
    pub status: &'static str,
    pub version: &'static str,
    /// Minimum gap between Printful calls
    pub rate_limit_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

/// GET /health - Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let problem = state.settings.validate().err().map(|e| e.to_string());

    HttpResponse::Ok().json(HealthResponse {
        status: if problem.is_none() { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        rate_limit_ms: state.settings.printful.rate_limit_ms,
        problem,
    })
}
