//! Mockup resolution endpoints
//!
//! The three routes accept the same request fields from different places
//! (path, query, body) and share one handler body.

use actix_web::{http::StatusCode, web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error as StdError;
use tracing::{error, info_span, Instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::pipeline::{MockupPipeline, MockupRequest, MockupResponse, PipelineError, PipelineResult};
use crate::providers::printful::PrintfulClient;
use crate::AppState;

/// Request fields for mockup resolution
///
/// Either `variantId` or all of `productId`, `colorName` and `size` must be
/// given. Aliases are accepted: `catalogVariantId`/`syncVariantId`,
/// `catalogProductId`, `color`/`colour`/`colourName`/`variantColor`,
/// `variantSize`.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MockupRequestFields {
    /// Catalog, store or legacy variant ID
    pub variant_id: Option<String>,
    /// Catalog product ID
    pub product_id: Option<String>,
    /// Color name (e.g., "Black")
    pub color_name: Option<String>,
    /// Size label (e.g., "L")
    pub size: Option<String>,
    /// Keep styles not listed as available for the variant
    pub include_product_wide_list: Option<bool>,
    /// Skip color matching
    pub ignore_color: Option<bool>,
}

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ApiError,
}

#[derive(Serialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    /// HTTP status Printful answered with, when the failure came from it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    /// Error source chain, only in debug mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
}

/// POST /api/v1/mockups - Resolve a variant and store its mockups
#[utoipa::path(
    post,
    path = "/api/v1/mockups",
    tag = "mockups",
    request_body = MockupRequestFields,
    responses(
        (status = 200, description = "Variant resolved and mockups stored", body = MockupResponse),
        (status = 400, description = "Neither a variant ID nor product/color/size given", body = ErrorResponse),
        (status = 404, description = "Variant could not be resolved or no style matched", body = ErrorResponse),
        (status = 502, description = "Printful or S3 failure", body = ErrorResponse),
        (status = 504, description = "Mockup generation timed out", body = ErrorResponse)
    )
)]
pub async fn create_mockups(
    state: web::Data<AppState>,
    body: web::Bytes,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    handle(&state, &body, &HashMap::new(), &query).await
}

/// GET /api/v1/mockups - Same as POST with fields in the query string
#[utoipa::path(
    get,
    path = "/api/v1/mockups",
    tag = "mockups",
    params(MockupRequestFields),
    responses(
        (status = 200, description = "Variant resolved and mockups stored", body = MockupResponse),
        (status = 400, description = "Neither a variant ID nor product/color/size given", body = ErrorResponse),
        (status = 404, description = "Variant could not be resolved or no style matched", body = ErrorResponse),
        (status = 502, description = "Printful or S3 failure", body = ErrorResponse)
    )
)]
pub async fn query_mockups(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    handle(&state, &[], &HashMap::new(), &query).await
}

/// GET /api/v1/variants/{variantId}/mockups - Mockups for one variant
#[utoipa::path(
    get,
    path = "/api/v1/variants/{variantId}/mockups",
    tag = "mockups",
    params(
        ("variantId" = String, Path, description = "Catalog, store or legacy variant ID")
    ),
    responses(
        (status = 200, description = "Variant resolved and mockups stored", body = MockupResponse),
        (status = 404, description = "Variant could not be resolved or no style matched", body = ErrorResponse),
        (status = 502, description = "Printful or S3 failure", body = ErrorResponse)
    )
)]
pub async fn variant_mockups(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let params = HashMap::from([("variantId".to_string(), path.into_inner())]);
    handle(&state, &[], &params, &query).await
}

async fn handle(
    state: &AppState,
    body: &[u8],
    path: &HashMap<String, String>,
    query: &HashMap<String, String>,
) -> HttpResponse {
    let invocation_id = Uuid::new_v4();
    let span = info_span!("invocation", invocation_id = %invocation_id);

    async {
        match process(state, body, path, query).await {
            Ok(response) => HttpResponse::Ok().json(response),
            Err(e) => {
                error!(code = e.code(), error = %e, "Failed to process Printful mockup request");
                error_response(&e, state.settings.debug.enabled || state.settings.debug.overkill)
            }
        }
    }
    .instrument(span)
    .await
}

async fn process(
    state: &AppState,
    body: &[u8],
    path: &HashMap<String, String>,
    query: &HashMap<String, String>,
) -> PipelineResult<MockupResponse> {
    let request = MockupRequest::extract(body, path, query)?;
    state.settings.validate()?;

    // One client (and pacing queue) per invocation
    let client = PrintfulClient::from_settings(&state.settings.printful)?;
    let pipeline = MockupPipeline::new(
        &client,
        state.uploader.as_ref(),
        state.settings.mockups.polling(),
        state.settings.mockups.policy(),
    );

    pipeline.process(&request).await
}

/// Structured failure response for a pipeline error
pub fn error_response(err: &PipelineError, include_trace: bool) -> HttpResponse {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let trace = include_trace.then(|| {
        let mut chain = vec![err.to_string()];
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        chain
    });

    HttpResponse::build(status).json(ErrorResponse {
        success: false,
        error: ApiError {
            code: err.code().to_string(),
            message: err.to_string(),
            upstream_status: match err {
                PipelineError::Provider(provider) => provider.status(),
                _ => None,
            },
            trace,
        },
    })
}
