//! Pipeline error taxonomy
//!
//! Every fatal outcome of an invocation is a [`PipelineError`]. Each variant
//! has a stable machine code and an HTTP status for the API layer.

use thiserror::Error;

use crate::providers::ProviderError;
use crate::storage::StorageError;

/// Errors that end a mockup resolution
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Printful error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Unable to resolve Printful variant{}: {detail}", id_suffix(.attempted_id))]
    ResolutionExhausted {
        detail: String,
        attempted_id: Option<String>,
        available_colors: Vec<String>,
    },

    #[error("Printful mockup task {task_key} failed")]
    TaskFailed { task_key: String },

    #[error("Timed out after {waited_secs}s waiting for Printful mockup task {task_key}")]
    TaskTimeout { task_key: String, waited_secs: u64 },

    #[error("No mockup styles matched variant {variant_id} (color: {}, includeProductWideList: {include_product_wide_list}, ignoreColor: {ignore_color})", .variant_color.as_deref().unwrap_or("none"))]
    EmptyResultSet {
        variant_id: String,
        variant_color: Option<String>,
        include_product_wide_list: bool,
        ignore_color: bool,
        total_styles: usize,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl PipelineError {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Provider(ProviderError::DataShape(_)) => "DATA_SHAPE_ERROR",
            PipelineError::Provider(ProviderError::NotFound { .. }) => "NOT_FOUND",
            PipelineError::Provider(ProviderError::NotConfigured(_)) => "CONFIGURATION_ERROR",
            PipelineError::Provider(_) => "UPSTREAM_ERROR",
            PipelineError::ResolutionExhausted { .. } => "RESOLUTION_EXHAUSTED",
            PipelineError::TaskFailed { .. } => "TASK_FAILED",
            PipelineError::TaskTimeout { .. } => "TASK_TIMEOUT",
            PipelineError::EmptyResultSet { .. } => "EMPTY_RESULT_SET",
            PipelineError::InvalidRequest(_) => "INVALID_REQUEST",
            PipelineError::Configuration(_) => "CONFIGURATION_ERROR",
            PipelineError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// HTTP status the API layer answers with
    pub fn http_status(&self) -> u16 {
        match self {
            PipelineError::InvalidRequest(_) => 400,
            PipelineError::ResolutionExhausted { .. } | PipelineError::EmptyResultSet { .. } => 404,
            PipelineError::TaskTimeout { .. } => 504,
            PipelineError::Configuration(_)
            | PipelineError::Provider(ProviderError::NotConfigured(_)) => 500,
            PipelineError::Provider(_) | PipelineError::TaskFailed { .. } | PipelineError::Storage(_) => 502,
        }
    }
}

fn id_suffix(id: &Option<String>) -> String {
    id.as_ref().map(|id| format!(" {}", id)).unwrap_or_default()
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
