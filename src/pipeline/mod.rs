//! Mockup resolution pipeline
//!
//! Request extraction, the variant resolution cascade, the mockup style
//! catalog, the style filter, and the orchestrator that ties them together.

mod attribute_search;
mod error;
mod filter;
mod orchestrator;
mod request;
mod resolver;
mod styles;
mod task;

pub use attribute_search::{find_catalog_variant, AttributeQuery, CATALOG_PAGE_SIZE};
pub use error::{PipelineError, PipelineResult};
pub use filter::{filter_styles_for_variant, FilterPolicy};
pub use orchestrator::{MockupPipeline, MockupResponse, MockupStyleResult, VariantSummary};
pub use request::MockupRequest;
pub use resolver::{IdentifierSpace, ResolutionAttempt, VariantQuery, VariantResolver};
pub use styles::{apply_task_mockups, build_style_catalog};
pub use task::{generate_blank_mockups, poll_task, TaskPolling};
