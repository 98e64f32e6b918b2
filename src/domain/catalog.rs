//! Resolved Catalog Domain Models
//!
//! Provider-agnostic models produced by the resolution pipeline. Raw upstream
//! payloads are normalized into these types by the Printful mapper; nothing
//! here is cached or persisted, every value lives for one invocation.

use serde::Serialize;
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;
use utoipa::ToSchema;

// ============================================================================
// Variant
// ============================================================================

/// Identifier space a variant record was fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VariantSource {
    /// v2 catalog namespace
    Catalog,
    /// Merchant store (sync) namespace
    Store,
}

impl std::fmt::Display for VariantSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariantSource::Catalog => write!(f, "catalog"),
            VariantSource::Store => write!(f, "store"),
        }
    }
}

/// Canonical variant record
///
/// Both `variant_id` and `product_id` are always non-empty; the mapper refuses
/// to build a `Variant` without them.
#[derive(Debug, Clone, Serialize)]
pub struct Variant {
    /// Variant ID in the namespace it was resolved from
    pub variant_id: String,

    /// Catalog product ID
    pub product_id: String,

    /// Display name (e.g., "Black / L")
    pub name: Option<String>,

    /// Color name (e.g., "Black")
    pub color: Option<String>,

    /// Size label (e.g., "L")
    pub size: Option<String>,

    /// Where the record came from
    pub source: VariantSource,

    /// Raw variant payload from the provider
    pub raw_variant: serde_json::Value,

    /// Raw nested product payload (null when absent)
    pub raw_product: serde_json::Value,
}

/// Colors compare lowercase-trimmed
pub fn normalize_color(color: &str) -> String {
    color.trim().to_lowercase()
}

/// Sizes compare uppercase-trimmed
pub fn normalize_size(size: &str) -> String {
    size.trim().to_uppercase()
}

// ============================================================================
// Mockup Style
// ============================================================================

/// A printable mockup view for a product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    /// Provider style/template ID
    pub style_id: String,

    /// Display title
    pub title: String,

    /// Style kind (e.g., "style", "template")
    pub style_type: String,

    /// Color the mockup is rendered in, when the provider tells us
    pub color: Option<String>,

    /// Canonical placement names, in provider order
    pub placements: Vec<String>,

    /// Preview image URL
    pub preview_url: Option<String>,

    /// Variant IDs this style can render
    pub available_variant_ids: BTreeSet<String>,
}

impl Style {
    /// Create a style with defaults for everything but the ID
    pub fn new(style_id: impl Into<String>) -> Self {
        let style_id = style_id.into();
        Style {
            title: format!("Style {}", style_id),
            style_id,
            style_type: "style".to_string(),
            color: None,
            placements: Vec::new(),
            preview_url: None,
            available_variant_ids: BTreeSet::new(),
        }
    }

    /// Whether the style lists the given variant as renderable
    pub fn is_available_for(&self, variant_id: &str) -> bool {
        self.available_variant_ids.contains(variant_id)
    }
}

/// A style after the variant filter, carrying the availability annotation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredStyle {
    pub style: Style,
    pub available_for_variant: bool,
}

// ============================================================================
// Mockup Generation Task
// ============================================================================

/// Status of a mockup generation task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    Failed,
}

/// Provider status strings; anything unrecognized is still pending
impl FromStr for TaskStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "completed" => TaskStatus::Completed,
            "failed" => TaskStatus::Failed,
            _ => TaskStatus::Pending,
        })
    }
}

impl TaskStatus {
    /// Terminal states never change again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A single rendered mockup returned by a task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskMockup {
    pub style_id: Option<String>,
    pub image_url: Option<String>,
    pub placements: Vec<String>,
}

/// Mockup generation task snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockupTask {
    pub task_key: String,
    pub status: TaskStatus,
    pub mockups: Vec<TaskMockup>,
}
