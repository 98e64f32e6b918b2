//! Printful API Response Models
//!
//! Printful's three API generations (v1, catalog v2, store v2) disagree on
//! envelope and field names, so responses stay as `serde_json::Value` and are
//! read through the ordered-candidate helpers below. Request payloads have a
//! stable shape and are typed.

use serde::Serialize;
use serde_json::Value;

// ============================================================================
// Envelope Probing
// ============================================================================

/// Payload inside a response envelope: `data`, then `result`, then the
/// response itself.
pub fn unwrap_envelope(response: &Value) -> &Value {
    for key in ["data", "result"] {
        if let Some(inner) = response.get(key) {
            if inner.is_object() || inner.is_array() {
                return inner;
            }
        }
    }
    response
}

// ============================================================================
// Ordered-Candidate Extraction
// ============================================================================

/// A value counts as defined unless it is null or an empty string
pub fn is_defined(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// First defined value among the candidates
pub fn first_defined<'a, I>(candidates: I) -> Option<&'a Value>
where
    I: IntoIterator<Item = Option<&'a Value>>,
{
    candidates.into_iter().flatten().find(|v| is_defined(v))
}

/// Field lookup with dotted paths (`"options.color"`)
pub fn field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

/// First defined field among `paths`
pub fn first_field<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    first_defined(paths.iter().map(|p| field(value, p)))
}

/// First defined field among `paths`, read as an identifier
pub fn first_id(value: &Value, paths: &[&str]) -> Option<String> {
    first_field(value, paths).and_then(as_id)
}

/// First defined field among `paths`, read as text
pub fn first_text(value: &Value, paths: &[&str]) -> Option<String> {
    first_field(value, paths).and_then(as_text)
}

/// Identifier coercion: integers and non-empty strings become strings
pub fn as_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| format!("{}", f as i64))
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

/// Text coercion: non-empty strings, numbers rendered as text
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First candidate that is a JSON array
pub fn first_array<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Vec<Value>> {
    paths.iter().find_map(|p| field(value, p).and_then(Value::as_array))
}

// ============================================================================
// Legacy (v1) Variant
// ============================================================================

/// Hints extracted from a v1 variant lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyHints {
    pub legacy_variant_id: String,
    pub catalog_variant_id: Option<String>,
    pub product_id: Option<String>,
    pub color_name: Option<String>,
    pub size: Option<String>,
}

// ============================================================================
// Mockup Generation Task
// ============================================================================

/// Body for `POST /v2/mockup-generator/create-task/{product_id}`
#[derive(Debug, Clone, Serialize)]
pub struct CreateMockupTaskPayload {
    pub variant_ids: Vec<Value>,
    pub format: String,
    pub files: Vec<Value>,
    pub options: MockupTaskOptions,
}

/// Rendering options for a mockup task
#[derive(Debug, Clone, Serialize)]
pub struct MockupTaskOptions {
    pub background: String,
}

impl CreateMockupTaskPayload {
    /// Blank (no design file) render of one variant on a white background
    pub fn blank(variant_id: &str) -> Self {
        let id = variant_id
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(variant_id));

        CreateMockupTaskPayload {
            variant_ids: vec![id],
            format: "png".to_string(),
            files: Vec::new(),
            options: MockupTaskOptions {
                background: "FFFFFF".to_string(),
            },
        }
    }
}
