//! Inbound request extraction
//!
//! Callers send the variant as path parameters, as query parameters or in a
//! JSON body, under several spellings. Sources are merged in that order and
//! the first value found for a field wins.

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

use crate::providers::printful::models::{as_id, first_field};

use super::error::{PipelineError, PipelineResult};
use super::filter::FilterPolicy;
use super::resolver::VariantQuery;

const VARIANT_ID_KEYS: &[&str] = &["variantId", "catalogVariantId", "syncVariantId"];
const PRODUCT_ID_KEYS: &[&str] = &["productId", "catalogProductId"];
const COLOR_KEYS: &[&str] = &["colorName", "color", "colour", "colourName", "variantColor"];
const SIZE_KEYS: &[&str] = &["size", "variantSize"];

/// A mockup request after extraction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockupRequest {
    pub query: VariantQuery,

    /// Per-request override of the configured policy
    pub include_product_wide_list: Option<bool>,

    /// Per-request override of the configured policy
    pub ignore_color: Option<bool>,
}

impl MockupRequest {
    /// Merge path, query and body sources into a request
    pub fn extract(
        body: &[u8],
        path: &HashMap<String, String>,
        query: &HashMap<String, String>,
    ) -> PipelineResult<Self> {
        let mut request = MockupRequest::default();

        request.apply(&string_map(path));
        request.apply(&string_map(query));
        request.apply(&parse_body(body));

        if !request.query.is_resolvable() {
            return Err(PipelineError::InvalidRequest(
                "Variant ID or product lookup details were not provided".to_string(),
            ));
        }

        Ok(request)
    }

    fn apply(&mut self, source: &Value) {
        if !source.is_object() {
            return;
        }

        fill(&mut self.query.variant_id, source, VARIANT_ID_KEYS);
        fill(&mut self.query.product_id, source, PRODUCT_ID_KEYS);
        fill(&mut self.query.color_name, source, COLOR_KEYS);
        fill(&mut self.query.size, source, SIZE_KEYS);

        if self.include_product_wide_list.is_none() {
            self.include_product_wide_list = source.get("includeProductWideList").and_then(as_flag);
        }
        if self.ignore_color.is_none() {
            self.ignore_color = source.get("ignoreColor").and_then(as_flag);
        }
    }

    /// Filter policy with per-request overrides applied
    pub fn policy(&self, defaults: FilterPolicy) -> FilterPolicy {
        FilterPolicy {
            include_product_wide_list: self
                .include_product_wide_list
                .unwrap_or(defaults.include_product_wide_list),
            ignore_color: self.ignore_color.unwrap_or(defaults.ignore_color),
        }
    }
}

fn fill(slot: &mut Option<String>, source: &Value, keys: &[&str]) {
    if slot.is_none() {
        *slot = first_field(source, keys).and_then(as_id);
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => Some(matches!(s.trim().to_lowercase().as_str(), "true" | "1")),
        Value::Number(n) => Some(n.as_i64() == Some(1)),
        _ => None,
    }
}

fn parse_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Failed to parse request body JSON");
            Value::Null
        }
    }
}

fn string_map(params: &HashMap<String, String>) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<Map<String, Value>>(),
    )
}
