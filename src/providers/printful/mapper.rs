//! Printful to Domain Model Mapper
//!
//! One normalization function per entity. Every field is read through an
//! ordered candidate list, so differences between API generations stay in the
//! field tables here instead of leaking into the pipeline.

use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

use crate::domain::catalog::{
    normalize_color, normalize_size, MockupTask, Style, TaskMockup, TaskStatus, Variant,
    VariantSource,
};
use crate::domain::PlacementLookup;
use crate::providers::traits::{ProviderError, ProviderResult};
use super::models::*;

static NULL: Value = Value::Null;

const PREVIEW_FIELDS: &[&str] = &[
    "preview",
    "preview_url",
    "image",
    "image_url",
    "template_image",
    "thumbnail",
    "background_url",
];

const AVAILABLE_VARIANT_FIELDS: &[&str] = &[
    "available_variant_ids",
    "variant_ids",
    "catalog_variant_ids",
    "variants",
];

const CATALOG_SIZE_FIELDS: &[&str] = &[
    "size",
    "size_name",
    "sizeName",
    "size_label",
    "variant_size",
    "options.size",
];

const CATALOG_COLOR_FIELDS: &[&str] = &[
    "color",
    "color_name",
    "colorName",
    "color_code",
    "colorCode",
    "variant_color",
    "options.color",
];

const CATALOG_ID_FIELDS: &[&str] = &[
    "id",
    "catalog_variant_id",
    "catalogVariantId",
    "variant_id",
    "catalog_variantId",
];

/// Mapper for Printful API responses
pub struct PrintfulMapper;

impl PrintfulMapper {
    // ------------------------------------------------------------------------
    // Variants
    // ------------------------------------------------------------------------

    /// Map a catalog or store variant response to a canonical variant
    pub fn map_variant(response: &Value, source: VariantSource) -> ProviderResult<Variant> {
        let payload = unwrap_envelope(response);
        if !payload.is_object() {
            return Err(ProviderError::DataShape(format!(
                "{} variant response missing payload",
                source
            )));
        }

        let variant_id = first_id(payload, &["id", "variant_id", "sync_variant_id"]).ok_or_else(|| {
            ProviderError::DataShape(format!("{} variant response missing variant identifier", source))
        })?;

        let product = first_defined([
            payload.get("catalog_product"),
            payload.get("product"),
            payload.get("sync_product"),
        ])
        .filter(|p| p.is_object())
        .unwrap_or(&NULL);

        let product_id = first_defined([
            payload.get("catalog_product_id"),
            product.get("id"),
            product.get("product_id"),
            product.get("sync_product_id"),
            payload.get("product_id"),
            payload.get("sync_product_id"),
        ])
        .and_then(as_id)
        .ok_or_else(|| {
            ProviderError::DataShape(format!(
                "Variant {} response missing product identifier",
                variant_id
            ))
        })?;

        Ok(Variant {
            variant_id,
            product_id,
            name: first_text(payload, &["name", "title"]),
            color: first_text(payload, &["color", "color_name", "colorName"]),
            size: first_text(payload, &["size", "size_name", "sizeName", "size_label"]),
            source,
            raw_variant: payload.clone(),
            raw_product: product.clone(),
        })
    }

    /// Extract catalog hints from a legacy (v1) variant response
    pub fn map_legacy_variant(response: &Value) -> ProviderResult<LegacyHints> {
        let result = unwrap_envelope(response);
        let pick = |key: &str| {
            first_defined([result.get(key), response.get(key)])
                .filter(|v| v.is_object())
                .unwrap_or(&NULL)
        };

        let variant = pick("variant");
        let sync_variant = pick("sync_variant");
        let product = pick("product");
        let sync_product = pick("sync_product");

        if variant.is_null() && sync_variant.is_null() {
            return Err(ProviderError::DataShape(
                "Legacy variant response missing \"variant\" payload".to_string(),
            ));
        }

        let legacy_variant_id = first_defined([
            variant.get("id"),
            variant.get("variant_id"),
            variant.get("variantId"),
            sync_variant.get("id"),
            sync_variant.get("variant_id"),
        ])
        .and_then(as_id)
        .ok_or_else(|| ProviderError::DataShape("Legacy variant response missing identifier".to_string()))?;

        let catalog_variant_id = first_defined([
            variant.get("catalog_variant_id"),
            variant.get("catalogVariantId"),
            variant.get("catalog_variantId"),
            sync_variant.get("catalog_variant_id"),
            sync_variant.get("variant_id"),
        ])
        .and_then(as_id);

        let product_id = first_defined([
            variant.get("catalog_product_id"),
            variant.get("product_id"),
            product.get("catalog_product_id"),
            product.get("id"),
            product.get("product_id"),
            sync_product.get("catalog_product_id"),
            sync_product.get("product_id"),
        ])
        .and_then(as_id);

        let color_name = first_defined([
            variant.get("color"),
            variant.get("color_name"),
            variant.get("colorName"),
            sync_variant.get("color"),
        ])
        .and_then(as_text);

        let size = first_defined([
            variant.get("size"),
            variant.get("size_name"),
            variant.get("sizeName"),
            variant.get("size_label"),
            sync_variant.get("size"),
        ])
        .and_then(as_text);

        Ok(LegacyHints {
            legacy_variant_id,
            catalog_variant_id,
            product_id,
            color_name,
            size,
        })
    }

    // ------------------------------------------------------------------------
    // Catalog Variant Listing
    // ------------------------------------------------------------------------

    /// Records on one listing page, wherever the envelope put them
    pub fn extract_catalog_variants(response: &Value) -> &[Value] {
        let candidates = [
            response.get("data"),
            field(response, "result.data"),
            field(response, "result.variants"),
            field(response, "result.items"),
            response.get("result"),
            response.get("variants"),
            response.get("items"),
        ];

        for candidate in candidates.into_iter().flatten() {
            if let Some(items) = candidate.as_array() {
                return items;
            }
            if candidate.is_object() {
                if let Some(items) = first_array(candidate, &["items", "data"]) {
                    return items;
                }
            }
        }

        &[]
    }

    /// Normalized size of a listing record
    pub fn catalog_record_size(record: &Value) -> String {
        normalize_size(first_text(record, CATALOG_SIZE_FIELDS).as_deref().unwrap_or(""))
    }

    /// Every normalized color a listing record could be called
    pub fn catalog_record_colors(record: &Value) -> Vec<String> {
        CATALOG_COLOR_FIELDS
            .iter()
            .filter_map(|path| field(record, path).and_then(as_text))
            .map(|c| normalize_color(&c))
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Human-readable color of a listing record, for diagnostics
    pub fn catalog_record_display_color(record: &Value) -> Option<String> {
        first_text(record, &["color", "color_name", "colorName"])
    }

    /// Catalog variant ID of a listing record
    pub fn catalog_record_id(record: &Value) -> Option<String> {
        first_id(record, CATALOG_ID_FIELDS)
    }

    // ------------------------------------------------------------------------
    // Mockup Styles
    // ------------------------------------------------------------------------

    /// Build the placement lookup from a printfiles response
    pub fn build_placement_lookup(response: &Value) -> PlacementLookup {
        let payload = unwrap_envelope(response);
        let mut lookup = PlacementLookup::new();

        let printfiles = payload
            .as_array()
            .or_else(|| first_array(payload, &["printfiles", "placements"]))
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        for printfile in printfiles {
            let Some(key) = first_id(printfile, &["placement", "type", "id"]) else {
                continue;
            };
            let name = first_text(printfile, &["placement", "type"]).unwrap_or_else(|| key.clone());
            for alias in [first_id(printfile, &["printfile_id"]), first_id(printfile, &["id"])]
                .into_iter()
                .flatten()
            {
                lookup.insert(alias, name.clone());
            }
            lookup.insert(key, name);
        }

        // v1 shape: variant_printfiles[].placements = { "front": <printfile_id> }
        if let Some(variant_printfiles) = first_array(payload, &["variant_printfiles"]) {
            for entry in variant_printfiles {
                if let Some(placements) = entry.get("placements").and_then(Value::as_object) {
                    for (placement, printfile_id) in placements {
                        if let Some(id) = as_id(printfile_id) {
                            lookup.insert(id, placement.clone());
                        }
                    }
                }
            }
        }

        if let Some(available) = field(payload, "available_placements").and_then(Value::as_object) {
            for placement in available.keys() {
                lookup.insert(placement.clone(), placement.clone());
            }
        }

        debug!(placements = lookup.len(), "Built placement lookup");
        lookup
    }

    /// Normalize one raw template entry; `None` when it has no style ID
    pub fn normalize_template(template: &Value, lookup: &PlacementLookup) -> Option<Style> {
        let style_id = first_id(template, &["style_id", "template_id", "id"])?;
        let mut style = Style::new(style_id);

        if let Some(title) = first_text(template, &["title", "name", "template_name"]) {
            style.title = title;
        }
        if let Some(style_type) = first_text(template, &["type", "product_type", "template_type"]) {
            style.style_type = style_type;
        }
        style.color = first_text(template, &["color", "variant_color", "options.color"]);
        style.preview_url = first_text(template, PREVIEW_FIELDS);

        style.placements = match first_field(template, &["placements", "printfiles"]) {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| placement_name(entry, lookup))
                .collect(),
            Some(scalar) => placement_name(scalar, lookup).into_iter().collect(),
            None => first_field(template, &["placement", "printfile_id"])
                .and_then(|p| placement_name(p, lookup))
                .into_iter()
                .collect(),
        };

        if let Some(ids) = first_array(template, AVAILABLE_VARIANT_FIELDS) {
            style.available_variant_ids = ids
                .iter()
                .filter_map(|id| as_id(id).or_else(|| first_id(id, &["id", "variant_id"])))
                .collect();
        }

        Some(style)
    }

    /// Normalize a templates (or styles) response into deduplicated styles
    ///
    /// Gaps in placements or availability are backfilled from the response's
    /// `variant_mapping` side table. When the templates array is empty but the
    /// mapping is not, template entries are synthesized from the mapping.
    pub fn map_styles(response: &Value, lookup: &PlacementLookup) -> Vec<Style> {
        let payload = unwrap_envelope(response);
        let templates = payload
            .as_array()
            .or_else(|| first_array(payload, &["templates", "styles"]))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let mapping = VariantMapping::from_payload(payload, lookup);

        let synthesized;
        let entries = if templates.is_empty() && !mapping.is_empty() {
            debug!(templates = mapping.len(), "Synthesizing templates from variant mapping");
            synthesized = mapping.template_entries();
            synthesized.as_slice()
        } else {
            templates
        };

        let mut seen = HashSet::new();
        let mut styles = Vec::new();

        for entry in entries {
            let Some(mut style) = Self::normalize_template(entry, lookup) else {
                continue;
            };
            if !seen.insert(style.style_id.clone()) {
                continue;
            }
            mapping.backfill(&mut style);
            styles.push(style);
        }

        info!("Found {} mockup templates from Printful", styles.len());
        styles
    }

    // ------------------------------------------------------------------------
    // Mockup Tasks
    // ------------------------------------------------------------------------

    /// Task key from a create-task response
    pub fn map_task_key(response: &Value) -> ProviderResult<String> {
        first_id(unwrap_envelope(response), &["task_key", "task_id", "id"])
            .or_else(|| first_id(response, &["task_key", "task_id"]))
            .ok_or_else(|| {
                ProviderError::DataShape("Failed to start Printful mockup task: no task key".to_string())
            })
    }

    /// Task snapshot from a task-fetch response
    pub fn map_mockup_task(response: &Value, task_key: &str) -> MockupTask {
        let task = unwrap_envelope(response);
        let status = first_text(task, &["status"])
            .and_then(|s| s.parse().ok())
            .unwrap_or(TaskStatus::Pending);

        let mockups = first_array(task, &["mockups", "result.mockups"])
            .map(|entries| entries.iter().map(map_task_mockup).collect())
            .unwrap_or_default();

        MockupTask {
            task_key: task_key.to_string(),
            status,
            mockups,
        }
    }
}

/// Placement name for one raw placement entry
fn placement_name(entry: &Value, lookup: &PlacementLookup) -> Option<String> {
    match entry {
        Value::String(_) | Value::Number(_) => as_id(entry).map(|key| lookup.resolve(&key)),
        Value::Object(_) => first_id(entry, &["placement"])
            .map(|key| lookup.resolve(&key))
            .or_else(|| first_text(entry, &["name"])),
        _ => None,
    }
}

fn map_task_mockup(mockup: &Value) -> TaskMockup {
    let placements = match first_array(mockup, &["placements"]) {
        Some(entries) => entries
            .iter()
            .filter_map(|p| as_text(p).or_else(|| first_text(p, &["placement", "name"])))
            .collect(),
        None => first_text(mockup, &["placement"]).into_iter().collect(),
    };

    TaskMockup {
        style_id: first_id(mockup, &["style_id", "template_id", "id"]),
        image_url: first_text(mockup, &["mockup_url", "url", "file_url"]),
        placements,
    }
}

// ============================================================================
// Variant Mapping Side Table
// ============================================================================

#[derive(Debug, Default)]
struct MappedTemplate {
    placements: Vec<String>,
    variant_ids: BTreeSet<String>,
}

/// `variant_mapping` inverted to template -> (placements, variants)
#[derive(Debug, Default)]
struct VariantMapping {
    order: Vec<String>,
    templates: HashMap<String, MappedTemplate>,
}

impl VariantMapping {
    fn from_payload(payload: &Value, lookup: &PlacementLookup) -> Self {
        let mut mapping = VariantMapping::default();
        let Some(entries) = first_array(payload, &["variant_mapping"]) else {
            return mapping;
        };

        for entry in entries {
            let variant_id = first_id(entry, &["variant_id", "catalog_variant_id", "id"]);
            let Some(templates) = first_array(entry, &["templates"]) else {
                continue;
            };

            for template in templates {
                let Some(template_id) = as_id(template)
                    .or_else(|| first_id(template, &["template_id", "style_id", "id"]))
                else {
                    continue;
                };
                let placement = first_id(template, &["placement"]).map(|p| lookup.resolve(&p));

                if !mapping.templates.contains_key(&template_id) {
                    mapping.order.push(template_id.clone());
                }
                let mapped = mapping.templates.entry(template_id).or_default();
                if let Some(placement) = placement {
                    if !mapped.placements.contains(&placement) {
                        mapped.placements.push(placement);
                    }
                }
                if let Some(variant_id) = &variant_id {
                    mapped.variant_ids.insert(variant_id.clone());
                }
            }
        }

        mapping
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn template_entries(&self) -> Vec<Value> {
        self.order
            .iter()
            .map(|id| serde_json::json!({ "template_id": id }))
            .collect()
    }

    fn backfill(&self, style: &mut Style) {
        let Some(mapped) = self.templates.get(&style.style_id) else {
            return;
        };
        if style.placements.is_empty() {
            style.placements = mapped.placements.clone();
        }
        if style.available_variant_ids.is_empty() {
            style.available_variant_ids = mapped.variant_ids.clone();
        }
    }
}
