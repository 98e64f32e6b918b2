//! Catalog attribute search
//!
//! Finds a catalog variant ID from a (product, color, size) tuple by paging
//! through the product's variant listing.

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{normalize_color, normalize_size};
use crate::providers::printful::PrintfulMapper;
use crate::providers::{PrintfulApi, ProviderError};

use super::error::{PipelineError, PipelineResult};

/// Records requested per listing page
pub const CATALOG_PAGE_SIZE: u32 = 100;

/// Attributes to match against the listing
#[derive(Debug, Clone, Copy)]
pub struct AttributeQuery<'a> {
    pub product_id: &'a str,
    pub color_name: Option<&'a str>,
    pub size: Option<&'a str>,
}

/// Page through the listing and return the first matching catalog variant ID
pub async fn find_catalog_variant(api: &dyn PrintfulApi, query: AttributeQuery<'_>) -> PipelineResult<String> {
    let records = fetch_catalog_variants(api, query.product_id).await?;

    if records.is_empty() {
        return Err(PipelineError::ResolutionExhausted {
            detail: format!("No catalog variants returned for product {}", query.product_id),
            attempted_id: None,
            available_colors: Vec::new(),
        });
    }

    let target_size = query.size.map(normalize_size).filter(|s| !s.is_empty());
    let target_color = query.color_name.map(normalize_color).filter(|c| !c.is_empty());

    let size_matches =
        |record: &Value| target_size.as_ref().map_or(true, |size| &PrintfulMapper::catalog_record_size(record) == size);
    let color_matches = |record: &Value| {
        target_color.as_ref().map_or(true, |color| {
            PrintfulMapper::catalog_record_colors(record)
                .iter()
                .any(|candidate| candidate.contains(color.as_str()))
        })
    };

    let Some(record) = records.iter().find(|r| size_matches(*r) && color_matches(*r)) else {
        let available_colors = distinct_colors(records.iter().filter(|r| size_matches(*r)));
        return Err(PipelineError::ResolutionExhausted {
            detail: format!(
                "No catalog variant of product {} matches color \"{}\" and size \"{}\" (available colors: {})",
                query.product_id,
                query.color_name.unwrap_or(""),
                query.size.unwrap_or(""),
                if available_colors.is_empty() { "none".to_string() } else { available_colors.join(", ") }
            ),
            attempted_id: None,
            available_colors,
        });
    };

    let variant_id = PrintfulMapper::catalog_record_id(record).ok_or_else(|| {
        ProviderError::DataShape(format!(
            "Matched catalog variant of product {} has no identifier",
            query.product_id
        ))
    })?;

    info!(
        product_id = %query.product_id,
        variant_id = %variant_id,
        "Matched catalog variant by attributes"
    );
    Ok(variant_id)
}

/// Fetch every listing page; stops on an empty or short page
async fn fetch_catalog_variants(api: &dyn PrintfulApi, product_id: &str) -> PipelineResult<Vec<Value>> {
    let mut records = Vec::new();
    let mut offset = 0;

    loop {
        let page = api.list_catalog_variants(product_id, CATALOG_PAGE_SIZE, offset).await?;
        let items = PrintfulMapper::extract_catalog_variants(&page);
        debug!(product_id = %product_id, offset, count = items.len(), "Catalog variant page");

        records.extend(items.iter().cloned());
        if items.len() < CATALOG_PAGE_SIZE as usize {
            break;
        }
        offset += CATALOG_PAGE_SIZE;
    }

    info!(product_id = %product_id, total = records.len(), "Fetched catalog variants");
    Ok(records)
}

fn distinct_colors<'a>(records: impl Iterator<Item = &'a Value>) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    for color in records.filter_map(PrintfulMapper::catalog_record_display_color) {
        if !colors.contains(&color) {
            colors.push(color);
        }
    }
    colors
}
