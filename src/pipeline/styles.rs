//! Mockup style catalog
//!
//! Builds the list of mockup styles for a product: templates merged with
//! printfile placements, then the styles endpoint if templates are empty,
//! then on-demand task rendering if nothing carries a preview image.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::domain::{Style, TaskMockup};
use crate::providers::printful::PrintfulMapper;
use crate::providers::PrintfulApi;

use super::error::PipelineResult;
use super::task::{generate_blank_mockups, TaskPolling};

/// Build the mockup styles for `product_id`
///
/// `variant_id` narrows the upstream queries and is the variant rendered if
/// a generation task is needed.
pub async fn build_style_catalog(
    api: &dyn PrintfulApi,
    product_id: &str,
    variant_id: &str,
    polling: TaskPolling,
) -> PipelineResult<Vec<Style>> {
    info!(product_id = %product_id, "Fetching mockup templates");
    let templates = api.get_mockup_templates(product_id, Some(variant_id)).await?;
    let printfiles = api.get_mockup_printfiles(product_id, Some(variant_id)).await?;

    let lookup = PrintfulMapper::build_placement_lookup(&printfiles);
    let mut styles = PrintfulMapper::map_styles(&templates, &lookup);

    if styles.is_empty() {
        info!(product_id = %product_id, "No mockup styles from template endpoint, attempting styles fallback");
        match api.get_mockup_styles(product_id).await {
            Ok(response) => styles = PrintfulMapper::map_styles(&response, &lookup),
            Err(e) if e.is_not_found() => debug!(product_id = %product_id, "Styles endpoint returned 404"),
            Err(e) => return Err(e.into()),
        }
    }

    if styles.iter().all(|s| s.preview_url.is_none()) {
        info!(product_id = %product_id, "No preview URLs returned from template endpoints, requesting blank mockup task");
        let mockups = generate_blank_mockups(api, product_id, variant_id, polling).await?;
        styles = apply_task_mockups(styles, mockups, variant_id);
    }

    Ok(styles)
}

/// Attach task-rendered images to styles
///
/// Mockups are matched by style ID. With no styles at all, every mockup that
/// has an image becomes a style of its own, available for `variant_id`.
pub fn apply_task_mockups(styles: Vec<Style>, mockups: Vec<TaskMockup>, variant_id: &str) -> Vec<Style> {
    if mockups.is_empty() {
        return styles;
    }

    if styles.is_empty() {
        let mut synthesized: Vec<Style> = Vec::new();
        for (index, mockup) in mockups.into_iter().enumerate() {
            let Some(image_url) = mockup.image_url else {
                continue;
            };
            let style_id = mockup.style_id.unwrap_or_else(|| format!("mockup-{}", index + 1));
            if synthesized.iter().any(|s| s.style_id == style_id) {
                continue;
            }

            let mut style = Style::new(style_id);
            style.placements = mockup.placements;
            style.preview_url = Some(image_url);
            style.available_variant_ids.insert(variant_id.to_string());
            synthesized.push(style);
        }
        return synthesized;
    }

    let mut by_style: HashMap<String, TaskMockup> = HashMap::new();
    for mockup in mockups {
        if let Some(style_id) = mockup.style_id.clone() {
            by_style.insert(style_id, mockup);
        }
    }

    styles
        .into_iter()
        .map(|mut style| {
            if let Some(mockup) = by_style.get(&style.style_id) {
                if let Some(url) = &mockup.image_url {
                    style.preview_url = Some(url.clone());
                }
                if style.placements.is_empty() {
                    style.placements = mockup.placements.clone();
                }
            }
            style
        })
        .collect()
}
