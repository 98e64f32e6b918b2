//! Style filter for a resolved variant

use tracing::{debug, info};

use crate::domain::{normalize_color, FilteredStyle, Style};

use super::error::{PipelineError, PipelineResult};

/// Policy flags for the style filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterPolicy {
    /// Keep styles that do not list the variant as available
    pub include_product_wide_list: bool,

    /// Skip the color gate
    pub ignore_color: bool,
}

/// Annotate availability and drop styles that do not fit the variant
///
/// A style passes the color gate when color matching is off, the variant has
/// no color, the style has no color of its own, or the style color equals the
/// variant color after normalization. Passing styles are kept if available
/// for the variant or if product-wide styles are included.
///
/// Colorless styles pass: templates backfilled from `variant_mapping` carry
/// no color and still belong to the mapped variant.
pub fn filter_styles_for_variant(
    styles: Vec<Style>,
    variant_id: &str,
    variant_color: Option<&str>,
    policy: FilterPolicy,
) -> PipelineResult<Vec<FilteredStyle>> {
    let total_styles = styles.len();
    let wanted_color = variant_color.map(normalize_color).filter(|c| !c.is_empty());

    let kept: Vec<FilteredStyle> = styles
        .into_iter()
        .filter_map(|style| {
            let available_for_variant = style.is_available_for(variant_id);

            let color_ok = policy.ignore_color
                || match &wanted_color {
                    None => true,
                    Some(wanted) => match style.color.as_deref().map(normalize_color) {
                        Some(color) if !color.is_empty() => &color == wanted,
                        _ => true,
                    },
                };
            if !color_ok {
                debug!(style_id = %style.style_id, color = ?style.color, "Style dropped by color");
                return None;
            }
            if !available_for_variant && !policy.include_product_wide_list {
                debug!(style_id = %style.style_id, "Style not available for variant");
                return None;
            }

            Some(FilteredStyle { style, available_for_variant })
        })
        .collect();

    if kept.is_empty() {
        return Err(PipelineError::EmptyResultSet {
            variant_id: variant_id.to_string(),
            variant_color: variant_color.map(str::to_string),
            include_product_wide_list: policy.include_product_wide_list,
            ignore_color: policy.ignore_color,
            total_styles,
        });
    }

    info!(variant_id = %variant_id, kept = kept.len(), total = total_styles, "Filtered mockup styles");
    Ok(kept)
}
