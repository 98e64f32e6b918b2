//! Variant resolution cascade
//!
//! Turns a raw variant ID or a (product, color, size) tuple into a canonical
//! [`Variant`]. Lookups run as a small state machine:
//!
//! ```text
//! Catalog ──404──▶ Store ──404──▶ Legacy ──mapped id──▶ Catalog
//!    │               │              │
//!    ▼               ▼              └──404 / no mapping──▶ AttributeSearch ──▶ Derived
//!  found           found                                        │
//!                                                     no tuple  ▼
//!                                                            Exhausted
//! ```
//!
//! A 404 moves to the next identifier space; every other failure is fatal.

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{Variant, VariantSource};
use crate::providers::printful::models::LegacyHints;
use crate::providers::printful::PrintfulMapper;
use crate::providers::{PrintfulApi, ProviderResult};

use super::attribute_search::{find_catalog_variant, AttributeQuery};
use super::error::{PipelineError, PipelineResult};

/// What the caller knows about the variant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantQuery {
    pub variant_id: Option<String>,
    pub product_id: Option<String>,
    pub color_name: Option<String>,
    pub size: Option<String>,
}

impl VariantQuery {
    /// Either an ID or the full attribute tuple is present
    pub fn is_resolvable(&self) -> bool {
        self.variant_id.is_some()
            || (self.product_id.is_some() && self.color_name.is_some() && self.size.is_some())
    }
}

/// Identifier spaces a resolution can try
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierSpace {
    Catalog,
    Store,
    Legacy,
    AttributeSearch,
}

/// Bookkeeping for one resolution
///
/// Attribute hints start from the query; legacy lookups may fill gaps but
/// never replace values the caller supplied.
#[derive(Debug, Clone, Default)]
pub struct ResolutionAttempt {
    tried: Vec<IdentifierSpace>,
    product_id: Option<String>,
    color_name: Option<String>,
    size: Option<String>,
}

impl ResolutionAttempt {
    fn new(query: &VariantQuery) -> Self {
        ResolutionAttempt {
            tried: Vec::new(),
            product_id: query.product_id.clone(),
            color_name: query.color_name.clone(),
            size: query.size.clone(),
        }
    }

    fn record(&mut self, space: IdentifierSpace) {
        self.tried.push(space);
    }

    fn has_tried(&self, space: IdentifierSpace) -> bool {
        self.tried.contains(&space)
    }

    fn absorb(&mut self, hints: &LegacyHints) {
        if self.product_id.is_none() {
            self.product_id = hints.product_id.clone();
        }
        if self.color_name.is_none() {
            self.color_name = hints.color_name.clone();
        }
        if self.size.is_none() {
            self.size = hints.size.clone();
        }
    }

    fn attribute_query(&self) -> Option<AttributeQuery<'_>> {
        match (&self.product_id, &self.color_name, &self.size) {
            (Some(product_id), Some(color_name), Some(size)) => Some(AttributeQuery {
                product_id,
                color_name: Some(color_name),
                size: Some(size),
            }),
            _ => None,
        }
    }

    /// Identifier spaces tried, in order
    pub fn tried(&self) -> &[IdentifierSpace] {
        &self.tried
    }
}

#[derive(Debug)]
enum Step {
    Catalog(String),
    Store(String),
    Legacy(String),
    AttributeSearch,
    Derived(String),
    Exhausted,
}

/// Resolves variants against a [`PrintfulApi`]
pub struct VariantResolver<'a> {
    api: &'a dyn PrintfulApi,
}

impl<'a> VariantResolver<'a> {
    pub fn new(api: &'a dyn PrintfulApi) -> Self {
        VariantResolver { api }
    }

    /// Run the cascade
    pub async fn resolve(&self, query: &VariantQuery) -> PipelineResult<Variant> {
        let mut attempt = ResolutionAttempt::new(query);
        let mut step = match &query.variant_id {
            Some(id) => Step::Catalog(id.clone()),
            None => Step::AttributeSearch,
        };

        loop {
            debug!(step = ?step, "Resolution step");
            step = match step {
                Step::Catalog(id) => {
                    attempt.record(IdentifierSpace::Catalog);
                    match found(self.api.get_catalog_variant(&id).await)? {
                        Some(raw) => return Ok(PrintfulMapper::map_variant(&raw, VariantSource::Catalog)?),
                        None => {
                            info!(variant_id = %id, "Catalog variant not found, attempting store variant lookup");
                            Step::Store(id)
                        }
                    }
                }

                Step::Store(id) => {
                    attempt.record(IdentifierSpace::Store);
                    match found(self.api.get_store_variant(&id).await)? {
                        Some(raw) => return Ok(PrintfulMapper::map_variant(&raw, VariantSource::Store)?),
                        None => {
                            info!(variant_id = %id, "Store variant not found");
                            match &query.variant_id {
                                Some(requested) if !attempt.has_tried(IdentifierSpace::Legacy) => {
                                    Step::Legacy(requested.clone())
                                }
                                _ => Step::AttributeSearch,
                            }
                        }
                    }
                }

                Step::Legacy(id) => {
                    attempt.record(IdentifierSpace::Legacy);
                    info!(variant_id = %id, "Attempting legacy variant lookup");
                    match found(self.api.get_legacy_variant(&id).await)? {
                        Some(raw) => {
                            let hints = PrintfulMapper::map_legacy_variant(&raw)?;
                            attempt.absorb(&hints);
                            match hints.catalog_variant_id {
                                Some(mapped) if mapped != id => {
                                    info!(variant_id = %id, catalog_variant_id = %mapped, "Legacy variant maps to catalog variant");
                                    Step::Catalog(mapped)
                                }
                                _ => {
                                    info!(variant_id = %id, "Legacy lookup returned no usable catalog mapping");
                                    Step::AttributeSearch
                                }
                            }
                        }
                        None => {
                            info!(variant_id = %id, "Legacy variant not found");
                            Step::AttributeSearch
                        }
                    }
                }

                Step::AttributeSearch => match attempt.attribute_query() {
                    Some(attributes) => {
                        info!(
                            product_id = %attributes.product_id,
                            color = attributes.color_name.unwrap_or_default(),
                            size = attributes.size.unwrap_or_default(),
                            "Attempting catalog variant resolution by attributes"
                        );
                        let derived = find_catalog_variant(self.api, attributes).await?;
                        attempt.record(IdentifierSpace::AttributeSearch);
                        Step::Derived(derived)
                    }
                    None => Step::Exhausted,
                },

                Step::Derived(id) => {
                    return match found(self.api.get_catalog_variant(&id).await)? {
                        Some(raw) => Ok(PrintfulMapper::map_variant(&raw, VariantSource::Catalog)?),
                        None => Err(PipelineError::ResolutionExhausted {
                            detail: format!(
                                "variant {} derived from product {} could not be retrieved",
                                id,
                                attempt.product_id.as_deref().unwrap_or("unknown")
                            ),
                            attempted_id: query.variant_id.clone(),
                            available_colors: Vec::new(),
                        }),
                    };
                }

                Step::Exhausted => {
                    return Err(PipelineError::ResolutionExhausted {
                        detail: format!("no identifier space matched (tried {:?})", attempt.tried()),
                        attempted_id: query.variant_id.clone(),
                        available_colors: Vec::new(),
                    });
                }
            };
        }
    }
}

/// A 404 becomes `None`; everything else passes through
fn found(result: ProviderResult<Value>) -> ProviderResult<Option<Value>> {
    match result {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
