//! Placement lookup for mockup normalization
//!
//! Printful references print locations by a mix of names ("front") and numeric
//! printfile IDs. The printfiles endpoint tells us which key means which
//! placement; templates are then normalized through this table.

use std::collections::HashMap;

/// Raw placement key -> canonical placement name
#[derive(Debug, Clone, Default)]
pub struct PlacementLookup {
    names: HashMap<String, String>,
}

impl PlacementLookup {
    /// Create an empty lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key. The first registration of a key wins.
    pub fn insert(&mut self, key: impl Into<String>, name: impl Into<String>) {
        self.names.entry(key.into()).or_insert_with(|| name.into());
    }

    /// Canonical name for a raw key, if known
    pub fn get(&self, key: &str) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    /// Canonical name for a raw key, falling back to the key itself
    pub fn resolve(&self, key: &str) -> String {
        self.get(key).unwrap_or(key).to_string()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
