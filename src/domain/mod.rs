//! Domain types and models

mod placement;
pub mod catalog;

pub use placement::PlacementLookup;
pub use catalog::{
    VariantSource, Variant, Style, FilteredStyle,
    TaskStatus, TaskMockup, MockupTask,
    normalize_color, normalize_size,
};
