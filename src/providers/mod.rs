//! Printful Provider Integration Module
//!
//! # Architecture
//!
//! ```text
//!   pipeline ──▶ PrintfulApi (trait)
//!                    │
//!             ┌──────┴───────┐
//!             │              │
//!      PrintfulClient    ScriptedApi (tests)
//!             │
//!     RequestDispatcher ── Pacer (serial FIFO, min interval)
//! ```

pub mod traits;
pub mod http_client;
pub mod printful;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types
pub use traits::{PrintfulApi, ProviderError, ProviderResult};
pub use http_client::{Pacer, RequestDispatcher, DEFAULT_MIN_INTERVAL};
