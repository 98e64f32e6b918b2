//! Printful Provider Module
//!
//! Client, response helpers and the mapper that normalizes Printful's
//! v1, catalog v2 and store v2 payloads into domain types.
//!
//! API Documentation: https://developers.printful.com/docs/

mod client;
mod mapper;
pub mod models;

pub use client::PrintfulClient;
pub use mapper::PrintfulMapper;
