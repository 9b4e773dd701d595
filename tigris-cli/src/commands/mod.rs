//! CLI command implementations.

pub mod cache;
pub mod fetch;
pub mod geocode;
