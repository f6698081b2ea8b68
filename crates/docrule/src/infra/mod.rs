//! Infrastructure adapters for config, caching, and pattern highlighting.

pub mod cache;
pub mod config;
pub mod highlight;
