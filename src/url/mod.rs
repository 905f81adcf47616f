//! URL handling module for Sitemap-Weaver
//!
//! This module provides seed validation, the base scope of a site, and the
//! resolver that turns raw hrefs into in-scope absolute URLs.

mod resolve;
mod seed;

// Re-export main functions
pub use resolve::{resolve_href, Resolution};
pub use seed::{base_scope, parse_seed};
