//! Configuration module for Sitemap-Weaver
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file and merging it with command-line overrides.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_weaver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitemap.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, Overrides, UserAgentConfig, DEFAULT_OUTPUT_FILE,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, parse_config, resolve_config};
pub use validation::validate;
