//! Sitemap-Weaver: a same-origin sitemap generator
//!
//! This crate crawls a website from a seed URL, following in-scope anchor
//! links up to a depth budget, and writes the discovered URLs as a
//! sitemaps.org 0.9 `urlset` document.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemap-Weaver operations
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(#[source] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::TaskState,
        to: state::TaskState,
    },

    #[error("Sitemap XML error: {0}")]
    Xml(String),

    #[error("Aggregator task failed: {0}")]
    Aggregator(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("No seed URL given (use --url or [crawler] url)")]
    MissingSeed,
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{input}': {source}")]
    Parse {
        input: String,
        source: ::url::ParseError,
    },

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Non-fatal errors reported on the crawl's error stream
///
/// None of these abort a crawl; the task that hit one either skips a single
/// link or stops processing its own page.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Host unreachable for {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Bad link '{href}' on {page}: {source}")]
    Link {
        href: String,
        page: String,
        source: UrlError,
    },

    #[error("Bad <base> href '{href}' on {page}: {source}")]
    Base {
        href: String,
        page: String,
        source: UrlError,
    },
}

impl CrawlError {
    /// Returns true if the error stopped a page from being fetched
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus { .. }
                | Self::Timeout { .. }
                | Self::Unreachable { .. }
                | Self::Transport { .. }
        )
    }
}

/// Result type alias for Sitemap-Weaver operations
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, Crawler};
pub use output::{parse_sitemap, write_sitemap, Sitemap};
pub use state::TaskState;
pub use crate::url::{parse_seed, resolve_href, Resolution};
