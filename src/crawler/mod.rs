//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - HTML parsing and link extraction
//! - Result aggregation
//! - Overall crawl coordination

mod aggregator;
mod coordinator;
mod fetcher;
mod parser;

pub use aggregator::{Aggregate, Aggregator, DiscoveredUrl};
pub use coordinator::{CrawlReport, Crawler, PageTask};
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use parser::{extract_links, scan_page, LinkEvent, ScanItem};

use crate::config::Config;
use crate::{ConfigError, CrawlError, SitemapError};
use tokio::sync::mpsc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the seed URL from the configuration
/// 2. Build the HTTP client
/// 3. Fetch pages and follow in-scope links up to the depth budget
/// 4. Return the deduplicated URL set and run statistics
///
/// # Arguments
///
/// * `config` - The crawler configuration; `crawler.url` must be set
/// * `error_sink` - Receives non-fatal crawl errors
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed (possibly with reported errors)
/// * `Err(SitemapError)` - Missing/invalid seed or HTTP client failure
pub async fn crawl(
    config: &Config,
    error_sink: Option<mpsc::UnboundedSender<CrawlError>>,
) -> Result<CrawlReport, SitemapError> {
    let seed = config
        .crawler
        .url
        .as_deref()
        .ok_or(ConfigError::MissingSeed)?;

    let crawler = Crawler::new(config)?;
    crawler.run(seed, error_sink).await
}
