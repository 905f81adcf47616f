//! Output module for writing crawl results
//!
//! This module handles:
//! - Serialising the discovered URL set as a sitemaps.org document
//! - Reading sitemap documents back
//! - Recording and printing crawl statistics

mod sitemap;
pub mod stats;

pub use sitemap::{parse_sitemap, read_sitemap, write_sitemap, Sitemap, SITEMAP_NAMESPACE};
pub use stats::{print_statistics, CrawlStatistics};
