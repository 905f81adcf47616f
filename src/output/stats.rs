//! Crawl statistics
//!
//! This module provides the summary numbers gathered by a crawl and a
//! printer for them.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Pages fetched and tokenised successfully
    pub pages_fetched: u64,

    /// Pages whose fetch failed
    pub pages_failed: u64,

    /// Hrefs that resolved to an in-scope URL (duplicates included)
    pub links_resolved: u64,

    /// Hrefs rejected as self-links or off-scope
    pub links_rejected: u64,

    /// Unique URLs in the sitemap
    pub urls_discovered: u64,

    /// URL events that repeated an already known URL
    pub duplicate_urls: u64,

    /// Error events reported during the crawl
    pub errors: u64,

    /// Wall-clock start of the crawl
    pub started_at: DateTime<Utc>,

    /// Wall-clock end of the crawl
    pub finished_at: DateTime<Utc>,
}

impl CrawlStatistics {
    /// Creates statistics for a crawl that did no work
    pub fn empty(at: DateTime<Utc>) -> Self {
        Self {
            pages_fetched: 0,
            pages_failed: 0,
            links_resolved: 0,
            links_rejected: 0,
            urls_discovered: 0,
            duplicate_urls: 0,
            errors: 0,
            started_at: at,
            finished_at: at,
        }
    }

    /// Elapsed wall-clock time
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Percentage of attempted pages that were fetched successfully
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_fetched + self.pages_failed;
        if attempted == 0 {
            0.0
        } else {
            (self.pages_fetched as f64 / attempted as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!("  Finished: {}", stats.finished_at.to_rfc3339());
    println!("  Duration: {:.2}s", stats.duration().as_secs_f64());
    println!();

    println!("Pages:");
    println!("  Fetched: {}", stats.pages_fetched);
    println!("  Failed: {}", stats.pages_failed);
    println!();

    println!("Links:");
    println!("  Resolved in scope: {}", stats.links_resolved);
    println!("  Rejected (self/off-scope): {}", stats.links_rejected);
    println!("  Unique URLs: {}", stats.urls_discovered);
    println!("  Duplicate sightings: {}", stats.duplicate_urls);
    println!();

    println!("Errors reported: {}", stats.errors);
    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        stats.success_rate(),
        stats.pages_fetched,
        stats.pages_fetched + stats.pages_failed
    );
}
