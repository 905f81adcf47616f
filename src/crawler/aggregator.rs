//! Result aggregation for a running crawl
//!
//! The aggregator runs as its own task and is the only owner of the
//! discovered set while the crawl is in progress. Page tasks talk to it
//! through two channels, one for URLs and one for errors; it stops once both
//! channels are closed and hands back everything it collected.

use crate::CrawlError;
use std::collections::HashMap;
use tokio::sync::mpsc;
use url::Url;

/// A URL recorded in the sitemap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredUrl {
    /// The canonical absolute URL
    pub url: Url,
    /// The page the URL was first found on
    pub found_on: Url,
    /// Link hops from the seed to this URL
    pub hops: u32,
}

/// Everything the aggregator collected during a crawl
#[derive(Debug, Default)]
pub struct Aggregate {
    /// Unique URLs keyed by canonical string
    pub urls: HashMap<String, DiscoveredUrl>,
    /// Number of URL events that repeated an already known URL
    pub duplicates: u64,
    /// Number of error events received
    pub errors: u64,
}

/// Collects discovered URLs and forwards errors
pub struct Aggregator {
    aggregate: Aggregate,
    error_sink: Option<mpsc::UnboundedSender<CrawlError>>,
}

impl Aggregator {
    /// Creates a new aggregator
    ///
    /// # Arguments
    ///
    /// * `error_sink` - Where error events are forwarded; `None` only logs them
    pub fn new(error_sink: Option<mpsc::UnboundedSender<CrawlError>>) -> Self {
        Self {
            aggregate: Aggregate::default(),
            error_sink,
        }
    }

    /// Records a URL event
    ///
    /// Returns true if the URL was not seen before.
    pub fn record(&mut self, discovered: DiscoveredUrl) -> bool {
        let key = discovered.url.as_str();
        if self.aggregate.urls.contains_key(key) {
            self.aggregate.duplicates += 1;
            return false;
        }

        tracing::info!(
            "Found sitemap URL: {} (on {}, {} hops)",
            key,
            discovered.found_on,
            discovered.hops
        );
        self.aggregate.urls.insert(key.to_string(), discovered);
        true
    }

    /// Records an error event and forwards it to the caller's sink
    pub fn record_error(&mut self, error: CrawlError) {
        self.aggregate.errors += 1;
        tracing::warn!("Error creating sitemap: {}", error);

        if let Some(sink) = &self.error_sink {
            // A caller that dropped its receiver only loses the forwarded copy
            if sink.send(error).is_err() {
                tracing::debug!("Error sink closed; dropping forwarded error");
            }
        }
    }

    /// Number of unique URLs recorded so far
    pub fn len(&self) -> usize {
        self.aggregate.urls.len()
    }

    /// Drains both channels until every sender is gone
    ///
    /// The error sink is dropped when this returns, which closes the caller's
    /// error stream.
    pub async fn run(
        mut self,
        mut urls: mpsc::Receiver<DiscoveredUrl>,
        mut errors: mpsc::Receiver<CrawlError>,
    ) -> Aggregate {
        loop {
            tokio::select! {
                Some(discovered) = urls.recv() => {
                    self.record(discovered);
                }
                Some(error) = errors.recv() => {
                    self.record_error(error);
                }
                else => break,
            }
        }

        tracing::debug!(
            "Aggregator finished: {} unique URLs, {} duplicates, {} errors",
            self.len(),
            self.aggregate.duplicates,
            self.aggregate.errors
        );

        self.aggregate
    }
}
