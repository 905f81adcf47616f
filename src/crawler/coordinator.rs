//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl lifecycle:
//! - Validating the seed and spawning the first page task
//! - Running one tokio task per page, capped by a semaphore
//! - Feeding resolved links to the aggregator and scheduling child pages
//! - Detecting termination when the outstanding-task count reaches zero

use crate::config::{Config, CrawlerConfig};
use crate::crawler::aggregator::{Aggregate, Aggregator, DiscoveredUrl};
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::parser::{scan_page, ScanItem};
use crate::output::{CrawlStatistics, Sitemap};
use crate::state::{Outstanding, TaskState};
use crate::url::parse_seed;
use crate::{CrawlError, SitemapError};
use chrono::Utc;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use url::Url;

/// One unit of crawl work: fetch `url` and follow its links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTask {
    /// The page to fetch
    pub url: Url,
    /// Remaining link hops; a task with depth 0 is never fetched
    pub depth: u32,
}

/// Result of a finished crawl
#[derive(Debug)]
pub struct CrawlReport {
    /// The validated seed URL
    pub seed: Url,
    /// Unique URLs keyed by canonical string
    pub discovered: HashMap<String, DiscoveredUrl>,
    /// Summary numbers for the run
    pub stats: CrawlStatistics,
}

impl CrawlReport {
    /// Builds the sitemap document for the discovered URLs
    pub fn sitemap(&self) -> Sitemap {
        self.discovered.keys().map(String::as_str).collect()
    }

    /// Returns true if the URL was discovered
    pub fn contains(&self, url: &str) -> bool {
        self.discovered.contains_key(url)
    }
}

/// Main crawler structure
///
/// A `Crawler` holds the HTTP client and crawl limits and can run any number
/// of crawls; each call to [`Crawler::run`] has its own state.
pub struct Crawler {
    client: Client,
    config: CrawlerConfig,
}

impl Crawler {
    /// Creates a new crawler from the full configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - HTTP client built successfully
    /// * `Err(SitemapError)` - The HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, SitemapError> {
        let client = build_http_client(&config.crawler, &config.user_agent)?;
        Ok(Self::with_client(client, config.crawler.clone()))
    }

    /// Creates a crawler around an existing HTTP client
    pub fn with_client(client: Client, config: CrawlerConfig) -> Self {
        Self { client, config }
    }

    /// Runs a crawl from a seed given as a string
    ///
    /// The seed is validated before anything touches the network. A seed
    /// that fails validation is a configuration error; every other problem
    /// met during the crawl is sent to `error_sink` (and logged) instead.
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute http(s) URL to start from
    /// * `error_sink` - Receives non-fatal errors; closed when the crawl ends
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Everything discovered, possibly partial
    /// * `Err(SitemapError::InvalidSeed)` - The seed was not a usable URL
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sitemap_weaver::config::Config;
    /// use sitemap_weaver::crawler::Crawler;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let crawler = Crawler::new(&Config::default())?;
    /// let report = crawler.run("https://example.com/", None).await?;
    /// println!("{} URLs", report.discovered.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(
        &self,
        seed: &str,
        error_sink: Option<mpsc::UnboundedSender<CrawlError>>,
    ) -> Result<CrawlReport, SitemapError> {
        let seed = parse_seed(seed).map_err(SitemapError::InvalidSeed)?;
        self.crawl(seed, error_sink).await
    }

    /// Runs a crawl from an already validated seed
    ///
    /// Returns once every page task has completed and the aggregator has
    /// drained both of its channels. Fails only if the aggregator task died.
    pub async fn crawl(
        &self,
        seed: Url,
        error_sink: Option<mpsc::UnboundedSender<CrawlError>>,
    ) -> Result<CrawlReport, SitemapError> {
        let started_at = Utc::now();
        let max_depth = self.config.max_depth;

        if max_depth == 0 {
            tracing::info!("Max depth is 0, nothing to crawl");
            return Ok(CrawlReport {
                seed,
                discovered: HashMap::new(),
                stats: CrawlStatistics::empty(started_at),
            });
        }

        tracing::info!(
            "Starting crawl of {} (max depth {}, parallel {})",
            seed,
            max_depth,
            self.config.parallel
        );

        // Capacity 1 keeps page tasks in lockstep with the aggregator
        let (url_tx, url_rx) = mpsc::channel(1);
        let (err_tx, err_rx) = mpsc::channel(1);
        let aggregator = tokio::spawn(Aggregator::new(error_sink).run(url_rx, err_rx));

        let context = Arc::new(CrawlContext {
            client: self.client.clone(),
            permits: Semaphore::new(self.config.parallel.max(1) as usize),
            outstanding: Outstanding::new(),
            scheduled: Mutex::new(HashMap::new()),
            max_depth,
            urls: url_tx,
            errors: err_tx,
            counters: Counters::default(),
        });

        context.claim(&seed, max_depth);
        spawn_task(
            &context,
            PageTask {
                url: seed.clone(),
                depth: max_depth,
            },
        );

        context.outstanding.wait_idle().await;

        let pages_fetched = context.counters.pages_fetched.load(Ordering::SeqCst);
        let pages_failed = context.counters.pages_failed.load(Ordering::SeqCst);
        let links_resolved = context.counters.links_resolved.load(Ordering::SeqCst);
        let links_rejected = context.counters.links_rejected.load(Ordering::SeqCst);

        // Dropping the last context closes both aggregator channels
        drop(context);

        let aggregate = join_aggregator(aggregator).await?;

        let finished_at = Utc::now();
        let stats = CrawlStatistics {
            pages_fetched,
            pages_failed,
            links_resolved,
            links_rejected,
            urls_discovered: aggregate.urls.len() as u64,
            duplicate_urls: aggregate.duplicates,
            errors: aggregate.errors,
            started_at,
            finished_at,
        };

        tracing::info!(
            "Crawl completed: {} URLs from {} pages ({} failed) in {:?}",
            stats.urls_discovered,
            pages_fetched,
            pages_failed,
            stats.duration()
        );

        Ok(CrawlReport {
            seed,
            discovered: aggregate.urls,
            stats,
        })
    }
}

/// Waits for the aggregator; a panicked aggregator fails the whole crawl
async fn join_aggregator(handle: JoinHandle<Aggregate>) -> Result<Aggregate, SitemapError> {
    handle.await.map_err(|e| {
        tracing::error!("Aggregator task failed: {}", e);
        SitemapError::Aggregator(e)
    })
}

/// Per-crawl counters updated by page tasks
#[derive(Debug, Default)]
struct Counters {
    pages_fetched: AtomicU64,
    pages_failed: AtomicU64,
    links_resolved: AtomicU64,
    links_rejected: AtomicU64,
}

/// State shared by every page task of one crawl
struct CrawlContext {
    client: Client,
    permits: Semaphore,
    outstanding: Arc<Outstanding>,
    /// Highest remaining depth each URL has been scheduled with
    scheduled: Mutex<HashMap<String, u32>>,
    max_depth: u32,
    urls: mpsc::Sender<DiscoveredUrl>,
    errors: mpsc::Sender<CrawlError>,
    counters: Counters,
}

/// Spawns a page task, registering it as outstanding first
///
/// Not `async`: page tasks call this to spawn their own children.
fn spawn_task(context: &Arc<CrawlContext>, task: PageTask) {
    let guard = context.outstanding.begin();
    let context = Arc::clone(context);

    tokio::spawn(async move {
        let _guard = guard;
        context.process(task).await;
    });
}

impl CrawlContext {
    /// Marks `url` as scheduled with `depth` remaining
    ///
    /// Returns false if it is already scheduled with at least that depth.
    fn claim(&self, url: &Url, depth: u32) -> bool {
        let mut scheduled = self.scheduled.lock().unwrap_or_else(PoisonError::into_inner);
        match scheduled.get(url.as_str()) {
            Some(&existing) if existing >= depth => false,
            _ => {
                scheduled.insert(url.to_string(), depth);
                true
            }
        }
    }

    /// Fetches one page, reports its links and schedules children
    async fn process(self: Arc<Self>, task: PageTask) {
        let mut state = TaskState::Pending;

        if task.depth == 0 || task.depth > self.max_depth {
            tracing::debug!("Skipping {} with depth {}", task.url, task.depth);
            return;
        }

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => return,
        };

        advance(&task.url, &mut state, TaskState::Fetching);
        tracing::debug!("Fetching {} (depth {})", task.url, task.depth);

        let page = match fetch_page(&self.client, &task.url).await {
            Ok(page) => page,
            Err(error) => {
                advance(&task.url, &mut state, TaskState::Failed);
                self.counters.pages_failed.fetch_add(1, Ordering::SeqCst);
                self.report(error).await;
                return;
            }
        };

        advance(&task.url, &mut state, TaskState::Tokenising);
        self.counters.pages_fetched.fetch_add(1, Ordering::SeqCst);

        // Links resolve against the requested URL, not the post-redirect one
        let items = scan_page(&page.body, &task.url);
        drop(page);

        let child_depth = task.depth - 1;
        let hops = self.max_depth - child_depth;

        for item in items {
            match item {
                ScanItem::Link(url) => {
                    self.counters.links_resolved.fetch_add(1, Ordering::SeqCst);

                    let discovered = DiscoveredUrl {
                        url: url.clone(),
                        found_on: task.url.clone(),
                        hops,
                    };
                    if self.urls.send(discovered).await.is_err() {
                        tracing::error!("Aggregator closed early; abandoning {}", task.url);
                        break;
                    }

                    if child_depth > 0 && self.claim(&url, child_depth) {
                        spawn_task(
                            &self,
                            PageTask {
                                url,
                                depth: child_depth,
                            },
                        );
                    }
                }
                ScanItem::SelfLink(href) => {
                    self.counters.links_rejected.fetch_add(1, Ordering::SeqCst);
                    tracing::trace!("Self link {} on {}", href, task.url);
                }
                ScanItem::OffScope(href) => {
                    self.counters.links_rejected.fetch_add(1, Ordering::SeqCst);
                    tracing::debug!("Off-scope link {} on {}", href, task.url);
                }
                ScanItem::Error(error) => self.report(error).await,
            }
        }

        advance(&task.url, &mut state, TaskState::Done);
    }

    async fn report(&self, error: CrawlError) {
        if self.errors.send(error).await.is_err() {
            tracing::error!("Aggregator closed early; error dropped");
        }
    }
}

/// Moves a task to its next state, logging illegal transitions
fn advance(url: &Url, state: &mut TaskState, next: TaskState) {
    match state.transition(next) {
        Ok(new_state) => {
            if new_state.is_terminal() {
                tracing::debug!("{}: {}", url, new_state);
            } else {
                tracing::trace!("{}: {} -> {}", url, state, new_state);
            }
            *state = new_state;
        }
        Err(e) => tracing::warn!("{}: {}", url, e),
    }
}
