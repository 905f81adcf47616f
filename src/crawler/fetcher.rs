//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content, following redirects
//! - Error classification for the crawl's error stream

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::CrawlError;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value (empty when absent)
    pub content_type: String,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `crawler` - Timeouts and redirect limit
/// * `user_agent` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitemap_weaver::config::{CrawlerConfig, UserAgentConfig};
/// use sitemap_weaver::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default(), &UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::limited(crawler.max_redirects as usize))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page with a single GET request
///
/// # Error Classification
///
/// | Condition | Error |
/// |-----------|-------|
/// | Non-2xx status | `CrawlError::HttpStatus` |
/// | Timeout | `CrawlError::Timeout` |
/// | Connection refused / DNS failure | `CrawlError::Unreachable` |
/// | Anything else (redirect limit, body read) | `CrawlError::Transport` |
///
/// The response body is read to completion on success and dropped unread on
/// every error path, which returns the connection to the client's pool.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, CrawlError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = response.text().await.map_err(|e| classify_error(url, e))?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    })
}

/// Maps a reqwest error onto the crawl error taxonomy
fn classify_error(url: &Url, error: reqwest::Error) -> CrawlError {
    let url = url.to_string();
    if error.is_timeout() {
        CrawlError::Timeout { url }
    } else if error.is_connect() {
        CrawlError::Unreachable {
            url,
            message: error.to_string(),
        }
    } else {
        CrawlError::Transport {
            url,
            message: error.to_string(),
        }
    }
}
