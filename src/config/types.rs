use serde::Deserialize;

/// Default sitemap output path
pub const DEFAULT_OUTPUT_FILE: &str = "sitemap.xml";

/// Main configuration structure for Sitemap-Weaver
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Seed URL the crawl starts from
    pub url: Option<String>,

    /// Maximum number of link hops followed from the seed
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages fetched and tokenised at once
    pub parallel: u32,

    /// Total per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// TCP/TLS connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed per request
    #[serde(rename = "max-redirects")]
    pub max_redirects: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_depth: 1,
            parallel: 1,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path the sitemap XML is written to
    #[serde(rename = "output-file")]
    pub output_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub max_depth: Option<u32>,
    pub parallel: Option<u32>,
    pub output_file: Option<String>,
}

impl Config {
    /// Applies command-line overrides on top of file or default values
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.url {
            self.crawler.url = Some(url);
        }
        if let Some(max_depth) = overrides.max_depth {
            self.crawler.max_depth = max_depth;
        }
        if let Some(parallel) = overrides.parallel {
            self.crawler.parallel = parallel;
        }
        if let Some(output_file) = overrides.output_file {
            self.output.output_file = output_file;
        }
    }
}
