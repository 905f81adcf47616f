//! Sitemap-Weaver main entry point
//!
//! This is the command-line interface for the Sitemap-Weaver sitemap generator.

use anyhow::Context;
use clap::Parser;
use sitemap_weaver::config::{resolve_config, Config, Overrides};
use sitemap_weaver::crawler::crawl;
use sitemap_weaver::output::{print_statistics, write_sitemap};
use sitemap_weaver::CrawlError;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Sitemap-Weaver: a same-origin sitemap generator
///
/// Sitemap-Weaver crawls a website from a seed URL, following links that stay
/// on the same scheme and host, and writes what it finds as a sitemaps.org
/// XML document.
#[derive(Parser, Debug)]
#[command(name = "sitemap-weaver")]
#[command(version)]
#[command(about = "A same-origin sitemap generator", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Number of pages fetched in parallel (also sets runtime worker threads)
    #[arg(long, value_name = "N")]
    parallel: Option<u32>,

    /// Path the sitemap XML is written to [default: sitemap.xml]
    #[arg(long, value_name = "PATH")]
    output_file: Option<String>,

    /// Maximum number of link hops followed from the seed [default: 1]
    #[arg(long, value_name = "DEPTH")]
    max_depth: Option<u32>,

    /// Optional TOML configuration file; command-line flags take precedence
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate settings and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Print crawl statistics after the sitemap is written
    #[arg(long)]
    stats: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            max_depth: self.max_depth,
            parallel: self.parallel,
            output_file: self.output_file.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match resolve_config(cli.config.as_deref(), cli.overrides()) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(hash) = config_hash {
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.crawler.parallel as usize)
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(handle_crawl(config, cli.stats))
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_weaver=info,warn"),
            1 => EnvFilter::new("sitemap_weaver=debug,info"),
            2 => EnvFilter::new("sitemap_weaver=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config) {
    println!("=== Sitemap-Weaver Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Seed URL: {}",
        config.crawler.url.as_deref().unwrap_or("<none>")
    );
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Parallel: {}", config.crawler.parallel);
    println!(
        "  Request timeout: {}s (connect {}s)",
        config.crawler.request_timeout_secs, config.crawler.connect_timeout_secs
    );
    println!("  Max redirects: {}", config.crawler.max_redirects);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Sitemap: {}", config.output.output_file);

    println!("\n✓ Configuration is valid");
    if config.crawler.max_depth == 0 {
        println!("✓ Max depth is 0: an empty sitemap would be written");
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, show_stats: bool) -> anyhow::Result<()> {
    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<CrawlError>();
    let error_collector = tokio::spawn(async move {
        let mut errors = Vec::new();
        while let Some(error) = error_rx.recv().await {
            errors.push(error);
        }
        errors
    });

    let report = match crawl(&config, Some(error_tx)).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let errors = error_collector.await.unwrap_or_default();

    let output_path = Path::new(&config.output.output_file);
    let sitemap = report.sitemap();
    if let Err(e) = write_sitemap(output_path, &sitemap) {
        tracing::error!(
            "Failed to write sitemap to {}: {}",
            output_path.display(),
            e
        );
        return Err(e.into());
    }

    tracing::info!(
        "Wrote {} URLs to {}",
        sitemap.len(),
        output_path.display()
    );

    if show_stats {
        println!();
        print_statistics(&report.stats);

        if !errors.is_empty() {
            let fetch_errors = errors.iter().filter(|e| e.is_fetch_error()).count();
            println!(
                "\nErrors: {} fetch, {} link",
                fetch_errors,
                errors.len() - fetch_errors
            );
            for error in &errors {
                println!("  - {}", error);
            }
        }
    }

    Ok(())
}
