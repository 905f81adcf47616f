//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from seed to sitemap file.
//!
//! Relative hrefs are joined to the base by plain concatenation, so
//! `<base href="https://cdn.example/">` plus `/p` becomes `https://cdn.example//p`.

use sitemap_weaver::config::{Config, CrawlerConfig};
use sitemap_weaver::crawler::{crawl, CrawlReport, Crawler};
use sitemap_weaver::output::{parse_sitemap, read_sitemap, write_sitemap, Sitemap};
use sitemap_weaver::{CrawlError, SitemapError};
use std::collections::HashSet;
use tokio::sync::mpsc;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given seed
fn create_test_config(seed: &str, max_depth: u32, parallel: u32) -> Config {
    let mut config = Config::default();
    config.crawler = CrawlerConfig {
        url: Some(seed.to_string()),
        max_depth,
        parallel,
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
        ..CrawlerConfig::default()
    };
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

/// Mounts an HTML page on the mock server
async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.to_string(), "text/html"),
        )
        .mount(server)
        .await;
}

/// Runs a crawl and collects the error stream alongside the report
async fn run_crawl(config: &Config) -> (CrawlReport, Vec<CrawlError>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let report = crawl(config, Some(tx)).await.expect("Crawl failed");

    let mut errors = Vec::new();
    while let Some(error) = rx.recv().await {
        errors.push(error);
    }
    (report, errors)
}

fn url_set(report: &CrawlReport) -> HashSet<String> {
    report.discovered.keys().cloned().collect()
}

fn expected(urls: &[String]) -> HashSet<String> {
    urls.iter().cloned().collect()
}

#[tokio::test]
async fn test_single_page_three_anchors() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><body>
            <a href="/a">A</a>
            <a href="/b">B</a>
            <a href="/c">C</a>
        </body></html>"#,
    )
    .await;

    let config = create_test_config(&format!("{}/", base_url), 1, 2);
    let (report, errors) = run_crawl(&config).await;

    assert_eq!(
        url_set(&report),
        expected(&[
            format!("{}/a", base_url),
            format!("{}/b", base_url),
            format!("{}/c", base_url),
        ])
    );
    assert!(errors.is_empty());
}

#[tokio::test]
async fn test_rejected_hrefs_produce_empty_set() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/",
        r##"<html><body>
            <a href="#top">Top</a>
            <a href="/">Home</a>
            <a href="">Nothing</a>
        </body></html>"##,
    )
    .await;

    let config = create_test_config(&format!("{}/", mock_server.uri()), 1, 1);
    let (report, errors) = run_crawl(&config).await;

    assert!(report.discovered.is_empty());
    assert!(errors.is_empty());
}

#[tokio::test]
async fn test_off_scope_absolute_links_dropped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        &format!(
            r#"<html><body>
            <a href="https://b.example/x">Elsewhere</a>
            <a href="{}/y">Here</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;

    let config = create_test_config(&format!("{}/", base_url), 1, 1);
    let (report, _) = run_crawl(&config).await;

    assert_eq!(url_set(&report), expected(&[format!("{}/y", base_url)]));
    assert_eq!(report.stats.links_rejected, 1);
}

#[tokio::test]
async fn test_base_element_override() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/",
        r#"<html><head><base href="https://cdn.example/"></head>
        <body><a href="/p">P</a></body></html>"#,
    )
    .await;

    let config = create_test_config(&format!("{}/", mock_server.uri()), 1, 1);
    let (report, _) = run_crawl(&config).await;

    assert_eq!(
        url_set(&report),
        expected(&["https://cdn.example//p".to_string()])
    );
}

#[tokio::test]
async fn test_base_element_not_inherited_by_children() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        &format!(
            r#"<a href="/child">Child</a><base href="{}/docs/">"#,
            base_url
        ),
    )
    .await;
    mount_html(&mock_server, "/child", r#"<a href="/grandchild">G</a>"#).await;

    let config = create_test_config(&format!("{}/", base_url), 2, 1);
    let (report, _) = run_crawl(&config).await;

    assert_eq!(
        url_set(&report),
        expected(&[
            format!("{}/child", base_url),
            format!("{}/grandchild", base_url),
        ])
    );
}

#[tokio::test]
async fn test_depth_bound() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/", r#"<a href="/hop1">1</a>"#).await;
    mount_html(&mock_server, "/hop1", r#"<a href="/hop2">2</a>"#).await;
    mount_html(&mock_server, "/hop2", r#"<a href="/hop3">3</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/hop3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/", base_url), 2, 2);
    let (report, _) = run_crawl(&config).await;

    assert_eq!(
        url_set(&report),
        expected(&[format!("{}/hop1", base_url), format!("{}/hop2", base_url)])
    );
}

#[tokio::test]
async fn test_fetch_error_mid_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/good">Good</a><a href="/bad">Bad</a>"#,
    )
    .await;
    mount_html(&mock_server, "/good", r#"<a href="/good-child">C</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_raw(r#"<a href="/never-seen">N</a>"#, "text/html"),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/", base_url), 2, 2);
    let (report, errors) = run_crawl(&config).await;

    // The failing URL is recorded because its parent discovered it
    assert_eq!(
        url_set(&report),
        expected(&[
            format!("{}/good", base_url),
            format!("{}/bad", base_url),
            format!("{}/good-child", base_url),
        ])
    );

    assert_eq!(errors.len(), 1);
    match &errors[0] {
        CrawlError::HttpStatus { url, status } => {
            assert_eq!(*status, 500);
            assert_eq!(url, &format!("{}/bad", base_url));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_zero_depth_no_network() {
    let mock_server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/", mock_server.uri()), 0, 1);
    let (report, errors) = run_crawl(&config).await;

    assert!(report.discovered.is_empty());
    assert!(errors.is_empty());
    assert!(report.sitemap().is_empty());
}

#[tokio::test]
async fn test_unparseable_seed_is_configuration_error() {
    let config = create_test_config("http://", 3, 1);
    let result = crawl(&config, None).await;
    assert!(matches!(result, Err(SitemapError::InvalidSeed(_))));

    let mut config = create_test_config("https://example.com/", 1, 1);
    config.crawler.url = None;
    let result = crawl(&config, None).await;
    assert!(matches!(result, Err(SitemapError::Config(_))));
}

#[tokio::test]
async fn test_cyclic_site_terminates_without_duplicates() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        &format!(
            r#"<a href="/a">A</a><a href="/b">B</a><a href="{}/a">A abs</a>"#,
            base_url
        ),
    )
    .await;
    mount_html(&mock_server, "/a", r#"<a href="/b">B</a><a href="/a">self</a>"#).await;
    mount_html(&mock_server, "/b", r#"<a href="/a">A</a><a href="/c">C</a>"#).await;
    mount_html(&mock_server, "/c", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;

    let config = create_test_config(&format!("{}/", base_url), 6, 4);
    let report = tokio::time::timeout(std::time::Duration::from_secs(20), async {
        run_crawl(&config).await.0
    })
    .await
    .expect("crawl of a cyclic site should terminate");

    assert_eq!(
        url_set(&report),
        expected(&[
            format!("{}/a", base_url),
            format!("{}/b", base_url),
            format!("{}/c", base_url),
        ])
    );
    assert!(report.stats.duplicate_urls > 0);

    // Every URL carries the seed's origin as prefix
    for url in report.discovered.keys() {
        assert!(url.starts_with(&base_url), "{} escaped scope", url);
    }
}

#[tokio::test]
async fn test_parallelism_one_completes_wide_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let index: String = (0..25)
        .map(|i| format!(r#"<a href="/page{}">{}</a>"#, i, i))
        .collect();
    mount_html(&mock_server, "/", &index).await;
    for i in 0..25 {
        mount_html(
            &mock_server,
            &format!("/page{}", i),
            r#"<a href="/shared">Shared</a>"#,
        )
        .await;
    }

    let config = create_test_config(&format!("{}/", base_url), 2, 1);
    let (report, errors) = run_crawl(&config).await;

    assert_eq!(report.discovered.len(), 26);
    assert!(report.contains(&format!("{}/shared", base_url)));
    assert!(errors.is_empty());
    assert_eq!(report.stats.pages_fetched, 26);
}

#[tokio::test]
async fn test_crawler_reusable_across_runs() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_html(&mock_server, "/", r#"<a href="/x">X</a>"#).await;

    let config = create_test_config(&format!("{}/", base_url), 1, 1);
    let crawler = Crawler::new(&config).expect("Failed to build crawler");

    let first = crawler.run(&format!("{}/", base_url), None).await.unwrap();
    let second = crawler.run(&format!("{}/", base_url), None).await.unwrap();

    assert_eq!(url_set(&first), url_set(&second));
}

#[tokio::test]
async fn test_sitemap_file_round_trip() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/one">1</a><a href="/two?a=1&amp;b=2">2</a>"#,
    )
    .await;

    let config = create_test_config(&format!("{}/", base_url), 1, 1);
    let (report, _) = run_crawl(&config).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("sitemap.xml");
    std::fs::write(&output, "stale contents").unwrap();

    let sitemap = report.sitemap();
    write_sitemap(&output, &sitemap).expect("Failed to write sitemap");

    let xml = std::fs::read_to_string(&output).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
    assert!(xml.contains(&format!("<loc>{}/two?a=1&amp;b=2</loc>", base_url)));
    assert!(!xml.contains("stale contents"));

    let locs: HashSet<String> = parse_sitemap(&xml).unwrap().into_iter().collect();
    assert_eq!(locs, url_set(&report));

    let reread: Sitemap = read_sitemap(&output).unwrap();
    assert_eq!(reread, sitemap);
}
