//! HTML link extraction
//!
//! This module walks a page's start tags in document order and reports:
//! - Candidate hrefs from `<a>` elements
//! - `<base href>` elements, which change how later hrefs resolve
//!
//! Markup errors are recovered by html5ever (through `scraper`) the same way
//! a browser would, so extraction itself never fails.

use crate::url::{resolve_href, Resolution};
use crate::{CrawlError, UrlError};
use scraper::{Html, Selector};
use url::Url;

/// One event produced while walking a page, in document order
#[derive(Debug)]
pub enum LinkEvent {
    /// A raw anchor href that passed the pre-filter
    Href(String),
    /// A `<base href>` that parsed as an absolute URL, exactly as written
    Base(String),
    /// A `<base href>` that did not parse
    InvalidBase { href: String, error: UrlError },
}

/// Walks the document and emits link events in document order
///
/// # Extraction Rules
///
/// **`<a href="...">`** is emitted unless the value is:
/// - empty
/// - exactly `/`
/// - a fragment (starts with `#`)
///
/// **`<base href="...">`** is parsed as an absolute URL; every occurrence is
/// reported and the caller decides which one takes effect.
///
/// # Example
///
/// ```
/// use sitemap_weaver::crawler::{extract_links, LinkEvent};
///
/// let mut hrefs = Vec::new();
/// extract_links(r##"<a href="/a">A</a><a href="#top">Top</a>"##, |event| {
///     if let LinkEvent::Href(href) = event {
///         hrefs.push(href);
///     }
/// });
/// assert_eq!(hrefs, vec!["/a".to_string()]);
/// ```
pub fn extract_links<F>(html: &str, mut emit: F)
where
    F: FnMut(LinkEvent),
{
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href], base[href]") else {
        return;
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        match element.value().name() {
            "a" => {
                if is_followable(href) {
                    emit(LinkEvent::Href(href.to_string()));
                }
            }
            "base" => match Url::parse(href) {
                Ok(_) => emit(LinkEvent::Base(href.to_string())),
                Err(source) => emit(LinkEvent::InvalidBase {
                    href: href.to_string(),
                    error: UrlError::Parse {
                        input: href.to_string(),
                        source,
                    },
                }),
            },
            _ => {}
        }
    }
}

/// Anchor pre-filter: drops empty, root and fragment-only hrefs
fn is_followable(href: &str) -> bool {
    !href.is_empty() && href != "/" && !href.starts_with('#')
}

/// Result of processing one href or base element on a page
#[derive(Debug)]
pub enum ScanItem {
    /// An in-scope absolute URL
    Link(Url),
    /// The href pointed back at the page itself
    SelfLink(String),
    /// The href left the effective base
    OffScope(String),
    /// The href or base could not be turned into a URL
    Error(CrawlError),
}

/// Extracts and resolves every link on a page
///
/// The first `<base href>` that parses becomes the page's active base for
/// all anchors that follow it; later ones are ignored. The active base is
/// local to this call and never carried over to other pages.
///
/// This function is synchronous because the parsed document is not `Send`;
/// callers on a runtime should finish it before their next `.await`.
///
/// # Arguments
///
/// * `html` - The page body
/// * `page_url` - The URL the body was fetched from
///
/// # Returns
///
/// One item per emitted href or base event, in document order
pub fn scan_page(html: &str, page_url: &Url) -> Vec<ScanItem> {
    let mut items = Vec::new();
    let mut active_base: Option<String> = None;

    extract_links(html, |event| match event {
        LinkEvent::Href(href) => {
            let item = match resolve_href(&href, page_url, active_base.as_deref()) {
                Ok(Resolution::InScope(url)) => ScanItem::Link(url),
                Ok(Resolution::SelfLink) => ScanItem::SelfLink(href),
                Ok(Resolution::OffScope) => ScanItem::OffScope(href),
                Err(source) => ScanItem::Error(CrawlError::Link {
                    href,
                    page: page_url.to_string(),
                    source,
                }),
            };
            items.push(item);
        }
        LinkEvent::Base(href) => {
            if active_base.is_none() {
                tracing::debug!("Found base element on {}: {}", page_url, href);
                active_base = Some(href);
            } else {
                tracing::debug!("Ignoring extra base element on {}: {}", page_url, href);
            }
        }
        LinkEvent::InvalidBase { href, error } => {
            items.push(ScanItem::Error(CrawlError::Base {
                href,
                page: page_url.to_string(),
                source: error,
            }));
        }
    });

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_link_events(html: &str) -> Vec<LinkEvent> {
        let mut events = Vec::new();
        extract_links(html, |event| events.push(event));
        events
    }

    fn hrefs(html: &str) -> Vec<String> {
        collect_link_events(html)
            .into_iter()
            .filter_map(|event| match event {
                LinkEvent::Href(href) => Some(href),
                _ => None,
            })
            .collect()
    }

    fn links(html: &str, page: &str) -> Vec<String> {
        let page = Url::parse(page).unwrap();
        scan_page(html, &page)
            .into_iter()
            .filter_map(|item| match item {
                ScanItem::Link(url) => Some(url.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_extract_in_document_order() {
        let html = r#"
            <html><body>
                <a href="/c">C</a>
                <nav><a href="/a">A</a></nav>
                <footer><a href="/b">B</a></footer>
            </body></html>
        "#;
        assert_eq!(hrefs(html), vec!["/c", "/a", "/b"]);
    }

    #[test]
    fn test_skip_rejected_hrefs() {
        let html = r##"
            <a href="#top">Top</a>
            <a href="/">Home</a>
            <a href="">Empty</a>
            <a>No href</a>
            <a href="/kept">Kept</a>
        "##;
        assert_eq!(hrefs(html), vec!["/kept"]);
    }

    #[test]
    fn test_non_anchor_elements_ignored() {
        let html = r#"
            <link rel="stylesheet" href="/style.css">
            <script src="/app.js"></script>
            <img src="/logo.png">
            <area href="/map">
        "#;
        assert!(hrefs(html).is_empty());
    }

    #[test]
    fn test_uppercase_tags_and_attributes() {
        let html = r#"<A HREF="/upper">Upper</A>"#;
        assert_eq!(hrefs(html), vec!["/upper"]);
    }

    #[test]
    fn test_entities_decoded() {
        let html = r#"<a href="/search?a=1&amp;b=2">S</a>"#;
        assert_eq!(hrefs(html), vec!["/search?a=1&b=2"]);
    }

    #[test]
    fn test_malformed_html_tolerated() {
        let html = r#"<body><ul><li><a href="/one">one</a><li><a href="/two">two</a></ul></span><p"#;
        assert_eq!(hrefs(html), vec!["/one", "/two"]);
    }

    #[test]
    fn test_base_event_reported() {
        let events = collect_link_events(r#"<head><base href="https://cdn.example/"></head>"#);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], LinkEvent::Base(href) if href == "https://cdn.example/"));
    }

    #[test]
    fn test_base_event_keeps_written_form() {
        let events = collect_link_events(r#"<base href="https://cdn.example">"#);
        assert!(matches!(&events[0], LinkEvent::Base(href) if href == "https://cdn.example"));
    }

    #[test]
    fn test_relative_base_is_invalid() {
        let events = collect_link_events(r#"<base href="/relative/">"#);
        assert!(matches!(&events[0], LinkEvent::InvalidBase { href, .. } if href == "/relative/"));
    }

    #[test]
    fn test_scan_resolves_against_page_origin() {
        let html = r#"<a href="/a">A</a><a href="/b">B</a>"#;
        assert_eq!(
            links(html, "https://example.com/index.html"),
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn test_scan_base_applies_to_following_anchors_only() {
        let html = r#"
            <body>
                <a href="/before">Before</a>
                <base href="https://cdn.example/">
                <a href="/after">After</a>
            </body>
        "#;
        assert_eq!(
            links(html, "https://a.example/"),
            vec!["https://a.example/before", "https://cdn.example//after"]
        );
    }

    #[test]
    fn test_scan_base_without_trailing_slash() {
        let html = r#"
            <base href="https://cdn.example">
            <a href="/p">P</a>
            <a href="https://cdn.example">Root</a>
        "#;
        assert_eq!(
            links(html, "https://a.example/"),
            vec!["https://cdn.example/p", "https://cdn.example/"]
        );
    }

    #[test]
    fn test_scan_first_base_wins() {
        let html = r#"
            <head>
                <base href="https://first.example/">
                <base href="https://second.example/">
            </head>
            <body><a href="/p">P</a></body>
        "#;
        assert_eq!(
            links(html, "https://a.example/"),
            vec!["https://first.example//p"]
        );
    }

    #[test]
    fn test_scan_reports_rejections_and_errors() {
        let page = Url::parse("https://a.example/docs").unwrap();
        let html = r#"
            <base href="not absolute">
            <a href="/docs">Self</a>
            <a href="https://b.example/x">Off</a>
            <a href="https://a.example/y">On</a>
        "#;
        let items = scan_page(html, &page);

        assert_eq!(items.len(), 4);
        assert!(matches!(&items[0], ScanItem::Error(CrawlError::Base { .. })));
        assert!(matches!(&items[1], ScanItem::SelfLink(h) if h == "/docs"));
        assert!(matches!(&items[2], ScanItem::OffScope(h) if h == "https://b.example/x"));
        assert!(matches!(&items[3], ScanItem::Link(u) if u.as_str() == "https://a.example/y"));
    }

    #[test]
    fn test_scan_bad_join_is_error() {
        let page = Url::parse("http://127.0.0.1:4000/").unwrap();
        let items = scan_page(r#"<a href="page2">P</a>"#, &page);
        assert!(matches!(&items[0], ScanItem::Error(CrawlError::Link { href, .. }) if href == "page2"));
    }
}
