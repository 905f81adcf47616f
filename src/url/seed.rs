use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and validates a seed URL
///
/// A seed must be absolute, use the `http` or `https` scheme, and carry a
/// non-empty host.
///
/// # Examples
///
/// ```
/// use sitemap_weaver::url::parse_seed;
///
/// let seed = parse_seed("https://example.com/docs").unwrap();
/// assert_eq!(seed.host_str(), Some("example.com"));
/// assert!(parse_seed("mailto:someone@example.com").is_err());
/// ```
pub fn parse_seed(input: &str) -> UrlResult<Url> {
    let url = Url::parse(input.trim()).map_err(|source| UrlError::Parse {
        input: input.to_string(),
        source,
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost(input.to_string())),
    }
}

/// Returns the `scheme://host[:port]` prefix of a URL
///
/// The port is only present when it is not the scheme's default, so
/// `https://example.com:443/x` yields `https://example.com`.
pub fn base_scope(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}
