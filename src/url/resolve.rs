use crate::url::seed::base_scope;
use crate::{UrlError, UrlResult};
use url::Url;

/// Outcome of resolving a raw href found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The href resolved to an absolute, in-scope URL
    InScope(Url),
    /// The href equals the current page's path
    SelfLink,
    /// The href is absolute and points outside the effective base
    OffScope,
}

/// Resolves a raw href against the current page and active `<base>` element
///
/// # Resolution Steps
///
/// 1. The effective base is `active_base` when a `<base>` element was seen on
///    this page, otherwise the page's `scheme://host[:port]`
/// 2. An href equal to the page's own path is a self-link and is rejected
/// 3. Hrefs starting with `http` must start with the effective base, and are
///    then parsed as absolute URLs
/// 4. Any other href is appended to the effective base as a plain string
/// 5. The result must parse as an absolute URL with a host
///
/// Step 4 is string concatenation, not RFC 3986 reference resolution: a base
/// of `https://cdn.example/` and an href of `/p` yield `https://cdn.example//p`.
///
/// # Arguments
///
/// * `raw` - The href attribute value as written in the document
/// * `page` - The URL of the page the href was found on
/// * `active_base` - The first `<base href>` seen on the page, if any
///
/// # Returns
///
/// * `Ok(Resolution)` - Accepted URL or the reason the href was rejected
/// * `Err(UrlError)` - The joined URL could not be parsed
///
/// # Examples
///
/// ```
/// use sitemap_weaver::url::{resolve_href, Resolution};
/// use url::Url;
///
/// let page = Url::parse("https://example.com/docs").unwrap();
/// let resolved = resolve_href("/about", &page, None).unwrap();
/// assert_eq!(
///     resolved,
///     Resolution::InScope(Url::parse("https://example.com/about").unwrap())
/// );
///
/// let off = resolve_href("https://other.example/", &page, None).unwrap();
/// assert_eq!(off, Resolution::OffScope);
/// ```
pub fn resolve_href(raw: &str, page: &Url, active_base: Option<&str>) -> UrlResult<Resolution> {
    let page_scope;
    let effective_base = match active_base {
        Some(base) => base,
        None => {
            page_scope = base_scope(page);
            page_scope.as_str()
        }
    };

    if raw == page.path() {
        return Ok(Resolution::SelfLink);
    }

    let joined = if raw.starts_with("http") {
        if !raw.starts_with(effective_base) {
            return Ok(Resolution::OffScope);
        }
        raw.to_string()
    } else {
        format!("{}{}", effective_base, raw)
    };

    let url = Url::parse(&joined).map_err(|source| UrlError::Parse {
        input: joined.clone(),
        source,
    })?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(joined));
    }

    Ok(Resolution::InScope(url))
}
