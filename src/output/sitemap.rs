//! sitemaps.org 0.9 `urlset` documents
//!
//! The writer lays the document out the way the original tool did: every
//! element line carries a two-space prefix and each nesting level adds four
//! spaces. There is no trailing newline.
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//!   <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!       <url>
//!           <loc>https://example.com/a</loc>
//!       </url>
//!   </urlset>
//! ```

use crate::SitemapError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Namespace of the sitemap protocol
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const LINE_PREFIX: &str = "  ";
const INDENT: &str = "    ";

/// A set of page locations
///
/// Locations are kept sorted so the same crawl always produces the same file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sitemap {
    urls: BTreeSet<String>,
}

impl Sitemap {
    /// Creates an empty sitemap
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a location; returns false if it was already present
    pub fn insert(&mut self, loc: impl Into<String>) -> bool {
        self.urls.insert(loc.into())
    }

    /// Returns true if the location is present
    pub fn contains(&self, loc: &str) -> bool {
        self.urls.contains(loc)
    }

    /// Number of locations
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Checks if the sitemap has no locations
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Iterates over locations in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    /// Serialises the sitemap as an XML document
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The complete document including the XML declaration
    /// * `Err(SitemapError::Xml)` - The XML writer failed
    pub fn to_xml(&self) -> Result<String, SitemapError> {
        let mut writer = Writer::new(Vec::new());

        write(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        write_indent(&mut writer, 0)?;
        write(
            &mut writer,
            Event::Start(BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NAMESPACE)])),
        )?;

        for loc in &self.urls {
            write_indent(&mut writer, 1)?;
            write(&mut writer, Event::Start(BytesStart::new("url")))?;
            write_indent(&mut writer, 2)?;
            write(&mut writer, Event::Start(BytesStart::new("loc")))?;
            write(&mut writer, Event::Text(BytesText::new(loc)))?;
            write(&mut writer, Event::End(BytesEnd::new("loc")))?;
            write_indent(&mut writer, 1)?;
            write(&mut writer, Event::End(BytesEnd::new("url")))?;
        }

        if !self.urls.is_empty() {
            write_indent(&mut writer, 0)?;
        }
        write(&mut writer, Event::End(BytesEnd::new("urlset")))?;

        String::from_utf8(writer.into_inner()).map_err(xml_error)
    }
}

impl FromIterator<String> for Sitemap {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for Sitemap {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SitemapError> {
    writer.write_event(event).map_err(xml_error)
}

/// Starts a new line at the given nesting depth
fn write_indent(writer: &mut Writer<Vec<u8>>, depth: usize) -> Result<(), SitemapError> {
    let whitespace = format!("\n{}{}", LINE_PREFIX, INDENT.repeat(depth));
    write(writer, Event::Text(BytesText::from_escaped(whitespace)))
}

fn xml_error(error: impl std::fmt::Display) -> SitemapError {
    SitemapError::Xml(error.to_string())
}

/// Writes a sitemap to `path`, replacing any existing file
///
/// # Arguments
///
/// * `path` - Destination file
/// * `sitemap` - The locations to write
///
/// # Returns
///
/// * `Ok(())` - The document was written
/// * `Err(SitemapError)` - Removing, creating or writing the file failed
pub fn write_sitemap(path: &Path, sitemap: &Sitemap) -> Result<(), SitemapError> {
    let xml = sitemap.to_xml()?;

    if path.exists() {
        std::fs::remove_file(path)?;
    }

    let mut file = File::create(path)?;
    file.write_all(xml.as_bytes())?;
    file.flush()?;

    Ok(())
}

/// Extracts the `<loc>` values of a sitemap document
///
/// Surrounding whitespace inside `<loc>` is trimmed and empty values are
/// skipped. Element names are matched without their namespace prefix.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>, SitemapError> {
    let mut reader = Reader::from_str(xml);
    let mut locs = Vec::new();
    let mut current = String::new();
    let mut in_loc = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = true;
                current.clear();
            }
            Ok(Event::Text(t)) if in_loc => {
                current.push_str(&t.unescape().map_err(xml_error)?);
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let loc = current.trim();
                if !loc.is_empty() {
                    locs.push(loc.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }

    Ok(locs)
}

/// Reads a sitemap file back into a [`Sitemap`]
pub fn read_sitemap(path: &Path) -> Result<Sitemap, SitemapError> {
    let xml = std::fs::read_to_string(path)?;
    Ok(parse_sitemap(&xml)?.into_iter().collect())
}
