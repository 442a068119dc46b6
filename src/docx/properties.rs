//! Document metadata from core properties
//!
//! Word keeps title/author/subject/category/created-date in
//! `docProps/core.xml` inside the container. The values needed here are flat
//! text elements, so they are pulled with targeted patterns instead of a
//! full XML stack.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::Metadata;
use crate::error::Result;
use crate::io::read_container_entry;

static TITLE_RE: Lazy<Regex> = Lazy::new(|| property_re("dc:title"));
static CREATOR_RE: Lazy<Regex> = Lazy::new(|| property_re("dc:creator"));
static SUBJECT_RE: Lazy<Regex> = Lazy::new(|| property_re("dc:subject"));
static CATEGORY_RE: Lazy<Regex> = Lazy::new(|| property_re("cp:category"));
static CREATED_RE: Lazy<Regex> = Lazy::new(|| property_re("dcterms:created"));

fn property_re(tag: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{tag}[^>]*>([^<]*)</{tag}>")).unwrap()
}

/// Extract metadata from the document's core properties.
///
/// Missing entries simply leave the metadata default; only container-level
/// failures are errors.
pub fn extract_metadata(path: &Path) -> Result<Metadata> {
    let mut metadata = Metadata::default();

    let Some(xml) = read_container_entry(path, "docProps/core.xml")? else {
        return Ok(metadata);
    };

    if let Some(title) = capture(&TITLE_RE, &xml) {
        metadata.title = title;
    }
    if let Some(creator) = capture(&CREATOR_RE, &xml) {
        metadata.analyst = creator;
    }
    if let Some(subject) = capture(&SUBJECT_RE, &xml) {
        metadata.subtitle = subject;
    }
    if let Some(category) = capture(&CATEGORY_RE, &xml) {
        metadata.sector = category;
    }
    if let Some(created) = capture(&CREATED_RE, &xml) {
        metadata
            .extra
            .push(("date".to_string(), normalize_date(&created)));
    }

    Ok(metadata)
}

fn capture(re: &Regex, xml: &str) -> Option<String> {
    let value = re.captures(xml)?.get(1)?.as_str().trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(unescape_xml(&value))
    }
}

/// Normalize an ISO-8601 creation timestamp to `YYYY-MM-DD`; unparseable
/// values pass through unchanged.
fn normalize_date(value: &str) -> String {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(value) {
        return parsed.format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return parsed.format("%Y-%m-%d").to_string();
    }
    value.to_string()
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
