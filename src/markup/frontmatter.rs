//! Front-matter parsing and rendering
//!
//! A document may begin with a `---`-delimited block of `key: value` lines.
//! Known keys populate the named metadata fields; everything else lands in
//! `extra` in source order. A candidate block that looks like document
//! content (emphasis markers, heading markers, long prose) is left in the
//! body untouched so a report opening with a horizontal rule loses nothing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::Metadata;

static KEY_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+\s*:\s*.*$").unwrap());
static HEADING_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s+").unwrap());

/// Longest value/prose line still accepted inside a front-matter block.
const MAX_VALUE_LEN: usize = 120;

/// Parse a leading front-matter block.
///
/// Returns the metadata and the index of the first body line. When no valid
/// block is present the metadata is default and the body starts at line 0.
pub fn parse(lines: &[String]) -> (Metadata, usize) {
    let metadata = Metadata::default();

    if lines.first().map(|l| l.trim()) != Some("---") {
        return (metadata, 0);
    }

    let Some(close) = lines[1..].iter().position(|l| l.trim() == "---") else {
        return (metadata, 0);
    };
    let block = &lines[1..close + 1];
    let body_start = close + 2;

    if !is_valid_block(block) {
        log::debug!("front-matter markers found, but the block reads as document content");
        return (metadata, 0);
    }

    let mut metadata = Metadata::default();
    for line in block {
        let stripped = line.trim();
        if stripped.is_empty() || !KEY_VALUE_RE.is_match(stripped) {
            continue;
        }
        if let Some((key, value)) = stripped.split_once(':') {
            metadata.set_field(key.trim(), unquote(value.trim()).to_string());
        }
    }

    (metadata, body_start)
}

/// Validate that a candidate block is metadata, not body content wrapped by
/// horizontal rules.
fn is_valid_block(block: &[String]) -> bool {
    let mut key_value_count = 0;
    let mut non_empty_count = 0;
    let mut empty_streak = 0;

    for line in block {
        let stripped = line.trim();

        if stripped.is_empty() {
            empty_streak += 1;
            if empty_streak >= 2 {
                return false;
            }
            continue;
        }
        empty_streak = 0;
        non_empty_count += 1;

        if HEADING_MARKER_RE.is_match(stripped) || stripped.contains("**") {
            return false;
        }

        if KEY_VALUE_RE.is_match(stripped) {
            if let Some((_, value)) = stripped.split_once(':') {
                if value.trim().len() > MAX_VALUE_LEN {
                    return false;
                }
            }
            key_value_count += 1;
            continue;
        }

        if stripped.len() > MAX_VALUE_LEN && !stripped.contains(':') {
            return false;
        }
    }

    non_empty_count > 0 && key_value_count > 0
}

fn unquote(value: &str) -> &str {
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value)
}

/// Render metadata as a front-matter block, or `None` when every field is
/// still default so the block is omitted entirely.
pub fn render(metadata: &Metadata) -> Option<String> {
    if metadata.is_default() {
        return None;
    }

    let mut lines = vec!["---".to_string()];

    let named = [
        ("title", &metadata.title),
        ("subtitle", &metadata.subtitle),
        ("company", &metadata.company),
        ("ticker", &metadata.ticker),
        ("sector", &metadata.sector),
        ("analyst", &metadata.analyst),
    ];
    for (key, value) in named {
        if !value.is_empty() {
            lines.push(format!("{key}: \"{value}\""));
        }
    }
    for (key, value) in &metadata.extra {
        lines.push(format!("{key}: \"{value}\""));
    }

    lines.push("---".to_string());
    lines.push(String::new());
    Some(lines.join("\n"))
}
