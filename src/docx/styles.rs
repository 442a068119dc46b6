//! Style-name dispatch tables and heading heuristics
//!
//! Heading and list detection is driven by ordered rule tables evaluated
//! top-to-bottom with first-match-wins semantics. The tables are data, not
//! branching code, so new locales or style conventions are additive.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::TextRun;

/// Style-name patterns mapping onto heading levels 1..=4. Covers the
/// language-agnostic "Heading N" convention and the localized "제목 N" one.
static HEADING_STYLE_RULES: Lazy<Vec<(Regex, u8)>> = Lazy::new(|| {
    [
        (r"(?i)^Heading\s*1$", 1),
        (r"(?i)^Heading\s*2$", 2),
        (r"(?i)^Heading\s*3$", 3),
        (r"(?i)^Heading\s*4$", 4),
        (r"(?i)^제목\s*1$", 1),
        (r"(?i)^제목\s*2$", 2),
        (r"(?i)^제목\s*3$", 3),
        (r"(?i)^제목\s*4$", 4),
    ]
    .into_iter()
    .map(|(pattern, level)| (Regex::new(pattern).unwrap(), level))
    .collect()
});

static BULLET_STYLE_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?i)^List\s*Bullet", r"(?i)^IB\s*Bullet"]
        .into_iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
});

static NUMBER_STYLE_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?i)^List\s*Number", r"(?i)^List\s*Paragraph"]
        .into_iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Number,
}

/// Match a named paragraph style against the heading rule table.
pub fn heading_level_from_style(style_name: &str) -> Option<u8> {
    HEADING_STYLE_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(style_name))
        .map(|(_, level)| *level)
}

/// Match a named paragraph style against the list rule tables.
pub fn list_kind_from_style(style_name: &str) -> Option<ListKind> {
    if BULLET_STYLE_RULES.iter().any(|p| p.is_match(style_name)) {
        return Some(ListKind::Bullet);
    }
    if NUMBER_STYLE_RULES.iter().any(|p| p.is_match(style_name)) {
        return Some(ListKind::Number);
    }
    None
}

/// Fallback heading heuristic for paragraphs without a named heading style:
/// every non-empty run bold and the plain text short. Deliberately
/// conservative, trading recall for precision, since a short bolded emphasis
/// sentence is the main false-positive risk. `max_len` is a tunable, not a
/// constant.
pub fn is_heading_by_formatting(runs: &[TextRun], max_len: usize) -> bool {
    let text = TextRun::plain_text(runs);
    let text = text.trim();
    let char_count = text.chars().count();
    if char_count == 0 || char_count > max_len {
        return false;
    }
    if text.ends_with('.') {
        return false;
    }

    let mut saw_text = false;
    for run in runs {
        if run.text.trim().is_empty() {
            continue;
        }
        saw_text = true;
        if !run.bold {
            return false;
        }
    }
    saw_text
}
