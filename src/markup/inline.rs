//! Inline run tokenization
//!
//! Splits block text into formatted runs: `**bold**`, `*italic*`, and
//! `^superscript^` spans, non-greedy, preserving source order. Escaped
//! punctuation is shielded behind private-use placeholders before splitting
//! so a `\*` can never open or close an emphasis span, then restored as the
//! literal character afterwards.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::TextRun;

static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+?)\*").unwrap());
static SUPERSCRIPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^([^^]+?)\^").unwrap());
static ESCAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\\([~.*"'()\[\]{}|_-])"#).unwrap());

/// Escapable punctuation and the placeholder each maps to while spans are
/// being split. The placeholders sit in a private-use range that never occurs
/// in report text.
const ESCAPE_PLACEHOLDERS: [(char, char); 14] = [
    ('~', '\u{f500}'),
    ('.', '\u{f501}'),
    ('*', '\u{f502}'),
    ('"', '\u{f503}'),
    ('\'', '\u{f504}'),
    ('(', '\u{f505}'),
    (')', '\u{f506}'),
    ('[', '\u{f507}'),
    (']', '\u{f508}'),
    ('{', '\u{f509}'),
    ('}', '\u{f50a}'),
    ('|', '\u{f50b}'),
    ('_', '\u{f50c}'),
    ('-', '\u{f50d}'),
];

fn protect_escapes(text: &str) -> String {
    ESCAPE_RE
        .replace_all(text, |caps: &regex::Captures| {
            let ch = caps[1].chars().next().unwrap();
            ESCAPE_PLACEHOLDERS
                .iter()
                .find(|(literal, _)| *literal == ch)
                .map(|(_, placeholder)| placeholder.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn restore_escapes(text: &str) -> String {
    text.chars()
        .map(|ch| {
            ESCAPE_PLACEHOLDERS
                .iter()
                .find(|(_, placeholder)| *placeholder == ch)
                .map(|(literal, _)| *literal)
                .unwrap_or(ch)
        })
        .collect()
}

/// Remove backslash escapes from the fixed punctuation set.
pub fn unescape(text: &str) -> String {
    ESCAPE_RE.replace_all(text, "$1").into_owned()
}

/// Unescape and trim; used for heading and label text where runs are not kept.
pub fn cleanup_text(text: &str) -> String {
    unescape(text).trim().to_string()
}

/// Parse block text into formatted runs.
///
/// Bold spans are split off first, then italic, then superscript within the
/// remaining plain segments. Run texts concatenate back to the flag-stripped
/// source text.
pub fn parse_runs(text: &str) -> Vec<TextRun> {
    let protected = protect_escapes(text);
    let mut runs = Vec::new();

    for (segment, bold) in split_spans(&BOLD_RE, &protected) {
        if bold {
            push_run(&mut runs, segment, true, false, false);
            continue;
        }

        for (segment, italic) in split_spans(&ITALIC_RE, &segment) {
            if italic {
                push_run(&mut runs, segment, false, true, false);
                continue;
            }

            for (segment, superscript) in split_spans(&SUPERSCRIPT_RE, &segment) {
                push_run(&mut runs, segment, false, false, superscript);
            }
        }
    }

    runs
}

/// Split text on a span regex into (content, matched) pieces in source order.
/// Matched pieces carry the capture group, the rest is passed through.
fn split_spans(re: &Regex, text: &str) -> Vec<(String, bool)> {
    let mut pieces = Vec::new();
    let mut last_end = 0;

    for caps in re.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        if whole.start() > last_end {
            pieces.push((text[last_end..whole.start()].to_string(), false));
        }
        pieces.push((caps.get(1).unwrap().as_str().to_string(), true));
        last_end = whole.end();
    }

    if last_end < text.len() {
        pieces.push((text[last_end..].to_string(), false));
    }

    pieces
}

fn push_run(runs: &mut Vec<TextRun>, text: String, bold: bool, italic: bool, superscript: bool) {
    let text = restore_escapes(&text);
    if text.is_empty() {
        return;
    }
    runs.push(TextRun {
        text,
        bold,
        italic,
        superscript,
    });
}
