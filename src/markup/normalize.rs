//! Paragraph normalization pre-pass
//!
//! Report text arrives soft-wrapped by editors and clipboard exports. This
//! pass merges wrapped lines back into single logical lines before block
//! segmentation: a line continues the previous paragraph (or list item)
//! unless it matches a block-start pattern. Hard breaks are honored: an
//! inline `<br>` tag and a trailing backslash always end the line, and two
//! trailing spaces end it only when opted in, since accidental trailing
//! whitespace is endemic in pasted text.
//!
//! Within merged paragraph text, whitespace runs collapse to one space and
//! whitespace just inside parentheses is trimmed, e.g. `(  PFV  )` → `(PFV)`.
//! Equation block interiors and wrapped base64 image payloads pass through
//! untouched.

use once_cell::sync::Lazy;
use regex::Regex;

static BULLET_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*[-*]\s+)(.*)$").unwrap());
static NUMBERED_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*\d+\.\s+)(.*)$").unwrap());
static BREAK_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static OPEN_PAREN_WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s+").unwrap());
static CLOSE_PAREN_WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\)").unwrap());
static BASE64_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\(data:image/[a-zA-Z0-9+.\-]+;base64,").unwrap());

/// Longest run of lines a wrapped base64 payload may span.
const MAX_IMAGE_LOOKAHEAD: usize = 50;

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Recognize the legacy two-trailing-spaces hard break. Off by default to
    /// avoid false positives from accidental trailing whitespace.
    pub trailing_space_breaks: bool,
}

/// Collapse interior whitespace and trim spaces just inside parentheses.
pub(crate) fn collapse_text(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text.trim(), " ");
    let opened = OPEN_PAREN_WS_RE.replace_all(&collapsed, "(");
    CLOSE_PAREN_WS_RE.replace_all(&opened, ")").into_owned()
}

/// True when the line opens a new block rather than continuing a paragraph.
fn is_block_start(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with('|')
        || trimmed.starts_with('>')
        || trimmed.starts_with("$$")
        || trimmed.starts_with("![")
        || line.trim() == "---"
        || BULLET_PREFIX_RE.is_match(line)
        || NUMBERED_PREFIX_RE.is_match(line)
}

/// Normalize raw body lines into logical lines ready for block segmentation.
pub fn normalize_lines(lines: &[String], opts: &NormalizeOptions) -> Vec<String> {
    let mut out = Vec::new();
    let mut in_equation = false;
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];
        let trimmed = line.trim();

        // Equation block interiors are verbatim.
        if in_equation {
            out.push(line.trim_end().to_string());
            if trimmed == "$$" {
                in_equation = false;
            }
            i += 1;
            continue;
        }

        if trimmed == "$$" {
            out.push(trimmed.to_string());
            in_equation = true;
            i += 1;
            continue;
        }

        // Wrapped base64 payload: concatenate chunks without separators.
        if BASE64_OPEN_RE.is_match(trimmed) && !trimmed.ends_with(')') {
            let mut combined = trimmed.to_string();
            let start = i;
            i += 1;
            while i < lines.len() && i - start < MAX_IMAGE_LOOKAHEAD {
                let chunk = lines[i].trim();
                combined.push_str(chunk);
                i += 1;
                if chunk.ends_with(')') {
                    break;
                }
            }
            out.push(combined);
            continue;
        }

        // List items keep their marker and absorb continuation lines.
        if let Some(caps) = BULLET_PREFIX_RE
            .captures(line)
            .or_else(|| NUMBERED_PREFIX_RE.captures(line))
        {
            let prefix = caps[1].to_string();
            let first = caps[2].to_string();
            let (logical, next) = collect_block(lines, i + 1, first, opts);
            for (idx, merged) in logical.into_iter().enumerate() {
                if idx == 0 {
                    out.push(format!("{prefix}{merged}"));
                } else {
                    out.push(merged);
                }
            }
            i = next;
            continue;
        }

        // Other block starts pass through unchanged.
        if is_block_start(line) {
            if trimmed.is_empty() {
                out.push(String::new());
            } else {
                out.push(line.trim_end().to_string());
            }
            i += 1;
            continue;
        }

        // Plain paragraph: merge soft-wrapped continuations.
        let (logical, next) = collect_block(lines, i + 1, line.clone(), opts);
        out.extend(logical);
        i = next;
    }

    out
}

/// Merge a starting line plus its continuation lines into logical lines,
/// splitting at hard breaks. Returns the logical lines and the index of the
/// first unconsumed source line.
fn collect_block(
    lines: &[String],
    from: usize,
    first: String,
    opts: &NormalizeOptions,
) -> (Vec<String>, usize) {
    let mut logical = Vec::new();
    let mut pieces: Vec<String> = Vec::new();

    let fold = |raw: &str, logical: &mut Vec<String>, pieces: &mut Vec<String>| {
        let mut text = raw.trim_end_matches(['\n', '\r']).to_string();
        let mut hard_break = opts.trailing_space_breaks && text.ends_with("  ");
        let trimmed_end = text.trim_end().to_string();
        if trimmed_end.ends_with('\\') {
            text = trimmed_end[..trimmed_end.len() - 1].to_string();
            hard_break = true;
        } else {
            text = trimmed_end;
        }

        let segments: Vec<String> = BREAK_TAG_RE.split(&text).map(str::to_string).collect();
        let last_idx = segments.len() - 1;
        for (idx, segment) in segments.into_iter().enumerate() {
            pieces.push(segment);
            if idx < last_idx || (idx == last_idx && hard_break) {
                finalize(pieces, logical);
            }
        }
    };

    fold(&first, &mut logical, &mut pieces);

    let mut i = from;
    while i < lines.len() && !is_block_start(&lines[i]) {
        fold(&lines[i], &mut logical, &mut pieces);
        i += 1;
    }

    finalize(&mut pieces, &mut logical);
    (logical, i)
}

fn finalize(pieces: &mut Vec<String>, logical: &mut Vec<String>) {
    if pieces.is_empty() {
        return;
    }
    let merged = collapse_text(&pieces.join(" "));
    pieces.clear();
    if !merged.is_empty() {
        logical.push(merged);
    }
}
