//! Block segmentation: markup text → document model
//!
//! The parser runs front-matter extraction, the normalization pre-pass, then
//! partitions the logical line stream into elements. Parsing is deterministic
//! and never fails on malformed input: anything unrecognized degrades to a
//! plain paragraph carrying the raw line.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::*;
use crate::markup::normalize::{normalize_lines, NormalizeOptions};
use crate::markup::{frontmatter, inline, table};

static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,4})\s+(.+)$").unwrap());
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)([-*])\s+(.+)$").unwrap());
static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)(\d+)\.\s+(.+)$").unwrap());
static BLOCKQUOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>\s?(.*)$").unwrap());
static CALLOUT_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]+)\]\s*(.*)$").unwrap());
static IMAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^!\[(.*?)\]\((.*?)\)$").unwrap());
static BASE64_IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^!\[([^\]]*)\]\(data:(image/[a-zA-Z0-9+.\-]+);base64,([A-Za-z0-9+/=\s]+)\)\s*$",
    )
    .unwrap()
});
static BASE64_DETECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\(data:image/[a-zA-Z0-9+.\-]+;base64,").unwrap());
static LATEX_BLOCK_SINGLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\$(.+?)\$\$$").unwrap());
static LATEX_INLINE_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\$([^$]+)\$$").unwrap());

/// Parse markup text into a document model with element-level diagnostics.
pub fn parse_markup(text: &str, opts: &NormalizeOptions) -> ParsedDocument {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let (metadata, body_start) = frontmatter::parse(&lines);
    let body = normalize_lines(&lines[body_start..], opts);

    let mut parsed = ParsedDocument::default();
    parsed.model.metadata = metadata;
    parse_elements(&body, &mut parsed);

    log::debug!(
        "parsed markup: {} elements, {} warnings",
        parsed.model.elements.len(),
        parsed.warnings.len()
    );
    parsed
}

fn parse_elements(lines: &[String], parsed: &mut ParsedDocument) {
    let elements = &mut parsed.model.elements;
    let warnings = &mut parsed.warnings;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim_end().to_string();
        let trimmed = line.trim();

        if trimmed.is_empty() {
            i += 1;
            continue;
        }

        // Separator, unless it opens a table section (handled below by `|`).
        if trimmed == "---" {
            elements.push(Element::new(ElementKind::Separator, trimmed));
            i += 1;
            continue;
        }

        // Display equations have priority over everything else.
        if let Some(caps) = LATEX_BLOCK_SINGLE_RE.captures(trimmed) {
            elements.push(Element::new(
                ElementKind::Latex(LatexBlock {
                    source: caps[1].trim().to_string(),
                    display: true,
                }),
                trimmed,
            ));
            i += 1;
            continue;
        }

        if trimmed == "$$" {
            let mut body_lines = Vec::new();
            i += 1;
            while i < lines.len() && lines[i].trim() != "$$" {
                body_lines.push(lines[i].clone());
                i += 1;
            }
            if i < lines.len() {
                i += 1; // closing delimiter
            }
            let source = body_lines.join("\n").trim().to_string();
            if source.is_empty() {
                let message = "empty display equation block skipped".to_string();
                log::warn!("{message}");
                warnings.push(message);
            } else {
                let raw = format!("$$\n{source}\n$$");
                elements.push(Element::new(
                    ElementKind::Latex(LatexBlock {
                        source,
                        display: true,
                    }),
                    raw,
                ));
            }
            continue;
        }

        if let Some(caps) = LATEX_INLINE_LINE_RE.captures(trimmed) {
            elements.push(Element::new(
                ElementKind::Latex(LatexBlock {
                    source: caps[1].trim().to_string(),
                    display: false,
                }),
                trimmed,
            ));
            i += 1;
            continue;
        }

        // Base64 images before plain images: the data URI also matches the
        // generic image pattern but needs payload handling.
        if BASE64_DETECT_RE.is_match(trimmed) {
            if let Some(caps) = BASE64_IMAGE_RE.captures(trimmed) {
                let data: String = caps[3].chars().filter(|c| !c.is_whitespace()).collect();
                if data.len() >= 4 {
                    elements.push(Element::new(
                        ElementKind::Image(ImageRef {
                            alt: caps[1].to_string(),
                            source: ImageSource::Base64 {
                                mime: caps[2].to_string(),
                                data,
                            },
                        }),
                        truncate_raw(trimmed),
                    ));
                    i += 1;
                    continue;
                }
            }
            let message = format!("unparseable base64 image at line {i}; kept as paragraph");
            log::warn!("{message}");
            warnings.push(message);
            elements.push(paragraph_element(trimmed));
            i += 1;
            continue;
        }

        // Table section: all contiguous pipe lines.
        if trimmed.starts_with('|') {
            let start = i;
            let mut section = Vec::new();
            while i < lines.len() && lines[i].trim().starts_with('|') {
                section.push(lines[i].trim().to_string());
                i += 1;
            }
            match table::parse_table(&section, warnings) {
                Some(parsed_table) => {
                    elements.push(Element::new(
                        ElementKind::Table(parsed_table),
                        section.join("\n"),
                    ));
                }
                None => {
                    // Not a table without an alignment row; each line falls
                    // back to an ordinary paragraph.
                    let message =
                        format!("pipe section at line {start} has no alignment row; degraded");
                    log::warn!("{message}");
                    warnings.push(message);
                    for section_line in &section {
                        elements.push(paragraph_element(section_line));
                    }
                }
            }
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(trimmed) {
            let level = caps[1].len() as u8;
            let text = inline::cleanup_text(&caps[2]).replace("**", "");
            elements.push(Element::new(
                ElementKind::Heading(Heading { level, text }),
                trimmed,
            ));
            i += 1;
            continue;
        }

        // Blockquote: merge consecutive `>` lines into one callout.
        if BLOCKQUOTE_RE.is_match(trimmed) {
            let mut quote_lines = Vec::new();
            let mut raw_lines = Vec::new();
            while i < lines.len() {
                match BLOCKQUOTE_RE.captures(lines[i].trim()) {
                    Some(caps) => {
                        raw_lines.push(lines[i].trim().to_string());
                        quote_lines.push(inline::cleanup_text(&caps[1]).replace("**", ""));
                        i += 1;
                    }
                    None => break,
                }
            }

            let (label, body) = extract_callout_label(&quote_lines);
            elements.push(Element::new(
                ElementKind::Callout(Callout { label, text: body }),
                raw_lines.join("\n"),
            ));
            continue;
        }

        if let Some(caps) = BULLET_RE.captures(&line) {
            let indent = (caps[1].len() / 2) as u8;
            let text = caps[3].to_string();
            elements.push(Element::new(
                ElementKind::BulletItem(ListItem {
                    runs: inline::parse_runs(&text),
                    indent,
                }),
                line.clone(),
            ));
            i += 1;
            continue;
        }

        if let Some(caps) = NUMBERED_RE.captures(&line) {
            let indent = (caps[1].len() / 2) as u8;
            let number = caps[2].to_string();
            let text = caps[3].to_string();
            elements.push(Element::new(
                ElementKind::NumberedItem(NumberedItem {
                    number,
                    item: ListItem {
                        runs: inline::parse_runs(&text),
                        indent,
                    },
                }),
                line.clone(),
            ));
            i += 1;
            continue;
        }

        if let Some(caps) = IMAGE_RE.captures(trimmed) {
            elements.push(Element::new(
                ElementKind::Image(ImageRef {
                    alt: caps[1].to_string(),
                    source: ImageSource::Path(caps[2].to_string()),
                }),
                trimmed,
            ));
            i += 1;
            continue;
        }

        elements.push(paragraph_element(trimmed));
        i += 1;
    }
}

fn paragraph_element(line: &str) -> Element {
    Element::new(
        ElementKind::Paragraph(Paragraph {
            runs: inline::parse_runs(line),
        }),
        line,
    )
}

/// Pick the callout label off the first quote line, if it carries one.
/// Unrecognized bracketed labels pass through as-is; quotes without a label
/// default to the key-insight category.
fn extract_callout_label(quote_lines: &[String]) -> (CalloutLabel, String) {
    let mut body_lines: Vec<&str> = quote_lines.iter().map(String::as_str).collect();
    let mut label = CalloutLabel::Insight;

    if let Some(first) = quote_lines.first() {
        if let Some(caps) = CALLOUT_LABEL_RE.captures(first) {
            label = CalloutLabel::from_label(&caps[1]);
            let remainder = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            body_lines.remove(0);
            if !remainder.is_empty() {
                return (
                    label,
                    std::iter::once(remainder)
                        .chain(body_lines.into_iter())
                        .collect::<Vec<_>>()
                        .join(" ")
                        .trim()
                        .to_string(),
                );
            }
        }
    }

    let body = body_lines
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    (label, body)
}

/// Raw-text diagnostics keep at most a line's worth of payload.
fn truncate_raw(line: &str) -> String {
    if line.chars().count() > 100 {
        let prefix: String = line.chars().take(100).collect();
        format!("{prefix}...")
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> DocumentModel {
        parse_markup(text, &NormalizeOptions::default()).model
    }

    #[test]
    fn test_heading_and_paragraph() {
        let model = parse("## 요약\n내용입니다.");
        assert_eq!(model.elements.len(), 2);
        assert_eq!(
            model.elements[0].kind,
            ElementKind::Heading(Heading {
                level: 2,
                text: "요약".to_string()
            })
        );
        match &model.elements[1].kind {
            ElementKind::Paragraph(para) => assert_eq!(para.text(), "내용입니다."),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_heading_levels_clamped_to_four() {
        let model = parse("#### Deep heading\n##### Not a heading level");
        assert_eq!(
            model.elements[0].kind,
            ElementKind::Heading(Heading {
                level: 4,
                text: "Deep heading".to_string()
            })
        );
        assert!(matches!(
            model.elements[1].kind,
            ElementKind::Paragraph(_)
        ));
    }

    #[test]
    fn test_blockquote_with_known_label() {
        let model = parse("> [요약] 핵심 내용 정리\n> 두 번째 줄");
        match &model.elements[0].kind {
            ElementKind::Callout(callout) => {
                assert_eq!(callout.label, CalloutLabel::Summary);
                assert_eq!(callout.text, "핵심 내용 정리 두 번째 줄");
            }
            other => panic!("expected callout, got {other:?}"),
        }
    }

    #[test]
    fn test_blockquote_unknown_label_passes_through() {
        let model = parse("> [DISCLAIMER] not investment advice");
        match &model.elements[0].kind {
            ElementKind::Callout(callout) => {
                assert_eq!(
                    callout.label,
                    CalloutLabel::Other("DISCLAIMER".to_string())
                );
                assert_eq!(callout.text, "not investment advice");
            }
            other => panic!("expected callout, got {other:?}"),
        }
    }

    #[test]
    fn test_numbered_item_keeps_literal_number() {
        let model = parse("3. third step");
        match &model.elements[0].kind {
            ElementKind::NumberedItem(numbered) => {
                assert_eq!(numbered.number, "3");
                assert_eq!(TextRun::plain_text(&numbered.item.runs), "third step");
            }
            other => panic!("expected numbered item, got {other:?}"),
        }
    }

    #[test]
    fn test_bullet_indentation_levels() {
        let model = parse("- top\n  - nested");
        match (&model.elements[0].kind, &model.elements[1].kind) {
            (ElementKind::BulletItem(a), ElementKind::BulletItem(b)) => {
                assert_eq!(a.indent, 0);
                assert_eq!(b.indent, 1);
            }
            other => panic!("expected bullet items, got {other:?}"),
        }
    }

    #[test]
    fn test_table_requires_alignment_row() {
        let model = parse("| a | b |\n| 1 | 2 |");
        assert!(model
            .elements
            .iter()
            .all(|e| matches!(e.kind, ElementKind::Paragraph(_))));

        let model = parse("| a | b |\n| --- | --- |\n| 1 | 2 |");
        assert!(matches!(model.elements[0].kind, ElementKind::Table(_)));
    }

    #[test]
    fn test_latex_blocks() {
        let model = parse("$$ E = mc^2 $$\n\n$$\n\\frac{a}{b}\n$$\n\n$x + y$");
        match &model.elements[0].kind {
            ElementKind::Latex(eq) => {
                assert_eq!(eq.source, "E = mc^2");
                assert!(eq.display);
            }
            other => panic!("expected latex, got {other:?}"),
        }
        match &model.elements[1].kind {
            ElementKind::Latex(eq) => {
                assert_eq!(eq.source, "\\frac{a}{b}");
                assert!(eq.display);
            }
            other => panic!("expected latex, got {other:?}"),
        }
        match &model.elements[2].kind {
            ElementKind::Latex(eq) => {
                assert_eq!(eq.source, "x + y");
                assert!(!eq.display);
            }
            other => panic!("expected latex, got {other:?}"),
        }
    }

    #[test]
    fn test_images_path_and_base64() {
        let model = parse("![Chart](figures/chart.png)\n\n![Inline](data:image/png;base64,iVBORw0KGgo=)");
        match &model.elements[0].kind {
            ElementKind::Image(image) => {
                assert_eq!(image.alt, "Chart");
                assert_eq!(
                    image.source,
                    ImageSource::Path("figures/chart.png".to_string())
                );
            }
            other => panic!("expected image, got {other:?}"),
        }
        match &model.elements[1].kind {
            ElementKind::Image(image) => match &image.source {
                ImageSource::Base64 { mime, data } => {
                    assert_eq!(mime, "image/png");
                    assert_eq!(data, "iVBORw0KGgo=");
                }
                other => panic!("expected base64 source, got {other:?}"),
            },
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn test_front_matter_feeds_metadata() {
        let model = parse("---\ntitle: Q4 Review\nticker: KDB\n---\n\n# Overview\n");
        assert_eq!(model.metadata.title, "Q4 Review");
        assert_eq!(model.metadata.ticker, "KDB");
        assert_eq!(model.elements.len(), 1);
    }

    #[test]
    fn test_separator_element() {
        let model = parse("before\n\n---\n\nafter");
        assert!(matches!(model.elements[1].kind, ElementKind::Separator));
    }

    #[test]
    fn test_malformed_input_never_fails() {
        let model = parse("| broken |\n\n$$\n\n##### too deep\n\n![bad](data:image/png;base64,x)");
        assert!(!model.elements.is_empty());
    }
}
