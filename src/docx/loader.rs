//! Document loading and orchestration
//!
//! `load_document()` validates the container, pulls metadata, and walks the
//! document body in source order, dispatching each child through the style
//! tables, the callout detector, and the table extractor. A paragraph or
//! table whose shape cannot be mapped degrades to a plain paragraph of its
//! visible text; it never aborts the conversion.

use anyhow::Result;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::*;
use crate::docx::formatting::{count_drawings, extract_runs};
use crate::docx::styles::{heading_level_from_style, is_heading_by_formatting, ListKind};
use crate::docx::{properties, styles, table};
use crate::io::validate_docx_container;

static NUMBERED_TEXT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s+(.+)$").unwrap());

#[derive(Debug, Clone)]
pub struct DocxParseOptions {
    /// Upper length bound for the all-bold heading fallback. The heuristic is
    /// lossy by nature; tune it per corpus rather than trusting the default.
    pub bold_heading_max_len: usize,
}

impl Default for DocxParseOptions {
    fn default() -> Self {
        DocxParseOptions {
            bold_heading_max_len: 100,
        }
    }
}

/// Parse a .docx file into the document intermediate representation.
pub fn load_document(path: &Path, opts: &DocxParseOptions) -> Result<ParsedDocument> {
    validate_docx_container(path)?;

    let metadata = properties::extract_metadata(path)?;
    let file_data = std::fs::read(path)?;
    let docx = docx_rs::read_docx(&file_data)?;

    let parsed = parse_docx(&docx, metadata, opts);
    log::debug!(
        "loaded {}: {} elements, {} words, {} warnings",
        path.display(),
        parsed.model.elements.len(),
        word_count(&parsed.model),
        parsed.warnings.len()
    );
    Ok(parsed)
}

/// Map an in-memory document tree onto the intermediate representation.
///
/// Separated from `load_document` so tests can drive it with documents built
/// through the library's own constructors.
pub fn parse_docx(
    docx: &docx_rs::Docx,
    metadata: Metadata,
    opts: &DocxParseOptions,
) -> ParsedDocument {
    let mut parsed = ParsedDocument::default();
    parsed.model.metadata = metadata;
    let mut image_counter = 0usize;

    for child in &docx.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                parse_paragraph(para, opts, &mut parsed, &mut image_counter);
            }
            docx_rs::DocumentChild::Table(doc_table) => {
                parse_table(doc_table, &mut parsed);
            }
            _ => {}
        }
    }

    // A document without a title property takes its first top-level heading.
    if parsed.model.metadata.title.is_empty() {
        if let Some(title) = first_heading_at_level(&parsed.model, 1).map(str::to_string) {
            parsed.model.metadata.title = title;
        }
    }

    parsed
}

fn parse_paragraph(
    para: &docx_rs::Paragraph,
    opts: &DocxParseOptions,
    parsed: &mut ParsedDocument,
    image_counter: &mut usize,
) {
    // Embedded pictures become placeholder references in document order; the
    // bytes themselves stay with the external library.
    for _ in 0..count_drawings(para) {
        *image_counter += 1;
        let alt = format!("Figure {image_counter}");
        parsed.model.elements.push(Element::new(
            ElementKind::Image(ImageRef {
                alt: alt.clone(),
                source: ImageSource::Path(format!("image_{image_counter}.png")),
            }),
            alt,
        ));
    }

    let runs = extract_runs(para);
    let text = TextRun::plain_text(&runs).trim().to_string();
    if text.is_empty() {
        return;
    }

    let style_name = para
        .property
        .style
        .as_ref()
        .map(|style| style.val.as_str())
        .unwrap_or("");

    // Named heading styles first, then the conservative all-bold fallback.
    let heading_level = heading_level_from_style(style_name).or_else(|| {
        if is_heading_by_formatting(&runs, opts.bold_heading_max_len) {
            Some(2)
        } else {
            None
        }
    });
    if let Some(level) = heading_level {
        parsed.model.elements.push(Element::new(
            ElementKind::Heading(Heading {
                level,
                text: text.clone(),
            }),
            text,
        ));
        return;
    }

    match styles::list_kind_from_style(style_name) {
        Some(ListKind::Bullet) => {
            parsed.model.elements.push(Element::new(
                ElementKind::BulletItem(ListItem { runs, indent: 0 }),
                text,
            ));
        }
        Some(ListKind::Number) => {
            // Re-derive the literal index when the text carries one.
            let (number, item_runs) = match NUMBERED_TEXT_RE.captures(&text) {
                Some(caps) => (
                    caps[1].to_string(),
                    vec![TextRun::plain(caps[2].to_string())],
                ),
                None => ("1".to_string(), runs),
            };
            parsed.model.elements.push(Element::new(
                ElementKind::NumberedItem(NumberedItem {
                    number,
                    item: ListItem {
                        runs: item_runs,
                        indent: 0,
                    },
                }),
                text,
            ));
        }
        None => {
            parsed.model.elements.push(Element::new(
                ElementKind::Paragraph(Paragraph { runs }),
                text,
            ));
        }
    }
}

fn parse_table(doc_table: &docx_rs::Table, parsed: &mut ParsedDocument) {
    if let Some(callout) = table::detect_callout(doc_table) {
        let raw = callout.text.clone();
        parsed
            .model
            .elements
            .push(Element::new(ElementKind::Callout(callout), raw));
        return;
    }

    match table::extract_table(doc_table, &mut parsed.warnings) {
        Some(extracted) => {
            parsed
                .model
                .elements
                .push(Element::new(ElementKind::Table(extracted), "[TABLE]"));
        }
        None => {
            let message = "table with no content skipped".to_string();
            log::warn!("{message}");
            parsed.warnings.push(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_para(text: &str) -> docx_rs::Paragraph {
        docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(text))
    }

    fn styled_para(text: &str, style: &str) -> docx_rs::Paragraph {
        text_para(text).style(style)
    }

    fn parse(docx: docx_rs::Docx) -> ParsedDocument {
        parse_docx(&docx, Metadata::default(), &DocxParseOptions::default())
    }

    #[test]
    fn test_heading_styles_and_document_order() {
        let docx = docx_rs::Docx::new()
            .add_paragraph(styled_para("Overview", "Heading1"))
            .add_paragraph(text_para("Body before the table."))
            .add_table(docx_rs::Table::new(vec![docx_rs::TableRow::new(vec![
                docx_rs::TableCell::new().add_paragraph(text_para("Metric")),
                docx_rs::TableCell::new().add_paragraph(text_para("Value")),
            ])]))
            .add_paragraph(styled_para("Valuation", "Heading2"));

        let parsed = parse(docx);
        let kinds: Vec<&ElementKind> = parsed.model.elements.iter().map(|e| &e.kind).collect();

        assert!(matches!(kinds[0], ElementKind::Heading(h) if h.level == 1));
        assert!(matches!(kinds[1], ElementKind::Paragraph(_)));
        assert!(matches!(kinds[2], ElementKind::Table(_)));
        assert!(matches!(kinds[3], ElementKind::Heading(h) if h.level == 2));
    }

    #[test]
    fn test_title_falls_back_to_first_level_one_heading() {
        let docx = docx_rs::Docx::new()
            .add_paragraph(styled_para("Q4 Deep Dive", "Heading1"))
            .add_paragraph(text_para("Body."));
        let parsed = parse(docx);
        assert_eq!(parsed.model.metadata.title, "Q4 Deep Dive");
    }

    #[test]
    fn test_bold_fallback_heading_is_level_two() {
        let docx = docx_rs::Docx::new().add_paragraph(
            docx_rs::Paragraph::new()
                .add_run(docx_rs::Run::new().add_text("Investment Highlights").bold()),
        );
        let parsed = parse(docx);
        assert!(matches!(
            &parsed.model.elements[0].kind,
            ElementKind::Heading(h) if h.level == 2 && h.text == "Investment Highlights"
        ));
    }

    #[test]
    fn test_bold_sentence_stays_paragraph() {
        let docx = docx_rs::Docx::new().add_paragraph(
            docx_rs::Paragraph::new()
                .add_run(docx_rs::Run::new().add_text("Margins compressed sharply in Q3.").bold()),
        );
        let parsed = parse(docx);
        assert!(matches!(
            parsed.model.elements[0].kind,
            ElementKind::Paragraph(_)
        ));
    }

    #[test]
    fn test_list_styles_map_to_items() {
        let docx = docx_rs::Docx::new()
            .add_paragraph(styled_para("first point", "ListBullet"))
            .add_paragraph(styled_para("2. second step", "ListNumber"))
            .add_paragraph(styled_para("unnumbered entry", "ListNumber"));

        let parsed = parse(docx);
        assert!(matches!(
            parsed.model.elements[0].kind,
            ElementKind::BulletItem(_)
        ));
        match &parsed.model.elements[1].kind {
            ElementKind::NumberedItem(numbered) => {
                assert_eq!(numbered.number, "2");
                assert_eq!(TextRun::plain_text(&numbered.item.runs), "second step");
            }
            other => panic!("expected numbered item, got {other:?}"),
        }
        match &parsed.model.elements[2].kind {
            ElementKind::NumberedItem(numbered) => assert_eq!(numbered.number, "1"),
            other => panic!("expected numbered item, got {other:?}"),
        }
    }

    #[test]
    fn test_callout_table_becomes_callout() {
        let docx = docx_rs::Docx::new().add_table(docx_rs::Table::new(vec![
            docx_rs::TableRow::new(vec![docx_rs::TableCell::new()
                .add_paragraph(text_para("WARNING: check assumptions"))]),
        ]));
        let parsed = parse(docx);
        match &parsed.model.elements[0].kind {
            ElementKind::Callout(callout) => {
                assert_eq!(callout.label, CalloutLabel::Warning);
                assert_eq!(callout.text, "check assumptions");
            }
            other => panic!("expected callout, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_paragraphs_skipped() {
        let docx = docx_rs::Docx::new()
            .add_paragraph(docx_rs::Paragraph::new())
            .add_paragraph(text_para("content"));
        let parsed = parse(docx);
        assert_eq!(parsed.model.elements.len(), 1);
    }
}
