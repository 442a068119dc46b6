//! Word-document extraction driven through in-memory documents.

use mdox::document::{CalloutLabel, ElementKind, Metadata};
use mdox::docx::{parse_docx, DocxParseOptions};
use mdox::markup::{render_markup, RenderConfig};

fn text_para(text: &str) -> docx_rs::Paragraph {
    docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(text))
}

fn cell(text: &str) -> docx_rs::TableCell {
    docx_rs::TableCell::new().add_paragraph(text_para(text))
}

fn parse(docx: docx_rs::Docx) -> mdox::ParsedDocument {
    parse_docx(&docx, Metadata::default(), &DocxParseOptions::default())
}

fn business_report() -> docx_rs::Docx {
    docx_rs::Docx::new()
        .add_paragraph(text_para("Q4 Deep Dive").style("Heading1"))
        .add_paragraph(
            docx_rs::Paragraph::new()
                .add_run(docx_rs::Run::new().add_text("Revenue "))
                .add_run(docx_rs::Run::new().add_text("doubled").bold())
                .add_run(docx_rs::Run::new().add_text(" against guidance.")),
        )
        .add_table(docx_rs::Table::new(vec![
            docx_rs::TableRow::new(vec![cell("Metric"), cell("2024"), cell("2025")]),
            docx_rs::TableRow::new(vec![cell("Revenue"), cell("100"), cell("200")]),
        ]))
        .add_table(docx_rs::Table::new(vec![docx_rs::TableRow::new(vec![
            cell("WARNING: check assumptions"),
        ])]))
        .add_paragraph(text_para("Valuation").style("Heading2"))
        .add_paragraph(text_para("closing remark paragraph"))
}

#[test]
fn test_extraction_preserves_document_order() {
    let parsed = parse(business_report());
    let kinds: Vec<&ElementKind> = parsed.model.elements.iter().map(|e| &e.kind).collect();

    assert!(matches!(kinds[0], ElementKind::Heading(h) if h.level == 1));
    assert!(matches!(kinds[1], ElementKind::Paragraph(_)));
    assert!(matches!(kinds[2], ElementKind::Table(_)));
    assert!(matches!(kinds[3], ElementKind::Callout(_)));
    assert!(matches!(kinds[4], ElementKind::Heading(h) if h.level == 2));
    assert!(matches!(kinds[5], ElementKind::Paragraph(_)));
}

#[test]
fn test_extraction_to_markup_end_to_end() {
    let parsed = parse(business_report());
    let rendered = render_markup(&parsed.model, &RenderConfig::default());

    assert!(rendered.contains("# Q4 Deep Dive"));
    assert!(rendered.contains("Revenue **doubled** against guidance."));
    assert!(rendered.contains("| Metric | 2024 | 2025 |"));
    assert!(rendered.contains("| --- | --- | --- |"));
    assert!(rendered.contains("| Revenue | 100 | 200 |"));
    assert!(rendered.contains("> **[WARNING]**\n> check assumptions"));
    assert!(rendered.contains("## Valuation"));
}

#[test]
fn test_callout_detection_from_single_cell_table() {
    let parsed = parse(business_report());
    let callout = parsed
        .model
        .elements
        .iter()
        .find_map(|element| match &element.kind {
            ElementKind::Callout(callout) => Some(callout),
            _ => None,
        })
        .expect("callout extracted");

    assert_eq!(callout.label, CalloutLabel::Warning);
    assert_eq!(callout.text, "check assumptions");
}

#[test]
fn test_title_inferred_from_first_heading() {
    let parsed = parse(business_report());
    assert_eq!(parsed.model.metadata.title, "Q4 Deep Dive");
}

#[test]
fn test_explicit_metadata_wins_over_heading() {
    let mut metadata = Metadata::default();
    metadata.title = "Property Title".to_string();
    let parsed = parse_docx(
        &business_report(),
        metadata,
        &DocxParseOptions::default(),
    );
    assert_eq!(parsed.model.metadata.title, "Property Title");
}

#[test]
fn test_table_rows_share_column_count() {
    let docx = docx_rs::Docx::new().add_table(docx_rs::Table::new(vec![
        docx_rs::TableRow::new(vec![cell("a"), cell("b"), cell("c")]),
        docx_rs::TableRow::new(vec![cell("1")]),
        docx_rs::TableRow::new(vec![cell("x"), cell("y")]),
    ]));

    let parsed = parse(docx);
    match &parsed.model.elements[0].kind {
        ElementKind::Table(table) => {
            assert_eq!(table.col_count, 3);
            assert!(table.rows.iter().all(|row| row.cells.len() == 3));
        }
        other => panic!("expected table, got {other:?}"),
    }
    assert!(!parsed.warnings.is_empty());
}

#[test]
fn test_heuristic_heading_tunable() {
    let bold_para = docx_rs::Paragraph::new()
        .add_run(docx_rs::Run::new().add_text("Key Risks and Mitigants").bold());

    let default_parsed = parse_docx(
        &docx_rs::Docx::new().add_paragraph(bold_para.clone()),
        Metadata::default(),
        &DocxParseOptions::default(),
    );
    assert!(matches!(
        default_parsed.model.elements[0].kind,
        ElementKind::Heading(_)
    ));

    // Tightening the cutoff below the text length turns it back into a body
    // paragraph.
    let strict_parsed = parse_docx(
        &docx_rs::Docx::new().add_paragraph(bold_para),
        Metadata::default(),
        &DocxParseOptions {
            bold_heading_max_len: 10,
        },
    );
    assert!(matches!(
        strict_parsed.model.elements[0].kind,
        ElementKind::Paragraph(_)
    ));
}
