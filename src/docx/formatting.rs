//! Run and text extraction from document paragraphs
//!
//! Maps the external library's run objects onto `TextRun`s, copying the
//! bold/italic/superscript flags and skipping empty-text runs.

use crate::document::TextRun;

/// Extract formatted runs from a paragraph. Empty-text runs are dropped.
pub(crate) fn extract_runs(para: &docx_rs::Paragraph) -> Vec<TextRun> {
    let mut runs = Vec::new();

    for child in &para.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            let text = extract_run_text(run);
            if text.is_empty() {
                continue;
            }
            let props = &run.run_property;
            runs.push(TextRun {
                text,
                bold: props.bold.is_some(),
                italic: props.italic.is_some(),
                superscript: is_superscript(run),
            });
        }
    }

    runs
}

/// Extract plain text from a run, mapping tabs and line breaks.
pub(crate) fn extract_run_text(run: &docx_rs::Run) -> String {
    let mut text = String::new();

    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(text_elem) => {
                text.push_str(&text_elem.text);
            }
            docx_rs::RunChild::Tab(_) => {
                text.push('\t');
            }
            docx_rs::RunChild::Break(_) => {
                text.push('\n');
            }
            _ => {}
        }
    }

    text
}

/// Plain text of the whole paragraph.
pub(crate) fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            text.push_str(&extract_run_text(run));
        }
    }
    text.trim().to_string()
}

/// Count embedded drawings (pictures) in a paragraph.
pub(crate) fn count_drawings(para: &docx_rs::Paragraph) -> usize {
    para.children
        .iter()
        .filter_map(|child| match child {
            docx_rs::ParagraphChild::Run(run) => Some(run),
            _ => None,
        })
        .flat_map(|run| run.children.iter())
        .filter(|child| matches!(child, docx_rs::RunChild::Drawing(_)))
        .count()
}

/// Detect a superscript vertical alignment on the run.
///
/// The alignment value sits behind a private field, so it is read through
/// debug formatting as a workaround for private field access.
fn is_superscript(run: &docx_rs::Run) -> bool {
    match &run.run_property.vert_align {
        Some(vert_align) => format!("{vert_align:?}")
            .to_ascii_lowercase()
            .contains("superscript"),
        None => false,
    }
}
