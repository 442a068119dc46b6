//! Read-only queries over a parsed document
//!
//! This module provides navigation and text-extraction operations that do not
//! mutate the model: outline generation, plain-text flattening, and heading
//! lookup used for title inference.

use serde::{Deserialize, Serialize};

use super::models::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineItem {
    pub title: String,
    pub level: u8,
    pub element_index: usize,
}

/// Collect all headings in document order.
pub fn generate_outline(model: &DocumentModel) -> Vec<OutlineItem> {
    let mut outline = Vec::new();

    for (index, element) in model.elements.iter().enumerate() {
        if let ElementKind::Heading(heading) = &element.kind {
            outline.push(OutlineItem {
                title: heading.text.clone(),
                level: heading.level,
                element_index: index,
            });
        }
    }

    outline
}

/// First heading at the given level, in document order. Used for title
/// inference when a document carries no title property.
pub fn first_heading_at_level(model: &DocumentModel, level: u8) -> Option<&str> {
    model.elements.iter().find_map(|element| match &element.kind {
        ElementKind::Heading(heading) if heading.level == level => Some(heading.text.as_str()),
        _ => None,
    })
}

/// Flatten an element to its visible text, ignoring formatting.
pub fn element_text(element: &Element) -> String {
    match &element.kind {
        ElementKind::Heading(heading) => heading.text.clone(),
        ElementKind::Paragraph(para) => para.text(),
        ElementKind::BulletItem(item) => TextRun::plain_text(&item.runs),
        ElementKind::NumberedItem(numbered) => TextRun::plain_text(&numbered.item.runs),
        ElementKind::Table(table) => table
            .rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .map(|cell| cell.content.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        ElementKind::Callout(callout) => callout.text.clone(),
        ElementKind::Image(image) => image.alt.clone(),
        ElementKind::Latex(latex) => latex.source.clone(),
        ElementKind::Separator => String::new(),
    }
}

/// Whitespace-separated word count across the whole body.
pub fn word_count(model: &DocumentModel) -> usize {
    model
        .elements
        .iter()
        .map(|element| element_text(element).split_whitespace().count())
        .sum()
}
