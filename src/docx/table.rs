//! Table extraction and callout disambiguation
//!
//! Word reports render callout boxes as single-cell tables, so a 1×1 table is
//! tested against the callout keyword vocabulary before being treated as
//! data. Regular tables take row 0 as the header; each cell's text is the
//! newline-join of all its paragraphs, while inline runs come from the first
//! paragraph only — cells with several paragraphs lose run fidelity beyond
//! the first, which is a documented limitation rather than a failure.

use crate::document::{Alignment, Callout, CalloutLabel, Table, TableCell, TableRow, TextRun};
use crate::docx::formatting;

/// Callout keyword vocabulary, ordered; first match wins. Localized and
/// English synonyms map into the fixed label set.
const CALLOUT_KEYWORDS: [(&str, CalloutLabel); 12] = [
    ("EXECUTIVE SUMMARY", CalloutLabel::Summary),
    ("SUMMARY", CalloutLabel::Summary),
    ("요약", CalloutLabel::Summary),
    ("핵심", CalloutLabel::Summary),
    ("KEY INSIGHT", CalloutLabel::Insight),
    ("시사점", CalloutLabel::Insight),
    ("결론", CalloutLabel::Insight),
    ("WARNING", CalloutLabel::Warning),
    ("RISK", CalloutLabel::Warning),
    ("주의", CalloutLabel::Warning),
    ("NOTE", CalloutLabel::Note),
    ("참고", CalloutLabel::Note),
];

/// Check whether a 1×1 table is a callout box; returns the callout when the
/// cell text starts with or contains a vocabulary keyword.
pub(crate) fn detect_callout(table: &docx_rs::Table) -> Option<Callout> {
    let rows = table_rows(table);
    if rows.len() != 1 {
        return None;
    }
    let cells = row_cells(rows[0]);
    if cells.len() != 1 {
        return None;
    }

    let text = cell_text(cells[0]);
    if text.is_empty() {
        return None;
    }

    let upper = text.to_uppercase();
    let (keyword, label) = CALLOUT_KEYWORDS
        .iter()
        .find(|(keyword, _)| upper.contains(keyword))?;

    let body = if upper.starts_with(keyword) {
        text[keyword.len()..]
            .trim_start_matches([':', ' ', '\u{2014}'])
            .trim()
            .to_string()
    } else {
        text.clone()
    };

    Some(Callout {
        label: label.clone(),
        text: body,
    })
}

/// Convert a document table to the intermediate representation.
///
/// Returns `None` for tables with no content; ragged rows are padded to the
/// widest row so the column-count invariant holds.
pub(crate) fn extract_table(table: &docx_rs::Table, warnings: &mut Vec<String>) -> Option<Table> {
    let rows = table_rows(table);
    if rows.is_empty() {
        return None;
    }

    let col_count = rows.iter().map(|row| row_cells(row).len()).max().unwrap_or(0);
    if col_count == 0 {
        return None;
    }

    let mut out = Table {
        rows: Vec::with_capacity(rows.len()),
        col_count,
        alignments: vec![Alignment::Left; col_count],
    };

    for (row_idx, row) in rows.iter().enumerate() {
        let is_header = row_idx == 0;
        let cells = row_cells(row);
        if cells.len() < col_count {
            let message = format!(
                "table row {row_idx} has {} cells (expected {col_count}); padded",
                cells.len()
            );
            log::debug!("{message}");
            warnings.push(message);
        }

        let mut model_row = TableRow {
            cells: Vec::with_capacity(col_count),
            is_header,
        };
        for cell in &cells {
            let content = cell_text(cell);
            let mut model_cell = TableCell::new(content, is_header);
            model_cell.runs = first_paragraph_runs(cell);
            model_row.cells.push(model_cell);
        }
        while model_row.cells.len() < col_count {
            model_row.cells.push(TableCell::new(String::new(), is_header));
        }
        out.rows.push(model_row);
    }

    Some(out)
}

fn table_rows(table: &docx_rs::Table) -> Vec<&docx_rs::TableRow> {
    table
        .rows
        .iter()
        .map(|child| {
            let docx_rs::TableChild::TableRow(row) = child;
            row
        })
        .collect()
}

fn row_cells(row: &docx_rs::TableRow) -> Vec<&docx_rs::TableCell> {
    row.cells
        .iter()
        .map(|child| {
            let docx_rs::TableRowChild::TableCell(cell) = child;
            cell
        })
        .collect()
}

fn cell_paragraphs(cell: &docx_rs::TableCell) -> Vec<&docx_rs::Paragraph> {
    cell.children
        .iter()
        .filter_map(|content| match content {
            docx_rs::TableCellContent::Paragraph(para) => Some(para.as_ref()),
            _ => None,
        })
        .collect()
}

/// Newline-joined text of every paragraph in the cell.
fn cell_text(cell: &docx_rs::TableCell) -> String {
    cell_paragraphs(cell)
        .iter()
        .map(|para| formatting::paragraph_text(para))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Inline runs of the first paragraph only.
fn first_paragraph_runs(cell: &docx_rs::TableCell) -> Vec<TextRun> {
    cell_paragraphs(cell)
        .first()
        .map(|para| formatting::extract_runs(para))
        .unwrap_or_default()
}
