//! Pipe-table parsing
//!
//! A table section is a run of `|`-prefixed lines containing one
//! alignment-separator row (`---`, `:---`, `---:`, `:---:`). Sections without
//! a separator row are not tables and fall back to paragraph handling in the
//! caller. Row widths are normalized to the declared column count: short rows
//! are padded with empty cells, long rows are truncated with a warning so no
//! data is lost silently.

use crate::document::{Alignment, Table, TableCell, TableRow};
use crate::markup::inline;

/// True for an alignment-separator row such as `| --- | :---: |`.
pub fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

/// Parse per-column alignments from a separator row.
pub fn parse_alignments(line: &str) -> Vec<Alignment> {
    split_row(line)
        .into_iter()
        .map(|cell| {
            let cell = cell.trim().to_string();
            let left = cell.starts_with(':');
            let right = cell.ends_with(':');
            match (left, right) {
                (true, true) => Alignment::Center,
                (false, true) => Alignment::Right,
                _ => Alignment::Left,
            }
        })
        .collect()
}

/// Split a table row into cell contents.
///
/// Splits on unescaped pipes, drops the empty leading/trailing segments
/// produced by the surrounding `|` pair, keeps interior empty cells, and
/// unescapes `\|` back to a literal pipe.
pub fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for ch in trimmed.chars() {
        if escaped {
            if ch != '|' {
                current.push('\\');
            }
            current.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '|' {
            cells.push(std::mem::take(&mut current));
            current = String::new();
        } else {
            current.push(ch);
        }
    }
    if escaped {
        current.push('\\');
    }
    cells.push(current);

    if trimmed.starts_with('|') && !cells.is_empty() {
        cells.remove(0);
    }
    if trimmed.ends_with('|') && !cells.is_empty() {
        cells.pop();
    }

    cells.into_iter().map(|c| c.trim().to_string()).collect()
}

/// Parse a collected table section into a `Table`.
///
/// Returns `None` when the section has no alignment-separator row or no data.
pub fn parse_table(lines: &[String], warnings: &mut Vec<String>) -> Option<Table> {
    if !lines.iter().any(|line| is_separator_row(line)) {
        return None;
    }

    let separator = lines.iter().find(|line| is_separator_row(line));
    let data_lines: Vec<&String> = lines.iter().filter(|line| !is_separator_row(line)).collect();
    if data_lines.is_empty() {
        return None;
    }

    let mut table = Table::default();
    table.col_count = split_row(data_lines[0]).len();
    if table.col_count == 0 {
        return None;
    }

    let alignments = separator.map(|line| parse_alignments(line)).unwrap_or_default();
    table.alignments = if alignments.len() == table.col_count {
        alignments
    } else {
        vec![Alignment::Left; table.col_count]
    };

    for (row_idx, line) in data_lines.iter().enumerate() {
        let mut cells = split_row(line);
        let is_header = row_idx == 0;

        while cells.len() < table.col_count {
            cells.push(String::new());
        }
        if cells.len() > table.col_count {
            let dropped: Vec<String> = cells.split_off(table.col_count);
            let message = format!(
                "table row {row_idx} has {} columns (expected {}); extra columns dropped: {dropped:?}",
                cells.len() + dropped.len(),
                table.col_count
            );
            log::warn!("{message}");
            warnings.push(message);
        }

        let mut row = TableRow {
            cells: Vec::with_capacity(table.col_count),
            is_header,
        };
        for content in cells {
            let mut cell = TableCell::new(content, is_header);
            cell.runs = inline::parse_runs(&cell.content);
            row.cells.push(cell);
        }
        table.rows.push(row);
    }

    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_separator_row_detection() {
        assert!(is_separator_row("| --- | ---: |"));
        assert!(is_separator_row("|:---:|---|"));
        assert!(!is_separator_row("| Revenue | 100 |"));
        assert!(!is_separator_row("| | |"));
    }

    #[test]
    fn test_alignments() {
        assert_eq!(
            parse_alignments("| --- | :---: | ---: |"),
            vec![Alignment::Left, Alignment::Center, Alignment::Right]
        );
    }

    #[test]
    fn test_split_row_keeps_interior_empties() {
        assert_eq!(split_row("| a |  | c |"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_split_row_unescapes_pipes() {
        assert_eq!(split_row(r"| a \| b | c |"), vec!["a | b", "c"]);
    }

    #[test]
    fn test_rows_normalized_to_column_count() {
        let mut warnings = Vec::new();
        let table = parse_table(
            &lines(&[
                "| Metric | 2024 | 2025 |",
                "| --- | ---: | ---: |",
                "| Revenue | 100 |",
                "| EBITDA | 20 | 25 | 30 |",
            ]),
            &mut warnings,
        )
        .unwrap();

        assert_eq!(table.col_count, 3);
        assert!(table.rows.iter().all(|row| row.cells.len() == 3));
        assert!(table.rows[0].is_header);
        assert_eq!(table.rows[1].cells[2].content, "");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_section_without_separator_is_not_a_table() {
        let mut warnings = Vec::new();
        let result = parse_table(
            &lines(&["| looks | like | a table |", "| but | has | no separator |"]),
            &mut warnings,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_numeric_cells_flagged() {
        let mut warnings = Vec::new();
        let table = parse_table(
            &lines(&["| Item | Value |", "| --- | ---: |", "| Revenue | 1,234 |"]),
            &mut warnings,
        )
        .unwrap();
        assert!(!table.rows[1].cells[0].is_numeric);
        assert!(table.rows[1].cells[1].is_numeric);
    }
}
