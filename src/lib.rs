//! mdox: bidirectional Markdown/Word document engine
//!
//! This library converts between a lightweight markup text format and rich
//! Word documents for financial report authoring. Both directions meet in a
//! format-agnostic document model: markup text parses into it and renders
//! back out of it, and opened Word documents map onto it in document order.
//! An optional pre-pass normalizes vendor export markers before parsing.
//!
//! Conversion is best-effort throughout: a malformed block degrades to a
//! plain paragraph with a recorded warning, and only file-level or
//! configuration problems surface as errors.

use std::path::{Path, PathBuf};

pub mod cleaner;
pub mod document;
pub mod docx;
pub mod error;
pub mod io;
pub mod markup;

pub use cleaner::{CleanReport, Cleaner, CleanerConfig, CleanerMode, CiteMode};
pub use document::{DocumentModel, Element, ElementKind, Metadata, ParsedDocument, TextRun};
pub use docx::{load_document, DocumentWriter, DocxParseOptions, EquationRenderer};
pub use error::{Error, Result};
pub use markup::{parse_markup, render_markup, NormalizeOptions, RenderConfig};

/// Options for the authoring direction: raw text → model.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub normalize: NormalizeOptions,
    pub cleaner: CleanerConfig,
}

/// Parse markup text into a document model, running the marker cleaner first
/// when its mode asks for it. With the cleaner off (the default) the
/// pipeline behaves identically to having no cleaner at all.
pub fn parse_markup_with_options(
    text: &str,
    opts: &ParseOptions,
) -> (ParsedDocument, CleanReport) {
    let (cleaned, report) = cleaner::clean_markup(text, &opts.cleaner);
    let parsed = markup::parse_markup(&cleaned, &opts.normalize);
    (parsed, report)
}

/// Read and parse a markup file, trying legacy encodings on decode failure.
pub fn parse_markup_file(path: &Path, opts: &ParseOptions) -> Result<(ParsedDocument, CleanReport)> {
    let text = io::read_text_with_fallback(path)?;
    Ok(parse_markup_with_options(&text, opts))
}

/// Render a model to markup text and write it out, retrying once with a
/// timestamp-suffixed name when the destination is locked. Returns the path
/// actually written.
pub fn render_markup_to_file(
    model: &DocumentModel,
    config: &RenderConfig,
    path: &Path,
) -> Result<PathBuf> {
    let text = markup::render_markup(model, config);
    io::write_output_with_retry(path, text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_with_cleaner_off_matches_plain_parse() {
        let text = "# Overview\n\nRevenue **doubled** in Q4.\n";
        let (piped, report) = parse_markup_with_options(text, &ParseOptions::default());
        let direct = markup::parse_markup(text, &NormalizeOptions::default());

        assert_eq!(piped.model, direct.model);
        assert!(!report.applied);
    }
}
