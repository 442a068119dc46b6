//! Core data structures for the document intermediate representation
//!
//! This module defines all the public types shared between the markup parser,
//! the Word-document parser, and the renderers. A `DocumentModel` is built
//! once per conversion job, consumed once, and discarded.

use serde::{Deserialize, Serialize};

/// Document metadata from a front-matter block or Word core properties.
///
/// `extra` preserves insertion order so re-serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub subtitle: String,
    pub company: String,
    pub ticker: String,
    pub sector: String,
    pub analyst: String,
    pub extra: Vec<(String, String)>,
}

impl Metadata {
    /// True when no field has been populated; an all-default metadata block
    /// is omitted from rendered output entirely.
    pub fn is_default(&self) -> bool {
        self.title.is_empty()
            && self.subtitle.is_empty()
            && self.company.is_empty()
            && self.ticker.is_empty()
            && self.sector.is_empty()
            && self.analyst.is_empty()
            && self.extra.is_empty()
    }

    /// Set a named field if it is one of the known keys, otherwise append to
    /// `extra`. Keys are matched case-insensitively.
    pub fn set_field(&mut self, key: &str, value: String) {
        match key.to_ascii_lowercase().as_str() {
            "title" => self.title = value,
            "subtitle" => self.subtitle = value,
            "company" => self.company = value,
            "ticker" => self.ticker = value,
            "sector" => self.sector = value,
            "analyst" => self.analyst = value,
            _ => self.extra.push((key.to_string(), value)),
        }
    }
}

/// A contiguous span of text sharing one formatting-flag combination.
///
/// Invariant: concatenating the `text` of a run sequence yields the plain-text
/// rendering of the containing block with all flags stripped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub superscript: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        TextRun {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        TextRun {
            text: text.into(),
            bold: true,
            ..Default::default()
        }
    }

    /// Concatenate run texts into the flag-stripped plain text.
    pub fn plain_text(runs: &[TextRun]) -> String {
        runs.iter().map(|run| run.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// 1..=4; deeper markers are clamped by the parsers.
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        TextRun::plain_text(&self.runs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub runs: Vec<TextRun>,
    /// Nesting depth, two leading spaces per level in markup.
    pub indent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberedItem {
    /// The literal index as written in the source ("3", not a counter).
    pub number: String,
    pub item: ListItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub content: String,
    pub runs: Vec<TextRun>,
    pub is_header: bool,
    /// Any ASCII digit in the content marks the cell numeric.
    pub is_numeric: bool,
}

impl TableCell {
    pub fn new(content: impl Into<String>, is_header: bool) -> Self {
        let content = content.into();
        let is_numeric = content.chars().any(|c| c.is_ascii_digit());
        TableCell {
            content,
            runs: Vec::new(),
            is_header,
            is_numeric,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    pub is_header: bool,
}

/// A parsed table.
///
/// Invariant: every row holds exactly `col_count` cells; row 0 is the header
/// unless its `is_header` flag was explicitly cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
    pub col_count: usize,
    pub alignments: Vec<Alignment>,
}

/// Category label of a callout box. Unrecognized labels pass through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalloutLabel {
    Summary,
    Insight,
    Warning,
    Note,
    Other(String),
}

impl CalloutLabel {
    /// Map a bracketed label or leading keyword onto the fixed vocabulary.
    /// Covers both the English and the Korean report conventions.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        let upper = trimmed.to_uppercase();
        match upper.as_str() {
            "SUMMARY" | "EXECUTIVE SUMMARY" | "요약" | "핵심" => CalloutLabel::Summary,
            "KEY INSIGHT" | "INSIGHT" | "시사점" | "결론" => CalloutLabel::Insight,
            "WARNING" | "RISK" | "주의" => CalloutLabel::Warning,
            "NOTE" | "참고" => CalloutLabel::Note,
            _ => CalloutLabel::Other(trimmed.to_string()),
        }
    }

    /// Canonical display form used when rendering back to markup.
    pub fn display(&self) -> &str {
        match self {
            CalloutLabel::Summary => "SUMMARY",
            CalloutLabel::Insight => "KEY INSIGHT",
            CalloutLabel::Warning => "WARNING",
            CalloutLabel::Note => "NOTE",
            CalloutLabel::Other(label) => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callout {
    pub label: CalloutLabel,
    pub text: String,
}

/// Image payload: a filesystem-relative path or an inline base64 blob,
/// never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageSource {
    Path(String),
    Base64 { mime: String, data: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub alt: String,
    pub source: ImageSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatexBlock {
    pub source: String,
    /// true for `$$ … $$` display math, false for a standalone `$ … $` line.
    pub display: bool,
}

/// The tagged content of a document element. Renderers match exhaustively so
/// a new kind cannot be silently unrendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Heading(Heading),
    Paragraph(Paragraph),
    BulletItem(ListItem),
    NumberedItem(NumberedItem),
    Table(Table),
    Callout(Callout),
    Image(ImageRef),
    Latex(LatexBlock),
    Separator,
}

/// One body element plus the raw source text it was built from, kept for
/// diagnostic fallback when a renderer cannot handle the structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub kind: ElementKind,
    pub raw: String,
}

impl Element {
    pub fn new(kind: ElementKind, raw: impl Into<String>) -> Self {
        Element {
            kind,
            raw: raw.into(),
        }
    }
}

/// The format-agnostic intermediate tree shared by all parsers and renderers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentModel {
    pub metadata: Metadata,
    pub elements: Vec<Element>,
}

/// Best-effort parse output: the model plus element-level diagnostics.
///
/// Parsers never fail on a single malformed block; they degrade it and push a
/// warning here instead.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub model: DocumentModel,
    pub warnings: Vec<String>,
}
