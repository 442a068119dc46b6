//! Word-document parsing
//!
//! This module walks the external library's in-memory object tree for an
//! opened document and maps it onto the document intermediate representation.
//! Body children are processed in document order so paragraphs and tables
//! stay interleaved exactly as authored.

pub mod formatting;
pub mod loader;
pub mod properties;
pub mod styles;
pub mod table;
pub mod writer;

pub use loader::{load_document, parse_docx, DocxParseOptions};
pub use writer::{DocumentWriter, EquationRenderer};
