//! Outbound document-writing contracts
//!
//! Styling and pagination belong to an external document-authoring library.
//! The engine only defines the narrow capabilities it hands a finished model
//! to, which keeps that library swappable and lets tests substitute fakes.

use crate::document::DocumentModel;
use crate::error::Result;

/// A writer that turns a finished model into rich-document bytes.
pub trait DocumentWriter {
    fn write_document(&mut self, model: &DocumentModel) -> Result<Vec<u8>>;
}

/// Optional renderer producing an image asset from an equation source.
/// Invoked per `Latex` element by writers that want rendered equations; the
/// engine itself never does equation layout.
pub trait EquationRenderer {
    fn render_png(&self, latex: &str) -> Result<Vec<u8>>;
}
