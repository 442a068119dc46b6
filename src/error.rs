//! Error types for the mdox library.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for mdox operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error categories. Element-level problems never surface here; parsers
/// degrade those to plain paragraphs and record warnings instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// None of the fallback encodings could decode the input.
    #[error("failed to decode {}: tried {tried:?}", path.display())]
    Encoding { path: PathBuf, tried: Vec<&'static str> },

    /// The file is not a valid Word document container.
    #[error("invalid document container: {0}")]
    InvalidContainer(String),

    /// The output path stayed unwritable after the retry.
    #[error("could not write output {}: {reason}", path.display())]
    OutputUnwritable { path: PathBuf, reason: String },

    /// A configuration value is outside its allowed set.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
