//! File I/O operations and validation
//!
//! This module handles encoding-fallback text reads, Word container
//! validation, and the retried output write used when a destination file is
//! locked by another process (a common state while a report is open in Word).

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Decode attempts, in order. Legacy Korean exports still ship EUC-KR/CP949;
/// the WHATWG "euc-kr" decoder is the windows-949 superset, so one attempt
/// covers both labels.
const FALLBACK_ENCODINGS: [&str; 2] = ["utf-8", "euc-kr/cp949"];

/// Read a markup file, falling back through legacy encodings.
///
/// A UTF-8 BOM is stripped. Exhausting the chain is fatal; a failed attempt
/// just moves on to the next encoding.
pub fn read_text_with_fallback(path: &Path) -> Result<String> {
    let raw = std::fs::read(path)?;
    decode_with_fallback(&raw).ok_or_else(|| Error::Encoding {
        path: path.to_path_buf(),
        tried: FALLBACK_ENCODINGS.to_vec(),
    })
}

/// Decode bytes through the fallback chain. Returns `None` when every
/// encoding either errors or maps bytes to replacement characters.
pub fn decode_with_fallback(raw: &[u8]) -> Option<String> {
    let raw = raw.strip_prefix(b"\xef\xbb\xbf").unwrap_or(raw);

    if let Ok(text) = std::str::from_utf8(raw) {
        return Some(text.to_string());
    }

    let (decoded, _, had_errors) = encoding_rs::EUC_KR.decode(raw);
    if !had_errors {
        return Some(decoded.into_owned());
    }

    None
}

/// Validates that the file is a legitimate .docx container.
pub fn validate_docx_container(path: &Path) -> Result<()> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    if extension != "docx" {
        return Err(Error::InvalidContainer(format!(
            "expected a .docx file, got .{extension} (not .doc, .xlsx, .zip, etc.)"
        )));
    }

    let file = File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| Error::InvalidContainer(e.to_string()))?;

    if archive.by_name("word/document.xml").is_err() {
        if archive.by_name("xl/workbook.xml").is_ok() {
            return Err(Error::InvalidContainer(
                "this appears to be an Excel file (.xlsx); only Word documents are supported"
                    .to_string(),
            ));
        }

        return Err(Error::InvalidContainer(
            "missing word/document.xml; the file may be corrupted or is not a Word document"
                .to_string(),
        ));
    }

    Ok(())
}

/// Read a named entry from the .docx zip container, if present.
pub fn read_container_entry(path: &Path, name: &str) -> Result<Option<String>> {
    let file = File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| Error::InvalidContainer(e.to_string()))?;

    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(_) => return Ok(None),
    };

    let mut content = String::new();
    std::io::Read::read_to_string(&mut entry, &mut content)?;
    Ok(Some(content))
}

/// Write output bytes, retrying once with a timestamp-suffixed name when the
/// destination is locked or permission-denied.
///
/// Returns the path actually written.
pub fn write_output_with_retry(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    match try_write(path, bytes) {
        Ok(()) => Ok(path.to_path_buf()),
        Err(first_err) => {
            let retry_path = timestamped_path(path);
            log::warn!(
                "write to {} failed ({first_err}); retrying as {}",
                path.display(),
                retry_path.display()
            );
            match try_write(&retry_path, bytes) {
                Ok(()) => Ok(retry_path),
                Err(_) => Err(Error::OutputUnwritable {
                    path: path.to_path_buf(),
                    reason: first_err.to_string(),
                }),
            }
        }
    }
}

fn try_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)
}

fn timestamped_path(path: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("out");
    path.with_file_name(format!("{stem}_{stamp}.{extension}"))
}
