//! WGT structural validation.
//!
//! A WGT package is a plain zip archive. Opening the central directory is
//! enough to catch truncated or garbled files without decompressing any
//! entry.

use std::io::{Read, Seek};

/// Check that `reader` holds a readable zip central directory.
///
/// Returns the number of entries on success, or a description of the
/// defect.
pub(crate) fn check_zip_structure<R: Read + Seek>(reader: R) -> Result<usize, String> {
    let archive = zip::ZipArchive::new(reader).map_err(|e| format!("unreadable zip: {e}"))?;
    if archive.is_empty() {
        return Err("zip archive has no entries".to_owned());
    }
    Ok(archive.len())
}
