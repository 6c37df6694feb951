//! Archive decompression collaborator.
//!
//! The extractor never decompresses anything itself. It hands the package
//! path and a destination directory to an [`Unzipper`]. [`ZipUnzipper`] is
//! the production implementation. Tests substitute mocks to simulate
//! failures part-way through an archive.

use std::fs;
use std::io;
use std::path::{Component, Path};

/// Trait for unpacking a package archive, enabling test mocking.
///
/// Implementations must treat the operation as all or nothing from the
/// caller's point of view: any error means the destination contents are
/// unusable. Cleaning the destination is the caller's job.
///
/// # Examples
///
/// ```
/// use appkg::unzip::ZipUnzipper;
///
/// let unzipper = ZipUnzipper;
/// // Use unzipper.unzip(package_path, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait Unzipper {
    /// Unpack the archive at `source` into the existing directory `dest`.
    ///
    /// # Errors
    ///
    /// Returns an [`UnzipError`] if any entry cannot be unpacked.
    fn unzip(&self, source: &Path, dest: &Path) -> Result<(), UnzipError>;
}

/// Errors arising from archive decompression.
#[derive(Debug, thiserror::Error)]
pub enum UnzipError {
    /// I/O error while reading the archive or writing an entry.
    #[error("unzip I/O error: {0}")]
    Io(#[from] io::Error),

    /// The zip container could not be read.
    #[error("invalid zip archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An entry name attempts to escape the destination directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry name.
        path: String,
    },
}

/// Default unzipper backed by the `zip` crate.
///
/// Works for both WGT files and XPK files. In an XPK the zip payload
/// follows the signature section, and the zip reader finds the payload
/// offset from the central directory. Entry names are checked before
/// anything is written, to guard against zip-slip.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipUnzipper;

impl Unzipper for ZipUnzipper {
    fn unzip(&self, source: &Path, dest: &Path) -> Result<(), UnzipError> {
        let file = fs::File::open(source)?;
        let mut archive = zip::ZipArchive::new(file)?;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            validate_entry_name(entry.name())?;
            let Some(relative) = entry.enclosed_name() else {
                return Err(UnzipError::PathTraversal {
                    path: entry.name().to_owned(),
                });
            };
            let target = dest.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = fs::File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
        }

        Ok(())
    }
}

/// Reject entry names that are absolute or contain `..` components.
fn validate_entry_name(name: &str) -> Result<(), UnzipError> {
    let path = Path::new(name);
    let escapes = path.is_absolute()
        || name.starts_with('/')
        || name.starts_with('\\')
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
    if escapes {
        return Err(UnzipError::PathTraversal {
            path: name.to_owned(),
        });
    }
    Ok(())
}
