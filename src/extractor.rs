//! Package extraction into an isolated temporary directory.
//!
//! Packages are never unpacked in place. Each extraction gets a fresh,
//! uniquely named directory under the temp root, owned by an
//! [`ExtractionRoot`] that deletes it when dropped. The caller can then
//! promote the tree with [`ExtractionRoot::persist`] or simply let it go.

use crate::package::PackageHandle;
use crate::unzip::{UnzipError, Unzipper};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix of every extraction directory name.
const EXTRACTION_PREFIX: &str = "appkg-";

/// Errors arising from package extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The handle did not pass structural validation.
    #[error("refusing to extract unvalidated package {}", path.display())]
    InvalidPackage {
        /// The package path carried by the handle.
        path: PathBuf,
    },

    /// No usable temporary-storage root exists.
    #[error("temporary directory root unavailable: {reason}")]
    NoTempRoot {
        /// Description of why the root is unusable.
        reason: String,
    },

    /// The extraction directory could not be created.
    #[error("failed to create extraction directory under {}: {source}", root.display())]
    DirCreateFailed {
        /// The temp root the directory was created under.
        root: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Decompression failed; the partial tree has been removed.
    #[error("failed to unpack {}: {source}", path.display())]
    UnzipFailed {
        /// The package being unpacked.
        path: PathBuf,
        /// The decompression error.
        #[source]
        source: UnzipError,
    },
}

/// An exclusively owned temporary directory holding one unpacked package.
///
/// Dropping the root deletes the directory and everything beneath it.
#[derive(Debug)]
pub struct ExtractionRoot {
    dir: TempDir,
}

impl ExtractionRoot {
    /// Return the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Move the extracted tree to `dest` and give up the deletion duty.
    ///
    /// `dest` must not exist yet. Its parent must exist and sit on the same
    /// filesystem as the temp root, because the move is a single rename.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if `dest` already exists or the rename
    /// fails. The error hands the root back, still owning its tree.
    pub fn persist(self, dest: &Path) -> Result<PathBuf, PersistError> {
        if dest.exists() {
            let source = io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", dest.display()),
            );
            return Err(PersistError { root: self, source });
        }
        if let Err(source) = fs::rename(self.dir.path(), dest) {
            return Err(PersistError { root: self, source });
        }
        // Disarm the guard without touching the old path.
        let _moved_from = self.dir.keep();
        Ok(dest.to_path_buf())
    }

    /// Delete the directory now, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while removing the tree.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}

/// Failure to promote an [`ExtractionRoot`].
///
/// The root is handed back so the caller decides whether to retry
/// elsewhere or drop it.
#[derive(Debug, thiserror::Error)]
#[error("failed to persist {}: {source}", root.path().display())]
pub struct PersistError {
    /// The root that could not be moved; still owns its directory.
    pub root: ExtractionRoot,
    /// The underlying I/O error.
    #[source]
    pub source: io::Error,
}

/// Unpacks validated packages into fresh temporary directories.
pub struct Extractor<'a> {
    unzipper: &'a dyn Unzipper,
    temp_root: Option<PathBuf>,
}

impl<'a> Extractor<'a> {
    /// Create an extractor that uses the system temp directory.
    #[must_use]
    pub fn new(unzipper: &'a dyn Unzipper) -> Self {
        Self {
            unzipper,
            temp_root: None,
        }
    }

    /// Create an extractor that allocates directories under `temp_root`.
    #[must_use]
    pub fn with_temp_root(unzipper: &'a dyn Unzipper, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            unzipper,
            temp_root: Some(temp_root.into()),
        }
    }

    /// Unpack `handle` into a new [`ExtractionRoot`].
    ///
    /// # Errors
    ///
    /// - [`ExtractError::InvalidPackage`] if the handle is not valid. The
    ///   filesystem is not touched.
    /// - [`ExtractError::NoTempRoot`] if the temp root is unusable.
    /// - [`ExtractError::DirCreateFailed`] if the directory cannot be
    ///   created.
    /// - [`ExtractError::UnzipFailed`] if decompression fails. The partially
    ///   filled directory is removed first.
    pub fn extract(&self, handle: &PackageHandle) -> Result<ExtractionRoot, ExtractError> {
        if !handle.is_valid() {
            return Err(ExtractError::InvalidPackage {
                path: handle.path().to_path_buf(),
            });
        }

        let root = self.resolve_temp_root()?;
        let dir = tempfile::Builder::new()
            .prefix(EXTRACTION_PREFIX)
            .tempdir_in(&root)
            .map_err(|source| ExtractError::DirCreateFailed {
                root: root.clone(),
                source,
            })?;
        debug!(
            "extracting {} into {}",
            handle.path().display(),
            dir.path().display()
        );

        if let Err(source) = self.unzipper.unzip(handle.path(), dir.path()) {
            let partial = dir.path().to_path_buf();
            if let Err(cleanup) = dir.close() {
                warn!(
                    "failed to remove partial extraction {}: {cleanup}",
                    partial.display()
                );
            }
            return Err(ExtractError::UnzipFailed {
                path: handle.path().to_path_buf(),
                source,
            });
        }

        Ok(ExtractionRoot { dir })
    }

    fn resolve_temp_root(&self) -> Result<PathBuf, ExtractError> {
        let root = self.temp_root.clone().unwrap_or_else(std::env::temp_dir);
        if root.as_os_str().is_empty() {
            return Err(ExtractError::NoTempRoot {
                reason: "temp root path is empty".to_owned(),
            });
        }
        if !root.is_dir() {
            return Err(ExtractError::NoTempRoot {
                reason: format!("{} is not an existing directory", root.display()),
            });
        }
        Ok(root)
    }
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
