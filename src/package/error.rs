//! Error types for package detection and structural validation.

use std::path::PathBuf;

/// Errors arising while detecting or validating a package file.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// The package path does not exist.
    #[error("package not found: {}", path.display())]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The file matches neither the XPK nor the WGT signature.
    #[error("unrecognised package format: {}", path.display())]
    UnrecognizedFormat {
        /// The inspected file.
        path: PathBuf,
    },

    /// The file claims a supported format but its structure is malformed.
    #[error("package {} is corrupt: {reason}", path.display())]
    Corrupt {
        /// The inspected file.
        path: PathBuf,
        /// Description of the structural defect.
        reason: String,
    },

    /// The package exists but could not be read.
    #[error("failed to read package {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl PackageError {
    pub(crate) fn corrupt(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
