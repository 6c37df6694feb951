//! Error types for the appkg installer CLI.
//!
//! Each variant carries enough context to tell the user what to fix.
//! Pipeline failures are wrapped whole so their stage-specific messages
//! reach the terminal unchanged.

use appkg::package::AppIdError;
use appkg::pipeline::InstallError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while running the installer.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The configuration file exists but could not be read or parsed.
    #[error("invalid configuration file {path}: {reason}")]
    Config {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// A configuration file named with `--config` does not exist.
    #[error("configuration file {path} not found")]
    ConfigNotFound {
        /// The path given on the command line.
        path: Utf8PathBuf,
    },

    /// The `--id` value is not a valid application id.
    #[error(transparent)]
    InvalidId(#[from] AppIdError),

    /// The install destination for this application already exists.
    #[error("{path} already exists; remove it or choose another --dest")]
    TargetExists {
        /// The occupied destination.
        path: Utf8PathBuf,
    },

    /// The extracted tree could not be moved into the destination.
    #[error("failed to move application into {path}: {source}")]
    PersistFailed {
        /// The intended destination.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The ingestion pipeline failed.
    #[error(transparent)]
    Install(#[from] InstallError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
