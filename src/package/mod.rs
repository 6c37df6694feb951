//! Package detection and structural validation.
//!
//! [`detect_and_validate`] is the first stage of an installation attempt. It
//! reads only as much of the file as needed to decide which container
//! format applies and whether the container is well formed. No temporary
//! state is created here.
//!
//! # Sub-modules
//!
//! - [`app_id`]: the validated application identifier.
//! - [`error`]: [`PackageError`].
//! - [`xpk`]: XPK signature section parsing.

pub mod app_id;
pub mod error;
mod wgt;
pub mod xpk;

use log::{debug, warn};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

pub use app_id::{AppId, AppIdError};
pub use error::PackageError;
pub use xpk::SignatureSection;

/// File extension used by XPK packages.
pub const XPK_EXTENSION: &str = "xpk";

/// File extension used by WGT packages.
pub const WGT_EXTENSION: &str = "wgt";

/// The container kind of a package, without format-specific data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// Signed zip with a JSON `manifest.json`.
    Xpk,
    /// Plain zip with an XML `config.xml`.
    Wgt,
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xpk => f.write_str(XPK_EXTENSION),
            Self::Wgt => f.write_str(WGT_EXTENSION),
        }
    }
}

/// The detected container format, carrying format-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageFormat {
    /// An XPK package and its parsed signature section.
    Xpk(SignatureSection),
    /// A WGT package.
    Wgt,
}

impl PackageFormat {
    /// Return the field-less kind of this format.
    #[must_use]
    pub fn kind(&self) -> PackageKind {
        match self {
            Self::Xpk(_) => PackageKind::Xpk,
            Self::Wgt => PackageKind::Wgt,
        }
    }
}

/// A detected package instance.
///
/// Handles produced by [`detect_and_validate`] are valid. Handles built with
/// [`PackageHandle::unvalidated`] are not, and extraction refuses them.
#[derive(Debug, Clone)]
pub struct PackageHandle {
    path: PathBuf,
    format: PackageFormat,
    valid: bool,
    id: Option<AppId>,
}

impl PackageHandle {
    /// Build a handle that has not been through structural validation.
    ///
    /// Useful when a handle is reconstructed from stored metadata. The
    /// handle carries no id and reports [`is_valid`](Self::is_valid) as
    /// `false`.
    #[must_use]
    pub fn unvalidated(path: impl Into<PathBuf>, format: PackageFormat) -> Self {
        Self {
            path: path.into(),
            format,
            valid: false,
            id: None,
        }
    }

    /// Return the package file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the detected format.
    #[must_use]
    pub fn format(&self) -> &PackageFormat {
        &self.format
    }

    /// Return the detected kind.
    #[must_use]
    pub fn kind(&self) -> PackageKind {
        self.format.kind()
    }

    /// Return whether the package passed structural validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Return the package id, if the format provides one before the
    /// manifest is read.
    ///
    /// XPK ids come from the embedded public key. WGT ids only become known
    /// once `config.xml` is parsed, so this is `None` for WGT handles.
    #[must_use]
    pub fn id(&self) -> Option<&AppId> {
        self.id.as_ref()
    }
}

/// Detect the format of the package at `path` and validate its structure.
///
/// # Errors
///
/// Returns [`PackageError::NotFound`] if `path` does not exist,
/// [`PackageError::UnrecognizedFormat`] if the file matches neither
/// signature, [`PackageError::Corrupt`] if the signature matches but the
/// container is malformed, and [`PackageError::Io`] if the file cannot be
/// read.
///
/// # Examples
///
/// ```no_run
/// use appkg::PackageKind;
/// use appkg::package::detect_and_validate;
///
/// let handle = detect_and_validate("hello.xpk".as_ref())?;
/// assert_eq!(handle.kind(), PackageKind::Xpk);
/// assert!(handle.id().is_some());
/// # Ok::<(), appkg::package::PackageError>(())
/// ```
pub fn detect_and_validate(path: &Path) -> Result<PackageHandle, PackageError> {
    let result = inspect(path);
    match &result {
        Ok(handle) => debug!(
            "validated {} package {} (id: {})",
            handle.kind(),
            path.display(),
            handle.id().map_or("pending manifest", AppId::as_str)
        ),
        Err(err) => warn!("rejected package: {err}"),
    }
    result
}

fn inspect(path: &Path) -> Result<PackageHandle, PackageError> {
    let io_err = |source: io::Error| PackageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if !path.try_exists().map_err(io_err)? {
        return Err(PackageError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let mut file = File::open(path).map_err(io_err)?;
    let file_len = file.metadata().map_err(io_err)?.len();

    let magic = read_magic(&mut file).map_err(io_err)?;
    file.rewind().map_err(io_err)?;

    let format = match magic {
        Some(xpk::XPK_MAGIC) => {
            let section = xpk::parse_signature_section(&mut file, file_len)
                .map_err(|reason| PackageError::corrupt(path, reason))?;
            PackageFormat::Xpk(section)
        }
        Some(xpk::ZIP_LOCAL_HEADER) if has_extension(path, XPK_EXTENSION) => {
            return Err(PackageError::corrupt(
                path,
                "XPK package has no signature section",
            ));
        }
        Some(xpk::ZIP_LOCAL_HEADER) => {
            wgt::check_zip_structure(&mut file)
                .map_err(|reason| PackageError::corrupt(path, reason))?;
            PackageFormat::Wgt
        }
        _ => {
            return Err(PackageError::UnrecognizedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    let id = match &format {
        PackageFormat::Xpk(section) => Some(AppId::from_public_key(section.public_key())),
        PackageFormat::Wgt => None,
    };

    Ok(PackageHandle {
        path: path.to_path_buf(),
        format,
        valid: true,
        id,
    })
}

/// Read the leading four bytes, or `None` if the file is shorter.
fn read_magic<R: Read>(reader: &mut R) -> io::Result<Option<[u8; 4]>> {
    let mut magic = [0u8; 4];
    match reader.read_exact(&mut magic) {
        Ok(()) => Ok(Some(magic)),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(err) => Err(err),
    }
}

fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected))
}

#[cfg(test)]
#[path = "package_tests.rs"]
mod tests;
