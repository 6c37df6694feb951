//! Manifest loading from an extracted package tree.
//!
//! XPK packages carry a JSON `manifest.json`; WGT packages carry an XML
//! `config.xml`. Both are normalised into a [`ManifestDocument`] so the
//! rest of the pipeline never sees the on-disk format.

mod document;
mod json;
mod widget;

pub use document::ManifestDocument;
pub use json::MANIFEST_FILENAME;
pub use widget::{
    APPLICATION_ID_KEY, CONFIG_XML_FILENAME, IDENTITY_ATTRIBUTE, PACKAGE_ID_KEY,
    REQUIRED_ATTRIBUTES,
};

use crate::package::PackageKind;
use log::debug;
use std::path::{Path, PathBuf};

/// Errors arising from manifest loading.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest file is absent, unreadable, or not a mapping.
    #[error("manifest {} is unreadable: {reason}", path.display())]
    Unreadable {
        /// The manifest path that was tried.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The manifest exists but is syntactically or structurally invalid.
    #[error("manifest parse error: {0}")]
    ParseError(String),
}

/// Load the manifest of the package extracted under `root`.
///
/// # Errors
///
/// Returns [`ManifestError::Unreadable`] if the manifest file is missing
/// or cannot be read, and [`ManifestError::ParseError`] if its contents
/// are malformed.
///
/// # Examples
///
/// ```no_run
/// use appkg::manifest::load_manifest;
/// use appkg::package::PackageKind;
/// use std::path::Path;
///
/// let doc = load_manifest(Path::new("/tmp/appkg-abc123"), PackageKind::Xpk)?;
/// println!("{:?}", doc.get_str("name"));
/// # Ok::<(), appkg::manifest::ManifestError>(())
/// ```
pub fn load_manifest(root: &Path, kind: PackageKind) -> Result<ManifestDocument, ManifestError> {
    debug!("loading {kind} manifest from {}", root.display());
    match kind {
        PackageKind::Xpk => json::load(root),
        PackageKind::Wgt => widget::load(root),
    }
}

fn read_manifest_file(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|err| ManifestError::Unreadable {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}
