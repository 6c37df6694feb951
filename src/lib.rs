//! Application-package ingestion.
//!
//! Takes an XPK or WGT archive from disk to an in-memory
//! [`ApplicationDescriptor`](application::ApplicationDescriptor):
//!
//! 1. [`package::detect_and_validate`] identifies the format and checks its
//!    structure without unpacking anything.
//! 2. [`extractor::Extractor`] unpacks it into a private temporary
//!    directory that is deleted on drop.
//! 3. [`manifest::load_manifest`] normalises `manifest.json` or
//!    `config.xml` into a [`ManifestDocument`](manifest::ManifestDocument).
//! 4. [`application::assemble`] resolves the application id and runs the
//!    manifest handler registry.
//!
//! [`pipeline::install_package`] chains the four stages.

pub mod application;
pub mod extractor;
pub mod manifest;
pub mod package;
pub mod pipeline;
pub mod unzip;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use application::{ApplicationDescriptor, InstallWarning, SourceType};
pub use extractor::{ExtractionRoot, Extractor};
pub use manifest::ManifestDocument;
pub use package::{AppId, PackageHandle, PackageKind};
pub use pipeline::{InstallError, InstallRequest, Installation, install_package};
