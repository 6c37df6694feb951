//! Application descriptors and their assembly.
//!
//! [`assemble`] turns a validated package handle and its manifest into an
//! [`ApplicationDescriptor`], resolves the application id and runs the
//! injected [`ManifestHandlerRegistry`] over the result.

mod handler;

pub use handler::{
    HandlerRegistry, ManifestHandler, ManifestHandlerRegistry, NameHandler, VersionHandler,
};
#[cfg(test)]
pub use handler::MockManifestHandlerRegistry;

use crate::manifest::{ManifestDocument, PACKAGE_ID_KEY};
use crate::package::{AppId, AppIdError, PackageHandle, PackageKind};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where an installation request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    /// Bundled with the runtime.
    #[default]
    Internal,
    /// Installed by the user from outside the runtime.
    External,
    /// Loaded from a path given on the command line.
    CommandLine,
}

impl SourceType {
    /// The canonical textual form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::CommandLine => "command-line",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`SourceType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown source type `{0}` (expected internal, external or command-line)")]
pub struct ParseSourceTypeError(String);

impl FromStr for SourceType {
    type Err = ParseSourceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(Self::Internal),
            "external" => Ok(Self::External),
            "command-line" => Ok(Self::CommandLine),
            other => Err(ParseSourceTypeError(other.to_owned())),
        }
    }
}

/// A non-fatal finding raised while validating a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallWarning {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
}

impl InstallWarning {
    /// A warning not tied to a particular key.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: None,
        }
    }

    /// A warning about the manifest key `key`.
    #[must_use]
    pub fn for_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// The warning text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The manifest key concerned, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

impl fmt::Display for InstallWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{key}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// The in-memory record of an installable application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationDescriptor {
    id: AppId,
    kind: PackageKind,
    manifest: ManifestDocument,
    source_type: SourceType,
    warnings: Vec<InstallWarning>,
}

impl ApplicationDescriptor {
    /// Build a descriptor with no warnings.
    #[must_use]
    pub fn new(
        id: AppId,
        kind: PackageKind,
        manifest: ManifestDocument,
        source_type: SourceType,
    ) -> Self {
        Self {
            id,
            kind,
            manifest,
            source_type,
            warnings: Vec::new(),
        }
    }

    /// The resolved application id.
    #[must_use]
    pub fn id(&self) -> &AppId {
        &self.id
    }

    /// The package format the application came from.
    #[must_use]
    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    /// The normalised manifest.
    #[must_use]
    pub fn manifest(&self) -> &ManifestDocument {
        &self.manifest
    }

    /// Where the request came from.
    #[must_use]
    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    /// Warnings gathered during validation.
    #[must_use]
    pub fn warnings(&self) -> &[InstallWarning] {
        &self.warnings
    }

    /// The manifest `name`, if it is a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.manifest.get_str("name")
    }

    /// The manifest `version`, if it is a string.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.manifest.get_str("version")
    }
}

/// Errors arising from application assembly.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    /// No id was supplied, carried by the handle, or found in the manifest.
    #[error("no application id available")]
    MissingId,

    /// The manifest supplied an id that is not a valid application id.
    #[error("manifest id is invalid: {0}")]
    InvalidId(#[from] AppIdError),

    /// The handler registry rejected the manifest.
    #[error("manifest rejected: {0}")]
    ManifestInvalid(String),
}

/// Build an [`ApplicationDescriptor`] and validate it with `registry`.
///
/// The id is the first of: `explicit_id`, the id carried by `handle`, and,
/// for WGT packages only, the manifest's `package_id`. The registry is
/// called exactly once; its warnings are stored on the descriptor and
/// logged.
///
/// # Errors
///
/// - [`AssembleError::MissingId`] if no id source yields a value.
/// - [`AssembleError::InvalidId`] if the manifest id fails validation.
/// - [`AssembleError::ManifestInvalid`] if the registry rejects the
///   manifest.
pub fn assemble(
    handle: &PackageHandle,
    manifest: ManifestDocument,
    source_type: SourceType,
    explicit_id: Option<&AppId>,
    registry: &dyn ManifestHandlerRegistry,
) -> Result<ApplicationDescriptor, AssembleError> {
    let id = resolve_id(handle, &manifest, explicit_id)?;
    debug!("assembling application {id} from {}", handle.path().display());

    let mut descriptor = ApplicationDescriptor::new(id, handle.kind(), manifest, source_type);
    let warnings = registry
        .validate(&descriptor)
        .map_err(AssembleError::ManifestInvalid)?;

    if !warnings.is_empty() {
        for warning in &warnings {
            warn!("{}: {warning}", descriptor.id());
        }
        warn!(
            "application {} validated with {} warning(s)",
            descriptor.id(),
            warnings.len()
        );
    }
    descriptor.warnings = warnings;
    Ok(descriptor)
}

fn resolve_id(
    handle: &PackageHandle,
    manifest: &ManifestDocument,
    explicit_id: Option<&AppId>,
) -> Result<AppId, AssembleError> {
    if let Some(id) = explicit_id.or(handle.id()) {
        return Ok(id.clone());
    }
    match handle.kind() {
        PackageKind::Wgt => {
            let raw = manifest
                .get_str(PACKAGE_ID_KEY)
                .ok_or(AssembleError::MissingId)?;
            Ok(AppId::try_from(raw)?)
        }
        PackageKind::Xpk => Err(AssembleError::MissingId),
    }
}

#[cfg(test)]
#[path = "application_tests.rs"]
mod tests;
