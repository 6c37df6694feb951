//! End-to-end package ingestion.
//!
//! Runs validation, extraction, manifest loading and assembly in order.
//! A failure at any stage returns that stage's error, and no temporary
//! directory survives it.

use crate::application::{
    ApplicationDescriptor, AssembleError, HandlerRegistry, ManifestHandlerRegistry, SourceType,
    assemble,
};
use crate::extractor::{ExtractError, ExtractionRoot, Extractor};
use crate::manifest::{ManifestError, load_manifest};
use crate::package::{AppId, PackageError, PackageHandle, detect_and_validate};
use crate::unzip::{Unzipper, ZipUnzipper};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Errors arising from [`install_package`].
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// Detection or validation failed.
    #[error(transparent)]
    Package(#[from] PackageError),

    /// Extraction failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// The manifest could not be loaded.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The application could not be assembled.
    #[error(transparent)]
    Assemble(#[from] AssembleError),

    /// The cancellation flag was raised between stages.
    #[error("installation cancelled")]
    Cancelled,
}

/// Options for one installation attempt.
#[derive(Debug, Clone, Default)]
pub struct InstallRequest<'a> {
    /// Where the request came from.
    pub source_type: SourceType,
    /// Id that overrides any id derived from the package.
    pub explicit_id: Option<AppId>,
    /// Directory under which the extraction root is created.
    pub temp_root: Option<PathBuf>,
    /// Checked before every stage; raising it aborts the attempt.
    pub cancel: Option<&'a AtomicBool>,
}

impl InstallRequest<'_> {
    fn check_cancelled(&self, stage: &str) -> Result<(), InstallError> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::SeqCst) => {
                debug!("installation cancelled before {stage}");
                Err(InstallError::Cancelled)
            }
            _ => Ok(()),
        }
    }
}

/// A successfully ingested application and its extracted tree.
///
/// Dropping the installation deletes the tree unless it was persisted
/// through [`Installation::into_parts`] and [`ExtractionRoot::persist`].
#[derive(Debug)]
pub struct Installation {
    handle: PackageHandle,
    descriptor: ApplicationDescriptor,
    root: ExtractionRoot,
}

impl Installation {
    /// The validated package handle.
    #[must_use]
    pub fn handle(&self) -> &PackageHandle {
        &self.handle
    }

    /// The assembled application descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &ApplicationDescriptor {
        &self.descriptor
    }

    /// The extraction root holding the unpacked tree.
    #[must_use]
    pub fn root(&self) -> &ExtractionRoot {
        &self.root
    }

    /// Split into the descriptor and the extraction root.
    #[must_use]
    pub fn into_parts(self) -> (ApplicationDescriptor, ExtractionRoot) {
        (self.descriptor, self.root)
    }
}

/// Ingest the package at `path`.
///
/// # Errors
///
/// Returns the error of the first failing stage, or
/// [`InstallError::Cancelled`] if `request.cancel` is raised before a stage
/// starts.
pub fn install_package(
    path: &Path,
    request: &InstallRequest<'_>,
    unzipper: &dyn Unzipper,
    registry: &dyn ManifestHandlerRegistry,
) -> Result<Installation, InstallError> {
    request.check_cancelled("validation")?;
    let handle = detect_and_validate(path)?;

    request.check_cancelled("extraction")?;
    let extractor = match &request.temp_root {
        Some(temp_root) => Extractor::with_temp_root(unzipper, temp_root),
        None => Extractor::new(unzipper),
    };
    let root = extractor.extract(&handle)?;

    // From here on, an early return drops `root` and removes the tree.
    request.check_cancelled("manifest loading")?;
    let manifest = load_manifest(root.path(), handle.kind())?;

    request.check_cancelled("assembly")?;
    let descriptor = assemble(
        &handle,
        manifest,
        request.source_type,
        request.explicit_id.as_ref(),
        registry,
    )?;

    info!(
        "ingested {} package {} as {}",
        handle.kind(),
        path.display(),
        descriptor.id()
    );
    Ok(Installation {
        handle,
        descriptor,
        root,
    })
}

/// [`install_package`] with [`ZipUnzipper`] and the built-in handlers.
///
/// # Errors
///
/// As for [`install_package`].
///
/// # Examples
///
/// ```no_run
/// use appkg::pipeline::{InstallRequest, install_package_default};
/// use std::path::Path;
///
/// let installation = install_package_default(Path::new("hello.xpk"), &InstallRequest::default())?;
/// println!("installed {}", installation.descriptor().id());
/// # Ok::<(), appkg::pipeline::InstallError>(())
/// ```
pub fn install_package_default(
    path: &Path,
    request: &InstallRequest<'_>,
) -> Result<Installation, InstallError> {
    install_package(
        path,
        request,
        &ZipUnzipper,
        &HandlerRegistry::with_builtin_handlers(),
    )
}
