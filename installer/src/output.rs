//! Output formatting for the installer CLI.
//!
//! Text output goes to stderr as progress and summaries; JSON output goes
//! to stdout so it can be piped into other tools.

use appkg::package::PackageFormat;
use appkg::{ApplicationDescriptor, PackageHandle, PackageKind};
use camino::Utf8Path;
use serde::Serialize;
use std::io::Write;

/// Placeholder shown for WGT ids, which only exist once `config.xml` is read.
pub const PENDING_ID: &str = "pending manifest";

/// Result of `inspect`.
///
/// # Example
///
/// ```
/// use appkg_installer::output::InspectReport;
/// use appkg::PackageKind;
///
/// let report = InspectReport {
///     path: "hello.wgt".to_owned(),
///     format: PackageKind::Wgt,
///     id: None,
///     public_key_bytes: None,
///     signature_bytes: None,
/// };
///
/// assert!(report.display_text().contains("pending manifest"));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// The package path as given.
    pub path: String,
    /// Detected format.
    pub format: PackageKind,
    /// Id known before extraction, if any.
    pub id: Option<String>,
    /// Size of the embedded public key for XPK packages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_bytes: Option<usize>,
    /// Size of the embedded signature for XPK packages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_bytes: Option<usize>,
}

impl InspectReport {
    /// Build a report from a validated handle.
    #[must_use]
    pub fn from_handle(path: &Utf8Path, handle: &PackageHandle) -> Self {
        let (public_key_bytes, signature_bytes) = match handle.format() {
            PackageFormat::Xpk(section) => (
                Some(section.public_key().len()),
                Some(section.signature().len()),
            ),
            PackageFormat::Wgt => (None, None),
        };
        Self {
            path: path.to_string(),
            format: handle.kind(),
            id: handle.id().map(ToString::to_string),
            public_key_bytes,
            signature_bytes,
        }
    }

    /// Format the report for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let mut lines = vec![
            format!("Package: {}", self.path),
            format!("Format: {}", self.format),
            format!("Id: {}", self.id.as_deref().unwrap_or(PENDING_ID)),
        ];
        if let (Some(key), Some(sig)) = (self.public_key_bytes, self.signature_bytes) {
            lines.push(format!("Signature section: {key}-byte key, {sig}-byte signature"));
        }
        lines.join("\n")
    }
}

/// JSON document printed by `install --json`.
#[derive(Debug, Serialize)]
pub struct InstallReport<'a> {
    /// The assembled application.
    pub application: &'a ApplicationDescriptor,
    /// Where the tree was kept, if `--dest` was used.
    pub installed_to: Option<&'a Utf8Path>,
}

/// Format the human-readable summary of a completed install.
#[must_use]
pub fn install_summary(descriptor: &ApplicationDescriptor, location: Option<&Utf8Path>) -> String {
    let mut lines = vec![format!(
        "Loaded {} application {} ({} {})",
        descriptor.kind(),
        descriptor.id(),
        descriptor.name().unwrap_or("unnamed"),
        descriptor.version().unwrap_or("unversioned"),
    )];
    lines.push(format!("Source type: {}", descriptor.source_type()));

    if !descriptor.warnings().is_empty() {
        lines.push(format!("Warnings ({}):", descriptor.warnings().len()));
        for warning in descriptor.warnings() {
            lines.push(format!("  - {warning}"));
        }
    }

    match location {
        Some(path) => lines.push(format!("Installed to {path}")),
        None => lines.push("Extracted files discarded (no --dest given)".to_owned()),
    }
    lines.join("\n")
}

/// Write one line to `stderr`, ignoring failures.
///
/// Progress output is best effort; a closed stderr must not abort an
/// install.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Write `value` as pretty-printed JSON followed by a newline.
///
/// # Errors
///
/// Returns an I/O error if serialisation or the write fails.
pub fn write_json(stdout: &mut dyn Write, value: &impl Serialize) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *stdout, value)?;
    writeln!(stdout)
}
