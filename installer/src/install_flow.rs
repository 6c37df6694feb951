//! Command orchestration for the installer binary.
//!
//! These functions sit between the parsed [`Cli`] and the `appkg` pipeline.
//! They take their writers and directory lookup as parameters so tests can
//! capture output and point configuration at temporary directories.

use crate::cli::{Cli, Command, InspectArgs, InstallArgs};
use crate::config::{InstallSettings, InstallerConfig};
use crate::dirs::BaseDirs;
use crate::error::{InstallerError, Result};
use crate::output::{InspectReport, InstallReport, install_summary, write_json, write_stderr_line};
use appkg::package::detect_and_validate;
use appkg::pipeline::install_package_default;
use appkg::{AppId, ApplicationDescriptor, ExtractionRoot, InstallRequest};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::io::Write;

/// Execute the command selected on the command line.
///
/// # Errors
///
/// Returns the first failure of the selected command.
pub fn run(
    cli: &Cli,
    dirs: &dyn BaseDirs,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<()> {
    match &cli.command {
        Command::Inspect(args) => run_inspect(args, stdout, stderr),
        Command::Install(args) => {
            let config = InstallerConfig::load(cli.config.as_deref(), dirs)?;
            let settings = InstallSettings::resolve(args, &config);
            run_install(args, &settings, stdout, stderr)
        }
    }
}

/// Detect and validate a package, then describe it.
///
/// Text goes to stderr; `--json` writes the report to stdout instead.
///
/// # Errors
///
/// Returns [`InstallerError::Install`] when the package is rejected and
/// [`InstallerError::WriteFailed`] when the JSON report cannot be written.
pub fn run_inspect(
    args: &InspectArgs,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<()> {
    let handle = detect_and_validate(args.package.as_std_path())
        .map_err(|err| InstallerError::Install(err.into()))?;
    let report = InspectReport::from_handle(&args.package, &handle);

    if args.json {
        write_json(stdout, &report).map_err(|source| InstallerError::WriteFailed { source })
    } else {
        write_stderr_line(stderr, report.display_text());
        Ok(())
    }
}

/// Run the ingestion pipeline and report the resulting application.
///
/// # Errors
///
/// Returns [`InstallerError::InvalidId`] for a malformed `--id`, the
/// pipeline's error wrapped in [`InstallerError::Install`], and
/// [`InstallerError::TargetExists`] or [`InstallerError::PersistFailed`]
/// when the tree cannot be kept under the destination.
pub fn run_install(
    args: &InstallArgs,
    settings: &InstallSettings,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<()> {
    let explicit_id = args
        .id
        .as_deref()
        .map(AppId::try_from)
        .transpose()?;

    if !settings.quiet {
        write_stderr_line(stderr, format!("Installing {}...", args.package));
    }

    // Extracting beside the destination keeps the final move a same-device rename.
    if let Some(dest) = &settings.dest {
        std::fs::create_dir_all(dest)?;
    }
    let temp_root = settings.temp_dir.as_ref().or(settings.dest.as_ref());

    let request = InstallRequest {
        source_type: settings.source_type,
        explicit_id,
        temp_root: temp_root.map(|dir| dir.clone().into_std_path_buf()),
        cancel: None,
    };
    let installation = install_package_default(args.package.as_std_path(), &request)?;
    let (descriptor, root) = installation.into_parts();

    let location = match &settings.dest {
        Some(dest) => Some(keep_tree(root, dest, &descriptor)?),
        None => {
            debug!("discarding extracted tree at {}", root.path().display());
            root.close()?;
            None
        }
    };

    if args.json {
        let report = InstallReport {
            application: &descriptor,
            installed_to: location.as_deref(),
        };
        return write_json(stdout, &report)
            .map_err(|source| InstallerError::WriteFailed { source });
    }

    if !settings.quiet {
        write_stderr_line(stderr, install_summary(&descriptor, location.as_deref()));
    }
    Ok(())
}

/// Move the extracted tree to `dest/<id>` and return the final path.
fn keep_tree(
    root: ExtractionRoot,
    dest: &Utf8Path,
    descriptor: &ApplicationDescriptor,
) -> Result<Utf8PathBuf> {
    let target = dest.join(descriptor.id().as_str());
    if target.exists() {
        return Err(InstallerError::TargetExists { path: target });
    }

    match root.persist(target.as_std_path()) {
        Ok(_) => {
            debug!("kept application tree at {target}");
            Ok(target)
        }
        Err(err) if err.source.kind() == std::io::ErrorKind::AlreadyExists => {
            Err(InstallerError::TargetExists { path: target })
        }
        Err(err) => Err(InstallerError::PersistFailed {
            path: target,
            source: err.source,
        }),
    }
}

/// Map a run outcome to a process exit code, reporting any error.
#[must_use]
pub fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}

#[cfg(test)]
#[path = "install_flow_tests.rs"]
mod tests;
