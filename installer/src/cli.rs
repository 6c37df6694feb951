//! CLI argument definitions for the appkg installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use appkg::SourceType;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use log::LevelFilter;

/// Inspect and install XPK and WGT application packages.
#[derive(Parser, Debug)]
#[command(name = "appkg-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Inspect and install XPK and WGT application packages.\n\n",
    "Packages are validated without unpacking, then extracted into a private ",
    "temporary directory, their manifest is loaded and checked, and the ",
    "resulting application descriptor is reported. With --dest the unpacked ",
    "tree is kept under DEST/<application id>; otherwise it is deleted.",
))]
#[command(after_help = concat!(
    "CONFIGURATION:\n",
    "  Defaults are read from appkg.toml in the platform configuration\n",
    "  directory, or from the file given with --config. Recognised keys:\n",
    "  temp_dir, install_dir, source_type, quiet. Flags override the file.\n\n",
    "EXAMPLES:\n",
    "  Show the format and id of a package:\n",
    "    $ appkg-installer inspect hello.xpk\n\n",
    "  Validate and load a widget, printing the descriptor as JSON:\n",
    "    $ appkg-installer install hello.wgt --json\n\n",
    "  Install into a directory under an explicit id:\n",
    "    $ appkg-installer install hello.wgt --id my.hello --dest ~/apps",
))]
pub struct Cli {
    /// Read defaults from this TOML file instead of the platform location.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Detect and validate a package without unpacking it.
    Inspect(InspectArgs),

    /// Run the full ingestion pipeline on a package.
    Install(InstallArgs),
}

/// Arguments for the inspect command.
#[derive(Parser, Debug, Clone, Default)]
pub struct InspectArgs {
    /// Package file to inspect.
    #[arg(value_name = "PACKAGE")]
    pub package: Utf8PathBuf,

    /// Output in JSON format for scripting.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the install command.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Package file to install.
    #[arg(value_name = "PACKAGE")]
    pub package: Utf8PathBuf,

    /// Application id overriding the one derived from the package.
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    /// Origin recorded on the application: internal, external or command-line.
    #[arg(long, value_name = "TYPE")]
    pub source_type: Option<SourceType>,

    /// Directory in which the temporary extraction directory is created.
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<Utf8PathBuf>,

    /// Keep the extracted tree under DIR/<application id>.
    #[arg(long, value_name = "DIR")]
    pub dest: Option<Utf8PathBuf>,

    /// Print the application descriptor as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output and warnings (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Log level implied by the command's verbosity flags.
    ///
    /// `RUST_LOG` still takes precedence when the logger is initialised.
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        match &self.command {
            Command::Install(args) => level_for(args.verbosity, args.quiet),
            Command::Inspect(_) => level_for(0, false),
        }
    }
}

fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
