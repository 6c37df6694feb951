//! appkg installer CLI entrypoint.
//!
//! This binary validates, unpacks and loads XPK and WGT application
//! packages, reporting the resulting application on stderr or as JSON on
//! stdout.

use appkg_installer::cli::Cli;
use appkg_installer::dirs::SystemBaseDirs;
use appkg_installer::install_flow::{exit_code_for_run_result, run};
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &SystemBaseDirs, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
