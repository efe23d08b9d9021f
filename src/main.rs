//! bpmn-print CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, convert the
//! input folder and exit with an appropriate status. For programmatic use,
//! prefer the library API (`bpmn_print::api`).

use std::process::ExitCode;

use clap::Parser;

mod cli;

fn main() -> ExitCode {
    let args = cli::CliArgs::parse();
    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
