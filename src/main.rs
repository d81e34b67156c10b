//! ArtifactSweep: finds and force-deletes Visual Studio build artifacts.
//!
//! Thin binary entry point. All logic lives in the `artifactsweep-core`
//! and `artifactsweep-console` crates.

use artifactsweep_console::{prompt, Args};
use clap::Parser;
use std::io;
use std::process::ExitCode;

/// Exit code for errors that stop the run before or outside deletion.
const FATAL_EXIT_CODE: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so they never interleave with the listing on stdout.
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    tracing::info!("ArtifactSweep starting");

    let code = match artifactsweep_console::run(&args) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(FATAL_EXIT_CODE)
        }
    };

    if args.pause {
        if let Err(err) = prompt::wait_for_enter(&mut io::stdin().lock(), &mut io::stdout()) {
            tracing::warn!("pause failed: {err}");
        }
    }

    code
}
