//! TreeScope: show where the bytes are in a directory tree.
//!
//! Thin binary entry point. All logic lives in the `treescope-core`
//! and `treescope-cli` crates.

use clap::Parser;
use std::process::ExitCode;
use treescope_cli::{exit, logging, Args};

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.log_level());

    tracing::debug!("TreeScope starting");

    match treescope_cli::run(&args) {
        Ok(()) => ExitCode::from(exit::OK),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit::for_error(&err))
        }
    }
}
