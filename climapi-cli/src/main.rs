//! Binary crate for the `climapi` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Resolving the backend base URL once at startup
//! - Human-friendly output formatting

use std::process::ExitCode;

use clap::Parser;

mod cli;
mod logging;
mod render;

#[tokio::main]
async fn main() -> ExitCode {
    let cmd = cli::Cli::parse();
    logging::init(cmd.verbose);

    // Only the outermost message is shown; causes go to the log.
    match cmd.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
