//! Binary crate for the `arrivals` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments into an immutable query
//! - Human-friendly output formatting and colorization

use clap::Parser;

mod cli;
mod report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cmd = cli::Cli::parse();
    cmd.run().await
}
