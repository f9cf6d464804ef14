//! molcure binary
//!
//! Runs stereoisomer grouping (`flatten`), reference filtering (`filter`),
//! or a batch of runs declared in a configuration file (`batch`).

mod cli;
mod commands;
mod logging;

use clap::Parser;

use crate::cli::Cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_file.as_deref())?;

    commands::execute(&cli)
}
