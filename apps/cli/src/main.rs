//! worklog CLI: daily work logs with weekly and monthly LLM rollups.
//!
//! Records daily logs into a local libSQL database and summarizes them into
//! weekly achievements and monthly highlights that link back to their sources.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
