mod cli;
mod config;
mod qif;
mod runner;
mod telemetry;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::cli::{CliArgs, Command};

fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();
    let settings = config::load_settings(&cli)?;

    telemetry::init_logging(settings.level()).context("failed to initialize logging")?;
    info!(config = %cli.config.display(), ?settings, "Configuration loaded");

    match &cli.command {
        Command::Decode { input, output } => {
            let summary = runner::decode_file(input, output, &settings)?;
            println!("{} streams read", summary.header_blocks);
        }
        Command::Encode { input, output } => {
            let blocks = runner::encode_file(input, output)?;
            println!("{} streams written", blocks);
        }
    }

    Ok(())
}
