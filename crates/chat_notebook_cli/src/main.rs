mod cli;
mod commands;
mod executors;

use anyhow::{Context, Result};
use chat_notebook::{init_logging, EnvConfig};
use clap::Parser;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EnvConfig::from_env();
    init_logging(&config, cli.verbose).context("failed to initialize logging")?;

    match cli.command {
        Commands::Export { log, out } => {
            let path = commands::export(&log, out.as_deref())?;
            println!("{}", path.display());
        }
        Commands::Import { notebook, log_out } => {
            let outcome = commands::import(&config, &notebook, log_out.as_deref())?;
            print!("{}", outcome.transcript);
        }
    }

    Ok(())
}
