mod cli;
mod config;
mod logging;
mod run;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use engine_logging::engine_error;

use crate::cli::Cli;
use crate::config::HarvestConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.verbose, cli.log_file.as_deref());

    match try_main(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            engine_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> Result<bool> {
    let config = HarvestConfig::load(&cli.config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let report = runtime.block_on(run::harvest(cli, &config))?;
    println!(
        "attempts: {} searches: {} insertions: {}",
        report.stats.attempts, report.stats.searches, report.stats.insertions
    );
    Ok(report.is_done())
}
