//! Logger setup for the harvester binary.
//!
//! Logs go to the terminal, and additionally to a file when one is given.

use std::path::Path;

use engine_logging::LogDestination;
use log::LevelFilter;

pub fn level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

pub fn destination(log_file: Option<&Path>) -> LogDestination {
    match log_file {
        Some(path) => LogDestination::Both(path.to_path_buf()),
        None => LogDestination::Terminal,
    }
}

pub fn initialize(verbose: bool, log_file: Option<&Path>) {
    engine_logging::initialize(destination(log_file), level(verbose));
}
