use std::path::PathBuf;

use clap::Parser;

/// Harvests PubMed articles for curated neuroscience terms into a Neo4j graph.
#[derive(Debug, Parser)]
#[command(name = "harvester", version, about)]
pub struct Cli {
    /// RON configuration file.
    #[arg(long, default_value = "harvester.ron")]
    pub config: PathBuf,

    /// Discard the term checkpoint before the first attempt.
    #[arg(long)]
    pub reset: bool,

    /// Insert into an in-memory graph instead of Neo4j and print a summary.
    #[arg(long)]
    pub dry_run: bool,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write the diagnostic log to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
