use std::env;

use anyhow::{Context, Result};
use engine_logging::{engine_info, engine_warn};
use harvester_core::RecordFilter;
use harvester_engine::{
    FailureLog, FileCheckpointStore, FileTermSource, MemoryGraph, Neo4jSink,
    PubMedClient, RetrySupervisor, SupervisorReport,
};

use crate::cli::Cli;
use crate::config::HarvestConfig;

/// Builds every component from the configuration and runs the supervisor to completion.
pub async fn harvest(cli: &Cli, config: &HarvestConfig) -> Result<SupervisorReport> {
    let terms = FileTermSource::new(config.category_specs()?);
    let store = FileCheckpointStore::new(&config.checkpoint_path);
    let search =
        PubMedClient::new(config.pubmed_settings()).context("failed to build search client")?;
    let failure_log = FailureLog::new(&config.error_log_path);
    let filter = RecordFilter::new(config.filter_settings());
    let settings = config.supervisor_settings(cli.reset);

    if cli.dry_run {
        engine_info!("Dry run: inserting into an in-memory graph");
        let graph = MemoryGraph::new();
        let report = RetrySupervisor::new(
            &terms,
            &store,
            &search,
            &graph,
            failure_log,
            config.graph_schema(),
            filter,
            settings,
        )
        .run()
        .await;
        println!(
            "dry run: {} nodes, {} relationships",
            graph.node_count(),
            graph.relationship_count()
        );
        return Ok(report);
    }

    let password = env::var(&config.graph.password_env).ok();
    if password.is_none() {
        engine_warn!(
            "{} is not set, connecting to Neo4j without a password",
            config.graph.password_env
        );
    }
    let graph = Neo4jSink::new(config.neo4j_settings(password))
        .context("failed to build Neo4j client")?;
    engine_info!("Inserting into {}", graph.endpoint());
    Ok(RetrySupervisor::new(
        &terms,
        &store,
        &search,
        &graph,
        failure_log,
        config.graph_schema(),
        filter,
        settings,
    )
    .run()
    .await)
}
