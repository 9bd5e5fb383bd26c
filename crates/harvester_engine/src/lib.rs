//! Harvester engine: checkpointed term enumeration, search, graph insertion and retry supervision.
mod body;
mod checkpoint;
mod enumerator;
mod failure_log;
mod graph;
mod persist;
mod pipeline;
mod search;
mod sink;
mod supervisor;
mod terms;
mod throttle;

pub use checkpoint::{CheckpointError, CheckpointStore, FileCheckpointStore};
pub use enumerator::TermEnumerator;
pub use failure_log::{format_entry, FailureLog};
pub use graph::GraphSchema;
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use pipeline::{HarvestError, HarvestPipeline, Harvested, PipelineSettings};
pub use search::{parse_medline, PubMedClient, PubMedSettings, SearchClient, SearchError};
pub use sink::{
    merge_statement, Entity, GraphSnapshot, InsertError, InsertionSink, MemoryGraph,
    Neo4jSettings, Neo4jSink, PropertyValue, StoredNode,
};
pub use supervisor::{
    AttemptError, RetrySupervisor, RunStats, SupervisorReport, SupervisorSettings,
};
pub use terms::{parse_term_list, CategorySpec, FileTermSource, TermCategory, TermSource, TermSourceError};
pub use throttle::Throttle;
