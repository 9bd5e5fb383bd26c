mod common;

use std::fs;
use std::sync::Mutex;

use async_trait::async_trait;

use common::{category, init_logging, record, MemoryStore, ScriptedSearch, StaticTerms};
use harvester_core::{FailureKind, RecordFilter, SupervisorOutcome};
use harvester_engine::{
    Entity, FailureLog, GraphSchema, InsertError, InsertionSink, MemoryGraph, PipelineSettings,
    RetrySupervisor, SupervisorReport, SupervisorSettings, Throttle,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn settings(max_attempts: u32, reset: bool) -> SupervisorSettings {
    SupervisorSettings {
        max_attempts,
        retry_delay: Throttle::none(),
        insert_throttle: Throttle::none(),
        reset,
        pipeline: PipelineSettings::default(),
    }
}

async fn run(
    terms: &StaticTerms,
    store: &MemoryStore,
    search: &ScriptedSearch,
    graph: &MemoryGraph,
    log: &FailureLog,
    settings: SupervisorSettings,
) -> SupervisorReport {
    RetrySupervisor::new(
        terms,
        store,
        search,
        graph,
        log.clone(),
        GraphSchema::default(),
        RecordFilter::default(),
        settings,
    )
    .run()
    .await
}

fn log_lines(log: &FailureLog) -> Vec<String> {
    fs::read_to_string(log.path())
        .map(|content| content.lines().map(ToOwned::to_owned).collect())
        .unwrap_or_default()
}

/// Graph that rejects the first merge of one article, then behaves like `MemoryGraph`.
struct FlakyGraph {
    graph: MemoryGraph,
    failing_article: String,
    failed: Mutex<bool>,
}

impl FlakyGraph {
    fn failing_once_on(article: &str) -> Self {
        Self {
            graph: MemoryGraph::new(),
            failing_article: article.to_string(),
            failed: Mutex::new(false),
        }
    }
}

#[async_trait]
impl InsertionSink for FlakyGraph {
    async fn merge_relationship(
        &self,
        source: &Entity,
        relationship: &str,
        target: &Entity,
    ) -> Result<(), InsertError> {
        {
            let mut failed = self.failed.lock().unwrap();
            if !*failed && source.key_value() == self.failing_article {
                *failed = true;
                return Err(InsertError::HttpStatus(503));
            }
        }
        self.graph
            .merge_relationship(source, relationship, target)
            .await
    }
}

fn alpha_beta() -> StaticTerms {
    StaticTerms(vec![category(&["function"], &["alpha", "beta"])])
}

#[tokio::test]
async fn clean_run_inserts_eligible_records_and_commits_every_term() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let log = FailureLog::new(temp.path().join("errors.txt"));
    let terms = alpha_beta();
    let store = MemoryStore::default();
    let search = ScriptedSearch::new().with_results("alpha", vec![record("11", Some("X123"))]);
    let graph = MemoryGraph::new();

    let report = run(&terms, &store, &search, &graph, &log, settings(10, false)).await;

    assert_eq!(report.outcome, SupervisorOutcome::Done { attempts: 1 });
    assert_eq!(report.stats.insertions, 1);
    assert_eq!(report.stats.searches, 2);
    assert_eq!(graph.relationship_count(), 1);
    assert!(graph.has_relationship(("article", "X123"), "ARTICLE_OF", ("function", "alpha")));
    assert_eq!(graph.node("function", "beta"), None);
    assert_eq!(store.saved_values(), vec!["alpha", "beta"]);
    assert!(log_lines(&log).is_empty());
}

#[tokio::test]
async fn resumed_run_skips_checkpointed_terms() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let log = FailureLog::new(temp.path().join("errors.txt"));
    let terms = alpha_beta();
    let store = MemoryStore::with(&["alpha"]);
    let search = ScriptedSearch::new().with_results("alpha", vec![record("11", Some("X123"))]);
    let graph = MemoryGraph::new();

    let report = run(&terms, &store, &search, &graph, &log, settings(10, false)).await;

    assert!(report.is_done());
    assert_eq!(search.searched_terms(), vec!["beta"]);
    assert_eq!(graph.relationship_count(), 0);
}

#[tokio::test]
async fn failure_mid_run_is_logged_and_resumed_from_the_failed_term() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let log = FailureLog::new(temp.path().join("errors.txt"));
    let terms = StaticTerms(vec![category(&["function"], &["one", "two", "three"])]);
    let store = MemoryStore::default();
    let search = ScriptedSearch::new()
        .with_results("one", vec![record("1", Some("PMC1"))])
        .with_results("two", vec![record("2", Some("PMC2"))])
        .with_results("three", vec![record("3", Some("PMC3"))])
        .failing_on("two", 1);
    let graph = MemoryGraph::new();

    let report = run(&terms, &store, &search, &graph, &log, settings(10, false)).await;

    assert_eq!(report.outcome, SupervisorOutcome::Done { attempts: 2 });
    assert_eq!(log_lines(&log).len(), 1);
    assert!(log_lines(&log)[0].ends_with(" :\tsearch failure: search service returned http status 503"));
    assert_eq!(search.searched_terms(), vec!["one", "two", "two", "three"]);
    // the checkpoint after the failed attempt held only the first term
    let history = store.history();
    assert_eq!(history[0].iter().collect::<Vec<_>>(), vec!["one"]);
    assert_eq!(store.saved_values(), vec!["one", "three", "two"]);
    assert_eq!(graph.relationship_count(), 3);
}

#[tokio::test]
async fn always_failing_search_exhausts_the_retry_bound() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let log = FailureLog::new(temp.path().join("errors.txt"));
    let terms = alpha_beta();
    let store = MemoryStore::default();
    let search = ScriptedSearch::always_failing();
    let graph = MemoryGraph::new();

    let report = run(&terms, &store, &search, &graph, &log, settings(4, false)).await;

    match &report.outcome {
        SupervisorOutcome::Exhausted {
            failures,
            last_failure,
        } => {
            assert_eq!(*failures, 4);
            assert_eq!(last_failure.as_ref().unwrap().kind, FailureKind::Search);
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert_eq!(report.stats.attempts, 4);
    assert_eq!(search.searched_terms().len(), 4);
    assert_eq!(log_lines(&log).len(), 4);
    assert_eq!(store.saved(), None);
}

#[tokio::test]
async fn re_running_a_term_does_not_duplicate_graph_entries() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let log = FailureLog::new(temp.path().join("errors.txt"));
    let terms = alpha_beta();
    let search = ScriptedSearch::new().with_results(
        "alpha",
        vec![record("11", Some("X123")), record("12", Some("X124"))],
    );
    let graph = MemoryGraph::new();

    let first = MemoryStore::default();
    run(&terms, &first, &search, &graph, &log, settings(10, false)).await;
    let after_first = graph.snapshot();

    let second = MemoryStore::default();
    run(&terms, &second, &search, &graph, &log, settings(10, false)).await;

    assert_eq!(graph.snapshot(), after_first);
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.relationship_count(), 2);
}

#[tokio::test]
async fn reset_only_applies_to_the_first_attempt() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let log = FailureLog::new(temp.path().join("errors.txt"));
    let terms = StaticTerms(vec![category(&["function"], &["alpha", "beta", "gamma"])]);
    let store = MemoryStore::with(&["alpha", "beta", "gamma"]);
    let search = ScriptedSearch::new().failing_on("beta", 1);
    let graph = MemoryGraph::new();

    let report = run(&terms, &store, &search, &graph, &log, settings(10, true)).await;

    assert!(report.is_done());
    // attempt 1 (reset) searched alpha and failed on beta; attempt 2 resumed at beta
    assert_eq!(search.searched_terms(), vec!["alpha", "beta", "beta", "gamma"]);
}

#[tokio::test]
async fn term_source_failures_are_not_retried() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let log = FailureLog::new(temp.path().join("errors.txt"));
    let terms = harvester_engine::FileTermSource::new(vec![harvester_engine::CategorySpec {
        labels: harvester_core::TermLabels::new(["function"]).unwrap(),
        path: temp.path().join("missing.txt"),
    }]);
    let store = MemoryStore::default();
    let search = ScriptedSearch::new();
    let graph = MemoryGraph::new();

    let report = RetrySupervisor::new(
        &terms,
        &store,
        &search,
        &graph,
        log.clone(),
        GraphSchema::default(),
        RecordFilter::default(),
        settings(10, false),
    )
    .run()
    .await;

    assert!(!report.is_done());
    assert_eq!(report.stats.attempts, 1);
    assert_eq!(log_lines(&log).len(), 1);
    assert!(log_lines(&log)[0].contains("term source failure"));
}

#[tokio::test]
async fn memory_graph_merge_is_idempotent() {
    let graph = MemoryGraph::new();
    let article = Entity::new("article", "PMC", "PMC1").with_property("TI", "Title");
    let term = Entity::new("function", "name", "memory").with_label("behaviour");

    graph.merge_relationship(&article, "ARTICLE_OF", &term).await.unwrap();
    let once = graph.snapshot();
    graph.merge_relationship(&article, "ARTICLE_OF", &term).await.unwrap();

    assert_eq!(graph.snapshot(), once);
    let node = graph.node("function", "memory").unwrap();
    assert!(node.labels.contains("behaviour"));
}

#[tokio::test]
async fn insertion_failure_re_emits_the_in_flight_term() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let log = FailureLog::new(temp.path().join("errors.txt"));
    let terms = StaticTerms(vec![category(&["function"], &["alpha", "beta", "gamma"])]);
    let store = MemoryStore::default();
    let search = ScriptedSearch::new()
        .with_results("alpha", vec![record("1", Some("PMC1"))])
        .with_results(
            "beta",
            vec![record("2", Some("PMC2")), record("3", Some("PMC3"))],
        )
        .with_results("gamma", vec![record("4", Some("PMC4"))]);
    let graph = FlakyGraph::failing_once_on("PMC3");

    let report = RetrySupervisor::new(
        &terms,
        &store,
        &search,
        &graph,
        log.clone(),
        GraphSchema::default(),
        RecordFilter::default(),
        settings(10, false),
    )
    .run()
    .await;

    assert_eq!(report.outcome, SupervisorOutcome::Done { attempts: 2 });
    let lines = log_lines(&log);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(" :\tinsertion failure: graph store returned http status 503"));
    assert_eq!(store.history()[0].iter().collect::<Vec<_>>(), vec!["alpha"]);
    assert_eq!(search.searched_terms(), vec!["alpha", "beta", "beta", "gamma"]);
    assert_eq!(store.saved_values(), vec!["alpha", "beta", "gamma"]);
    // PMC2 was merged in both attempts but is stored once
    assert_eq!(graph.graph.relationship_count(), 4);
    assert_eq!(report.stats.insertions, 5);
}
