use std::collections::VecDeque;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use harvester_core::{
    update, Effect, Failure, FailureKind, Msg, RecordFilter, SupervisorOutcome, SupervisorState,
    DEFAULT_MAX_ATTEMPTS,
};

use crate::checkpoint::{CheckpointError, CheckpointStore};
use crate::enumerator::TermEnumerator;
use crate::failure_log::FailureLog;
use crate::graph::GraphSchema;
use crate::pipeline::{HarvestError, HarvestPipeline, PipelineSettings};
use crate::search::SearchClient;
use crate::sink::{InsertError, InsertionSink};
use crate::terms::{TermSource, TermSourceError};
use crate::throttle::Throttle;

#[derive(Debug, Clone, PartialEq)]
pub struct SupervisorSettings {
    pub max_attempts: u32,
    /// Delay between a failed attempt and the next one.
    pub retry_delay: Throttle,
    /// Delay after every insertion.
    pub insert_throttle: Throttle,
    /// Discard the durable checkpoint before the first attempt. Later attempts
    /// always resume from it.
    pub reset: bool,
    pub pipeline: PipelineSettings,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Throttle::new(std::time::Duration::from_secs(1), 0.5),
            insert_throttle: Throttle::new(std::time::Duration::from_millis(50), 0.5),
            reset: false,
            pipeline: PipelineSettings::default(),
        }
    }
}

/// Why one attempt stopped before the term source was exhausted.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error(transparent)]
    TermSource(#[from] TermSourceError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Harvest(#[from] HarvestError),
    #[error(transparent)]
    Insert(#[from] InsertError),
}

impl AttemptError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AttemptError::TermSource(_) => FailureKind::TermSource,
            AttemptError::Checkpoint(_) => FailureKind::Checkpoint,
            AttemptError::Harvest(err) => err.kind(),
            AttemptError::Insert(_) => FailureKind::Insertion,
        }
    }

    pub fn to_failure(&self) -> Failure {
        Failure::new(self.kind(), self.to_string())
    }
}

/// Totals across all attempts of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub attempts: u32,
    pub searches: u64,
    pub insertions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorReport {
    pub outcome: SupervisorOutcome,
    pub stats: RunStats,
}

impl SupervisorReport {
    pub fn is_done(&self) -> bool {
        matches!(self.outcome, SupervisorOutcome::Done { .. })
    }
}

/// Drives harvest attempts into the sink until one completes or the retry bound is hit.
pub struct RetrySupervisor<'a> {
    terms: &'a dyn TermSource,
    store: &'a dyn CheckpointStore,
    search: &'a dyn SearchClient,
    sink: &'a dyn InsertionSink,
    failure_log: FailureLog,
    schema: GraphSchema,
    filter: RecordFilter,
    settings: SupervisorSettings,
    stats: RunStats,
}

impl<'a> RetrySupervisor<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        terms: &'a dyn TermSource,
        store: &'a dyn CheckpointStore,
        search: &'a dyn SearchClient,
        sink: &'a dyn InsertionSink,
        failure_log: FailureLog,
        schema: GraphSchema,
        filter: RecordFilter,
        settings: SupervisorSettings,
    ) -> Self {
        Self {
            terms,
            store,
            search,
            sink,
            failure_log,
            schema,
            filter,
            settings,
            stats: RunStats::default(),
        }
    }

    pub async fn run(mut self) -> SupervisorReport {
        let mut state = SupervisorState::new(self.settings.max_attempts);
        let mut queue = VecDeque::new();
        let (next, effects) = update(state, Msg::Start);
        state = next;
        queue.extend(effects);

        while let Some(effect) = queue.pop_front() {
            let msg = match effect {
                Effect::RunAttempt { attempt } => Some(match self.run_attempt(attempt).await {
                    Ok(()) => Msg::AttemptSucceeded,
                    Err(err) => {
                        engine_warn!("Attempt {} failed: {}", attempt, err);
                        Msg::AttemptFailed(err.to_failure())
                    }
                }),
                Effect::AppendFailureLog(failure) => {
                    if let Err(err) = self.failure_log.append(&failure) {
                        engine_error!(
                            "Failed to append to failure log {:?}: {}",
                            self.failure_log.path(),
                            err
                        );
                    }
                    Some(Msg::FailureLogged)
                }
                Effect::Backoff => {
                    self.settings.retry_delay.pause().await;
                    None
                }
            };

            if let Some(msg) = msg {
                let (next, effects) = update(state, msg);
                state = next;
                queue.extend(effects);
            }
        }

        let outcome = state.outcome().unwrap_or_else(|| SupervisorOutcome::Exhausted {
            failures: state.failures(),
            last_failure: state.last_failure().cloned(),
        });
        match &outcome {
            SupervisorOutcome::Done { attempts } => {
                engine_info!("Harvest complete after {} attempt(s)", attempts)
            }
            SupervisorOutcome::Exhausted { failures, .. } => {
                engine_error!("Giving up after {} failed attempt(s)", failures)
            }
        }
        SupervisorReport {
            outcome,
            stats: self.stats,
        }
    }

    async fn run_attempt(&mut self, attempt: u32) -> Result<(), AttemptError> {
        self.stats.attempts = attempt;
        let reset = self.settings.reset && attempt == 1;
        engine_info!(
            "Starting harvest attempt {}/{} (reset: {})",
            attempt,
            self.settings.max_attempts,
            reset
        );

        let categories = self.terms.categories()?;
        let terms = TermEnumerator::new(self.store, categories, reset)?;
        let mut pipeline = HarvestPipeline::new(
            terms,
            self.search,
            &mut self.filter,
            self.settings.pipeline.clone(),
        );

        let result = drain_into_sink(
            &mut pipeline,
            self.sink,
            &self.schema,
            &self.settings.insert_throttle,
            &mut self.stats.insertions,
        )
        .await;
        self.stats.searches += pipeline.searches_done();
        result
    }
}

async fn drain_into_sink(
    pipeline: &mut HarvestPipeline<'_>,
    sink: &dyn InsertionSink,
    schema: &GraphSchema,
    throttle: &Throttle,
    insertions: &mut u64,
) -> Result<(), AttemptError> {
    while let Some(item) = pipeline.next().await {
        let harvested = item?;
        let article = schema.article_entity(&harvested);
        let term = schema.term_entity(&harvested.term);
        sink.merge_relationship(&article, &schema.relationship, &term)
            .await?;
        *insertions += 1;
        engine_debug!("{} {}", harvested.term, harvested.article_id);
        throttle.pause().await;
    }
    Ok(())
}
