use std::vec;

use engine_logging::{engine_info, engine_warn};
use harvester_core::{Admission, FailureKind, FilterStats, Record, RecordFilter, Term};

use crate::checkpoint::CheckpointError;
use crate::enumerator::TermEnumerator;
use crate::search::{SearchClient, SearchError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Result ceiling passed to every search.
    pub search_limit: usize,
    /// Log the number of completed searches every this many searches; 0 disables it.
    pub searches_every: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            search_limit: 1000,
            searches_every: 2,
        }
    }
}

/// An eligible record together with the term it was found for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvested {
    pub term: Term,
    pub record: Record,
    /// The record's cross-reference identifier, which keys the article node.
    pub article_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl HarvestError {
    pub fn kind(&self) -> FailureKind {
        match self {
            HarvestError::Checkpoint(_) => FailureKind::Checkpoint,
            HarvestError::Search(_) => FailureKind::Search,
        }
    }
}

/// Pulls terms, searches each one and hands out the eligible records one at a time.
///
/// Only the current term's search results are held. Errors are not caught:
/// the first one is returned and the pipeline is finished afterwards.
pub struct HarvestPipeline<'a> {
    terms: TermEnumerator<'a>,
    search: &'a dyn SearchClient,
    filter: &'a mut RecordFilter,
    settings: PipelineSettings,
    current: Option<(Term, vec::IntoIter<Record>)>,
    searches_done: u64,
    finished: bool,
}

impl<'a> HarvestPipeline<'a> {
    pub fn new(
        terms: TermEnumerator<'a>,
        search: &'a dyn SearchClient,
        filter: &'a mut RecordFilter,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            terms,
            search,
            filter,
            settings,
            current: None,
            searches_done: 0,
            finished: false,
        }
    }

    pub fn searches_done(&self) -> u64 {
        self.searches_done
    }

    pub async fn next(&mut self) -> Option<Result<Harvested, HarvestError>> {
        if self.finished {
            return None;
        }

        loop {
            if let Some((term, records)) = self.current.as_mut() {
                let secondary_field = self.filter.settings().secondary_field.clone();
                for record in records.by_ref() {
                    let admission = self.filter.admit(&record);
                    if let Admission::EligibleWithReport(stats) = admission {
                        log_filter_stats(&stats);
                    }
                    if !admission.is_eligible() {
                        continue;
                    }
                    let Some(article_id) = record.present(&secondary_field).map(str::to_owned)
                    else {
                        engine_warn!("Eligible record for \"{}\" lost its cross-reference", term);
                        continue;
                    };
                    return Some(Ok(Harvested {
                        term: term.clone(),
                        record,
                        article_id,
                    }));
                }

                self.searches_done += 1;
                let every = self.settings.searches_every;
                if every > 0 && self.searches_done % every == 0 {
                    engine_info!("searches executed: {}", self.searches_done);
                }
                self.current = None;
            }

            match self.terms.next() {
                None => {
                    self.finished = true;
                    engine_info!("All searches executed, total: {}", self.searches_done);
                    engine_info!("Total articles found: {}", self.filter.stats().found);
                    return None;
                }
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(err.into()));
                }
                Some(Ok(term)) => {
                    engine_info!("searching for: \"{}\"", term);
                    match self.search.search(term.value(), self.settings.search_limit).await {
                        Ok(records) => self.current = Some((term, records.into_iter())),
                        Err(err) => {
                            self.finished = true;
                            return Some(Err(err.into()));
                        }
                    }
                }
            }
        }
    }
}

fn log_filter_stats(stats: &FilterStats) {
    engine_info!(
        "articles found: {} eligible: {} unique pmid: {} unique pmc: {}",
        stats.found,
        stats.eligible,
        stats.unique_primary,
        stats.unique_secondary
    );
}
