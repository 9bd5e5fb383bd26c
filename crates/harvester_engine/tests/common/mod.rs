#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use harvester_core::{Checkpoint, Record, TermLabels};
use harvester_engine::{
    CheckpointError, CheckpointStore, SearchClient, SearchError, TermCategory, TermSource,
    TermSourceError,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn category(labels: &[&str], terms: &[&str]) -> TermCategory {
    TermCategory {
        labels: TermLabels::new(labels.iter().copied()).unwrap(),
        terms: terms.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn record(pmid: &str, pmc: Option<&str>) -> Record {
    let mut record = Record::new();
    record.push("PMID", pmid);
    record.push("TI", format!("Article {pmid}"));
    if let Some(pmc) = pmc {
        record.push("PMC", pmc);
    }
    record
}

pub struct StaticTerms(pub Vec<TermCategory>);

impl TermSource for StaticTerms {
    fn categories(&self) -> Result<Vec<TermCategory>, TermSourceError> {
        Ok(self.0.clone())
    }
}

/// Checkpoint store that keeps the last saved set in memory and records every save.
#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Option<Checkpoint>>,
    history: Mutex<Vec<Checkpoint>>,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn with(values: &[&str]) -> Self {
        Self {
            saved: Mutex::new(Some(values.iter().copied().collect())),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Option<Checkpoint> {
        self.saved.lock().unwrap().clone()
    }

    pub fn saved_values(&self) -> Vec<String> {
        self.saved()
            .map(|c| c.iter().map(ToOwned::to_owned).collect())
            .unwrap_or_default()
    }

    pub fn history(&self) -> Vec<Checkpoint> {
        self.history.lock().unwrap().clone()
    }
}

impl CheckpointStore for MemoryStore {
    fn load(&self, reset: bool) -> Result<Checkpoint, CheckpointError> {
        if reset {
            return Ok(Checkpoint::new());
        }
        Ok(self.saved().unwrap_or_default())
    }

    fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        if self.fail_saves {
            return Err(CheckpointError::Encode("disk full".to_string()));
        }
        *self.saved.lock().unwrap() = Some(checkpoint.clone());
        self.history.lock().unwrap().push(checkpoint.clone());
        Ok(())
    }
}

/// Search double with canned results per term and optional scripted failures.
#[derive(Default)]
pub struct ScriptedSearch {
    results: HashMap<String, Vec<Record>>,
    failures: Mutex<HashMap<String, u32>>,
    always_fail: bool,
    calls: Mutex<Vec<(String, usize)>>,
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn always_failing() -> Self {
        Self {
            always_fail: true,
            ..Self::default()
        }
    }

    pub fn with_results(mut self, term: &str, records: Vec<Record>) -> Self {
        self.results.insert(term.to_string(), records);
        self
    }

    /// The next `times` searches for `term` fail.
    pub fn failing_on(self, term: &str, times: u32) -> Self {
        self.failures.lock().unwrap().insert(term.to_string(), times);
        self
    }

    pub fn searched_terms(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn limits(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(|(_, l)| *l).collect()
    }
}

#[async_trait]
impl SearchClient for ScriptedSearch {
    async fn search(&self, term: &str, limit: usize) -> Result<Vec<Record>, SearchError> {
        self.calls.lock().unwrap().push((term.to_string(), limit));
        if self.always_fail {
            return Err(SearchError::Network("service unavailable".to_string()));
        }
        if let Some(remaining) = self.failures.lock().unwrap().get_mut(term) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SearchError::HttpStatus(503));
            }
        }
        Ok(self.results.get(term).cloned().unwrap_or_default())
    }
}
