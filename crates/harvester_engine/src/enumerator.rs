use std::vec;

use harvester_core::{Checkpoint, Term, TermLabels};

use crate::checkpoint::{CheckpointError, CheckpointStore};
use crate::terms::TermCategory;

/// Lazily yields terms not yet in the checkpoint, category by category.
///
/// The checkpoint lags one step behind: a term is committed (and the
/// checkpoint saved) only when the consumer pulls the next item, i.e. once
/// everything downstream has finished with it. A crash therefore re-emits the
/// in-flight term on restart instead of skipping it.
pub struct TermEnumerator<'a> {
    store: &'a dyn CheckpointStore,
    checkpoint: Checkpoint,
    categories: vec::IntoIter<TermCategory>,
    current: Option<(TermLabels, vec::IntoIter<String>)>,
    pending: Option<String>,
    finished: bool,
}

impl<'a> TermEnumerator<'a> {
    /// Loads the checkpoint from `store`. With `reset`, the durable checkpoint
    /// is overwritten with an empty set before anything is emitted.
    pub fn new(
        store: &'a dyn CheckpointStore,
        categories: Vec<TermCategory>,
        reset: bool,
    ) -> Result<Self, CheckpointError> {
        let checkpoint = store.load(reset)?;
        if reset {
            store.save(&checkpoint)?;
        }
        Ok(Self {
            store,
            checkpoint,
            categories: categories.into_iter(),
            current: None,
            pending: None,
            finished: false,
        })
    }

    pub fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    /// The most recently emitted term that is not committed yet.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    fn commit_pending(&mut self) -> Result<(), CheckpointError> {
        if let Some(value) = self.pending.take() {
            if self.checkpoint.commit(value) {
                self.store.save(&self.checkpoint)?;
            }
        }
        Ok(())
    }
}

impl Iterator for TermEnumerator<'_> {
    type Item = Result<Term, CheckpointError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Err(err) = self.commit_pending() {
            self.finished = true;
            return Some(Err(err));
        }

        loop {
            if let Some((labels, terms)) = self.current.as_mut() {
                let checkpoint = &self.checkpoint;
                if let Some(value) = terms.find(|value| !checkpoint.contains(value)) {
                    self.pending = Some(value.clone());
                    return Some(Ok(Term::new(value, labels.clone())));
                }
            }

            match self.categories.next() {
                Some(category) => {
                    self.current = Some((category.labels, category.terms.into_iter()));
                }
                None => {
                    self.current = None;
                    self.finished = true;
                    return None;
                }
            }
        }
    }
}
