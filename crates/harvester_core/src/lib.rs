//! Harvester core: pure domain types and the retry supervisor state machine.
mod checkpoint;
mod effect;
mod failure;
mod filter;
mod msg;
mod record;
mod state;
mod term;
mod update;

pub use checkpoint::Checkpoint;
pub use effect::Effect;
pub use failure::{Failure, FailureKind};
pub use filter::{Admission, FilterSettings, FilterStats, RecordFilter, UniquenessIndex};
pub use msg::Msg;
pub use record::Record;
pub use state::{Phase, SupervisorOutcome, SupervisorState, DEFAULT_MAX_ATTEMPTS};
pub use term::{LabelsError, Term, TermLabels};
pub use update::update;
