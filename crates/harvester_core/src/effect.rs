use crate::Failure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Build a fresh pipeline from the checkpoint and drive it into the sink.
    /// `attempt` is 1-based.
    RunAttempt { attempt: u32 },
    AppendFailureLog(Failure),
    /// Wait out the inter-attempt delay.
    Backoff,
}
