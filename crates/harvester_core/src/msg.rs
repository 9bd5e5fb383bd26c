use crate::Failure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Kick off the first attempt.
    Start,
    /// The pipeline ran to natural completion.
    AttemptSucceeded,
    /// The pipeline stopped on an unhandled failure.
    AttemptFailed(Failure),
    /// The failure entry was appended to the durable log (or the append was abandoned).
    FailureLogged,
}
