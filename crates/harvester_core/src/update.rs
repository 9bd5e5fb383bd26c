use crate::{Effect, Msg, Phase, SupervisorState};

/// Pure update function: applies a message to the supervisor and returns the effects to run.
///
/// Terminal phases absorb every message. Messages that do not fit the current
/// phase are ignored.
pub fn update(mut state: SupervisorState, msg: Msg) -> (SupervisorState, Vec<Effect>) {
    if state.phase().is_terminal() {
        return (state, Vec::new());
    }

    let effects = match (state.phase(), msg) {
        (Phase::Running, Msg::Start) if state.attempts_started() == 0 => {
            if state.max_attempts() == 0 {
                state.set_phase(Phase::Exhausted);
                Vec::new()
            } else {
                let attempt = state.launch_attempt();
                vec![Effect::RunAttempt { attempt }]
            }
        }
        (Phase::Running, Msg::AttemptSucceeded) if state.attempts_started() > 0 => {
            state.set_phase(Phase::Done);
            Vec::new()
        }
        (Phase::Running, Msg::AttemptFailed(failure)) if state.attempts_started() > 0 => {
            state.record_failure(failure.clone());
            vec![Effect::AppendFailureLog(failure)]
        }
        (Phase::LoggingFailure, Msg::FailureLogged) => {
            if state.can_retry() {
                let attempt = state.launch_attempt();
                vec![Effect::Backoff, Effect::RunAttempt { attempt }]
            } else {
                state.set_phase(Phase::Exhausted);
                Vec::new()
            }
        }
        _ => Vec::new(),
    };

    (state, effects)
}
