use crate::Failure;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Running,
    LoggingFailure,
    Exhausted,
    Done,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Exhausted | Phase::Done)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorOutcome {
    Done {
        attempts: u32,
    },
    Exhausted {
        failures: u32,
        last_failure: Option<Failure>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorState {
    phase: Phase,
    max_attempts: u32,
    attempts_started: u32,
    failures: u32,
    last_failure: Option<Failure>,
}

impl Default for SupervisorState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl SupervisorState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            phase: Phase::Running,
            max_attempts,
            attempts_started: 0,
            failures: 0,
            last_failure: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn attempts_started(&self) -> u32 {
        self.attempts_started
    }

    /// The retry counter: number of attempts that ended in a failure.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn last_failure(&self) -> Option<&Failure> {
        self.last_failure.as_ref()
    }

    /// `Some` once the machine has reached a terminal phase.
    pub fn outcome(&self) -> Option<SupervisorOutcome> {
        match self.phase {
            Phase::Done => Some(SupervisorOutcome::Done {
                attempts: self.attempts_started,
            }),
            Phase::Exhausted => Some(SupervisorOutcome::Exhausted {
                failures: self.failures,
                last_failure: self.last_failure.clone(),
            }),
            Phase::Running | Phase::LoggingFailure => None,
        }
    }

    pub(crate) fn launch_attempt(&mut self) -> u32 {
        self.phase = Phase::Running;
        self.attempts_started += 1;
        self.attempts_started
    }

    pub(crate) fn record_failure(&mut self, failure: Failure) {
        self.phase = Phase::LoggingFailure;
        self.failures += 1;
        self.last_failure = Some(failure);
    }

    pub(crate) fn can_retry(&self) -> bool {
        let retryable = self
            .last_failure
            .as_ref()
            .map_or(true, |failure| failure.kind.is_retryable());
        retryable && self.failures < self.max_attempts
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
}
