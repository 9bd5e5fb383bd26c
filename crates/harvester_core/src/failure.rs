use std::fmt;

/// Which stage an unhandled failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Checkpoint,
    TermSource,
    Search,
    Insertion,
}

impl FailureKind {
    /// Whether a fresh attempt can be expected to get past this failure.
    pub fn is_retryable(self) -> bool {
        !matches!(self, FailureKind::TermSource)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Checkpoint => write!(f, "checkpoint"),
            FailureKind::TermSource => write!(f, "term source"),
            FailureKind::Search => write!(f, "search"),
            FailureKind::Insertion => write!(f, "insertion"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.kind, self.message)
    }
}
