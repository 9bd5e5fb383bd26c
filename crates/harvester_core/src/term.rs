use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelsError {
    #[error("a term category needs at least one label")]
    Empty,
    #[error("term labels must not be blank")]
    Blank,
}

/// Ordered, non-empty category labels. The first label is the primary one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermLabels(Vec<String>);

impl TermLabels {
    pub fn new<I, S>(labels: I) -> Result<Self, LabelsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(LabelsError::Empty);
        }
        if labels.iter().any(|label| label.trim().is_empty()) {
            return Err(LabelsError::Blank);
        }
        Ok(Self(labels))
    }

    pub fn primary(&self) -> &str {
        &self.0[0]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// A search key plus the labels of the category it was drawn from.
///
/// Two terms are equal when their values are equal; labels are metadata.
#[derive(Debug, Clone)]
pub struct Term {
    value: String,
    labels: TermLabels,
}

impl Term {
    pub fn new(value: impl Into<String>, labels: TermLabels) -> Self {
        Self {
            value: value.into(),
            labels,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn labels(&self) -> &TermLabels {
        &self.labels
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
