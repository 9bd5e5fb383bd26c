use std::collections::BTreeSet;

/// Set of term values that have already been searched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkpoint {
    sought: BTreeSet<String>,
}

impl Checkpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.sought.contains(value)
    }

    /// Marks a term as searched. Returns `false` if it was already present.
    pub fn commit(&mut self, value: impl Into<String>) -> bool {
        self.sought.insert(value.into())
    }

    pub fn len(&self) -> usize {
        self.sought.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sought.is_empty()
    }

    /// Sorted iteration over the committed values.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.sought.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Checkpoint {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            sought: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Checkpoint;

    #[test]
    fn commit_never_shrinks() {
        let mut checkpoint: Checkpoint = ["alpha"].into_iter().collect();
        assert!(!checkpoint.commit("alpha"));
        assert!(checkpoint.commit("beta"));
        assert_eq!(checkpoint.len(), 2);
        assert_eq!(checkpoint.iter().collect::<Vec<_>>(), vec!["alpha", "beta"]);
    }
}
