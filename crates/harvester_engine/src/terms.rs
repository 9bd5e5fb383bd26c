use std::fs;
use std::io;
use std::path::PathBuf;

use engine_logging::engine_debug;
use harvester_core::TermLabels;

#[derive(Debug, thiserror::Error)]
pub enum TermSourceError {
    #[error("failed to read term list {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An ordered list of term values sharing the same labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermCategory {
    pub labels: TermLabels,
    pub terms: Vec<String>,
}

/// Supplies the ordered universe of terms, one category after another.
pub trait TermSource: Send + Sync {
    fn categories(&self) -> Result<Vec<TermCategory>, TermSourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub labels: TermLabels,
    pub path: PathBuf,
}

/// Reads each category from a text file with one term per line.
#[derive(Debug, Clone)]
pub struct FileTermSource {
    specs: Vec<CategorySpec>,
}

impl FileTermSource {
    pub fn new(specs: Vec<CategorySpec>) -> Self {
        Self { specs }
    }
}

impl TermSource for FileTermSource {
    fn categories(&self) -> Result<Vec<TermCategory>, TermSourceError> {
        self.specs
            .iter()
            .map(|spec| {
                let content =
                    fs::read_to_string(&spec.path).map_err(|source| TermSourceError::Read {
                        path: spec.path.clone(),
                        source,
                    })?;
                let terms = parse_term_list(&content);
                engine_debug!(
                    "Loaded {} '{}' terms from {:?}",
                    terms.len(),
                    spec.labels.primary(),
                    spec.path
                );
                Ok(TermCategory {
                    labels: spec.labels.clone(),
                    terms,
                })
            })
            .collect()
    }
}

/// One term per line; surrounding whitespace, blank lines and `#` comments are dropped.
pub fn parse_term_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect()
}
