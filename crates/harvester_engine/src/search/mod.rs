//! Bibliographic search: the client seam, the PubMed implementation and its MEDLINE parser.
mod medline;
mod pubmed;

use async_trait::async_trait;
use harvester_core::Record;

pub use medline::parse_medline;
pub use pubmed::{PubMedClient, PubMedSettings};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("invalid search url: {0}")]
    InvalidUrl(String),
    #[error("search request timed out")]
    Timeout,
    #[error("search service returned http status {0}")]
    HttpStatus(u16),
    #[error("search response too large (max {max_bytes}, actual {actual:?})")]
    TooLarge { max_bytes: u64, actual: Option<u64> },
    #[error("malformed search response: {0}")]
    Malformed(String),
    #[error("search service rejected the query: {0}")]
    Rejected(String),
    #[error("network error during search: {0}")]
    Network(String),
}

/// Returns the records matching `term`, at most `limit` of them.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, term: &str, limit: usize) -> Result<Vec<Record>, SearchError>;
}
