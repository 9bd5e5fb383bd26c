use std::time::Duration;

use async_trait::async_trait;
use engine_logging::engine_debug;
use harvester_core::Record;
use serde::Deserialize;
use url::Url;

use super::medline::parse_medline;
use super::{SearchClient, SearchError};
use crate::body::{read_limited, BodyError};

#[derive(Debug, Clone)]
pub struct PubMedSettings {
    /// E-utilities root, e.g. `https://eutils.ncbi.nlm.nih.gov/entrez/eutils/`.
    pub base_url: String,
    pub email: Option<String>,
    pub tool: String,
    pub api_key: Option<String>,
    /// Ids per efetch request.
    pub fetch_batch: usize,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for PubMedSettings {
    fn default() -> Self {
        Self {
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/".to_string(),
            email: None,
            tool: "harvester".to_string(),
            api_key: None,
            fetch_batch: 200,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_response_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(default, rename = "ERROR")]
    error: Option<String>,
}

/// PubMed over the NCBI E-utilities: esearch for ids, efetch for MEDLINE records.
#[derive(Debug, Clone)]
pub struct PubMedClient {
    settings: PubMedSettings,
    base: Url,
    client: reqwest::Client,
}

impl PubMedClient {
    pub fn new(settings: PubMedSettings) -> Result<Self, SearchError> {
        let mut root = settings.base_url.clone();
        if !root.ends_with('/') {
            root.push('/');
        }
        let base = Url::parse(&root).map_err(|err| SearchError::InvalidUrl(err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SearchError::Network(err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, name: &str, params: &[(&str, &str)]) -> Result<Url, SearchError> {
        let mut url = self
            .base
            .join(name)
            .map_err(|err| SearchError::InvalidUrl(err.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("db", "pubmed");
            for (key, value) in params {
                query.append_pair(key, value);
            }
            query.append_pair("tool", &self.settings.tool);
            if let Some(email) = self.settings.email.as_deref() {
                query.append_pair("email", email);
            }
            if let Some(api_key) = self.settings.api_key.as_deref() {
                query.append_pair("api_key", api_key);
            }
        }
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, SearchError> {
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpStatus(status.as_u16()));
        }

        read_limited(response, self.settings.max_response_bytes)
            .await
            .map_err(|err| match err {
                BodyError::TooLarge { max_bytes, actual } => {
                    SearchError::TooLarge { max_bytes, actual }
                }
                BodyError::Transport(err) => map_reqwest_error(err),
            })
    }

    /// PubMed ids for `term`, in the service's relevance order.
    pub async fn search_ids(&self, term: &str, limit: usize) -> Result<Vec<String>, SearchError> {
        let retmax = limit.to_string();
        let url = self.endpoint(
            "esearch.fcgi",
            &[("term", term), ("retmax", retmax.as_str()), ("retmode", "json")],
        )?;
        let body = self.get(url).await?;
        let parsed: ESearchResponse = serde_json::from_slice(&body)
            .map_err(|err| SearchError::Malformed(err.to_string()))?;
        if let Some(error) = parsed.esearchresult.error {
            return Err(SearchError::Rejected(error));
        }
        let mut ids = parsed.esearchresult.idlist;
        ids.truncate(limit);
        Ok(ids)
    }

    /// MEDLINE records for the given ids.
    pub async fn fetch_records(&self, ids: &[String]) -> Result<Vec<Record>, SearchError> {
        let mut records = Vec::with_capacity(ids.len());
        for batch in ids.chunks(self.settings.fetch_batch.max(1)) {
            let joined = batch.join(",");
            let url = self.endpoint(
                "efetch.fcgi",
                &[("id", joined.as_str()), ("rettype", "medline"), ("retmode", "text")],
            )?;
            let body = self.get(url).await?;
            let text = String::from_utf8_lossy(&body);
            records.extend(parse_medline(&text));
        }
        Ok(records)
    }
}

#[async_trait]
impl SearchClient for PubMedClient {
    async fn search(&self, term: &str, limit: usize) -> Result<Vec<Record>, SearchError> {
        let ids = self.search_ids(term, limit).await?;
        engine_debug!("esearch \"{}\" returned {} ids", term, ids.len());
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_records(&ids).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SearchError {
    if err.is_timeout() {
        return SearchError::Timeout;
    }
    SearchError::Network(err.to_string())
}
