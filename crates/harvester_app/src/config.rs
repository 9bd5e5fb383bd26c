//! Run configuration, read from a RON file with every section defaulted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use harvester_core::{FilterSettings, LabelsError, TermLabels};
use harvester_engine::{
    CategorySpec, GraphSchema, Neo4jSettings, PipelineSettings, PubMedSettings,
    SupervisorSettings, Throttle,
};
use ron::error::SpannedError;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: SpannedError,
    },
    #[error("category {index} ({path:?}) has invalid labels: {source}")]
    Labels {
        index: usize,
        path: PathBuf,
        #[source]
        source: LabelsError,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub checkpoint_path: PathBuf,
    pub error_log_path: PathBuf,
    pub categories: Vec<CategoryConfig>,
    pub search: SearchConfig,
    pub filter: FilterConfig,
    pub graph: GraphConfig,
    pub retry: RetryConfig,
    pub throttle: ThrottleConfig,
    pub progress: ProgressConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            checkpoint_path: PathBuf::from("data/sought_keywords.ron"),
            error_log_path: PathBuf::from("data/article_insert_error_log.txt"),
            categories: vec![
                CategoryConfig {
                    labels: vec!["function".to_string(), "behaviour".to_string()],
                    path: PathBuf::from("data/behaviours.txt"),
                },
                CategoryConfig {
                    labels: vec!["brainstructure".to_string()],
                    path: PathBuf::from("data/structures.txt"),
                },
            ],
            search: SearchConfig::default(),
            filter: FilterConfig::default(),
            graph: GraphConfig::default(),
            retry: RetryConfig::default(),
            throttle: ThrottleConfig::default(),
            progress: ProgressConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryConfig {
    pub labels: Vec<String>,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    pub email: Option<String>,
    pub tool: String,
    pub api_key: Option<String>,
    pub limit: usize,
    pub fetch_batch: usize,
    pub request_timeout_secs: u64,
    pub max_response_bytes: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let pubmed = PubMedSettings::default();
        Self {
            base_url: pubmed.base_url,
            email: pubmed.email,
            tool: pubmed.tool,
            api_key: pubmed.api_key,
            limit: PipelineSettings::default().search_limit,
            fetch_batch: pubmed.fetch_batch,
            request_timeout_secs: pubmed.request_timeout.as_secs(),
            max_response_bytes: pubmed.max_response_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub primary_field: String,
    pub secondary_field: String,
    pub report_every: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let filter = FilterSettings::default();
        Self {
            primary_field: filter.primary_field,
            secondary_field: filter.secondary_field,
            report_every: filter.report_every,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub url: String,
    pub database: String,
    pub user: String,
    /// Environment variable holding the Neo4j password.
    pub password_env: String,
    pub relationship: String,
    pub article_label: String,
    /// Article node key; defaults to the filter's cross-reference field.
    pub article_key: Option<String>,
    pub article_id_property: String,
    pub term_key: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        let neo4j = Neo4jSettings::default();
        let schema = GraphSchema::default();
        Self {
            url: neo4j.url,
            database: neo4j.database,
            user: neo4j.user,
            password_env: "NEO4J_PASSWORD".to_string(),
            relationship: schema.relationship,
            article_label: schema.article_label,
            article_key: None,
            article_id_property: schema.article_id_property,
            term_key: schema.term_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: harvester_core::DEFAULT_MAX_ATTEMPTS,
            delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub insert_delay_ms: u64,
    pub jitter: f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            insert_delay_ms: 50,
            jitter: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub searches_every: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            searches_every: PipelineSettings::default().searches_every,
        }
    }
}

impl HarvestConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                engine_warn!("Config file {:?} not found, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        engine_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, SpannedError> {
        ron::from_str(content)
    }

    pub fn category_specs(&self) -> Result<Vec<CategorySpec>, ConfigError> {
        self.categories
            .iter()
            .enumerate()
            .map(|(index, category)| {
                let labels = TermLabels::new(category.labels.iter().cloned()).map_err(|source| {
                    ConfigError::Labels {
                        index,
                        path: category.path.clone(),
                        source,
                    }
                })?;
                Ok(CategorySpec {
                    labels,
                    path: category.path.clone(),
                })
            })
            .collect()
    }

    pub fn pubmed_settings(&self) -> PubMedSettings {
        PubMedSettings {
            base_url: self.search.base_url.clone(),
            email: self.search.email.clone(),
            tool: self.search.tool.clone(),
            api_key: self.search.api_key.clone(),
            fetch_batch: self.search.fetch_batch,
            request_timeout: Duration::from_secs(self.search.request_timeout_secs),
            max_response_bytes: self.search.max_response_bytes,
            ..PubMedSettings::default()
        }
    }

    pub fn neo4j_settings(&self, password: Option<String>) -> Neo4jSettings {
        Neo4jSettings {
            url: self.graph.url.clone(),
            database: self.graph.database.clone(),
            user: self.graph.user.clone(),
            password,
            ..Neo4jSettings::default()
        }
    }

    pub fn graph_schema(&self) -> GraphSchema {
        GraphSchema {
            relationship: self.graph.relationship.clone(),
            article_label: self.graph.article_label.clone(),
            article_key: self
                .graph
                .article_key
                .clone()
                .unwrap_or_else(|| self.filter.secondary_field.clone()),
            article_id_property: self.graph.article_id_property.clone(),
            term_key: self.graph.term_key.clone(),
        }
    }

    pub fn filter_settings(&self) -> FilterSettings {
        FilterSettings {
            primary_field: self.filter.primary_field.clone(),
            secondary_field: self.filter.secondary_field.clone(),
            report_every: self.filter.report_every,
        }
    }

    pub fn supervisor_settings(&self, reset: bool) -> SupervisorSettings {
        SupervisorSettings {
            max_attempts: self.retry.max_attempts,
            retry_delay: Throttle::new(
                Duration::from_millis(self.retry.delay_ms),
                self.throttle.jitter,
            ),
            insert_throttle: Throttle::new(
                Duration::from_millis(self.throttle.insert_delay_ms),
                self.throttle.jitter,
            ),
            reset,
            pipeline: PipelineSettings {
                search_limit: self.search.limit,
                searches_every: self.progress.searches_every,
            },
        }
    }
}
