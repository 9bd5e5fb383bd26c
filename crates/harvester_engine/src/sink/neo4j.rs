use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{Entity, InsertError, InsertionSink};
use crate::body::{read_limited, BodyError};

#[derive(Debug, Clone)]
pub struct Neo4jSettings {
    /// Server root, e.g. `http://localhost:7474`.
    pub url: String,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:7474".to_string(),
            database: "neo4j".to_string(),
            user: "neo4j".to_string(),
            password: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Merges through the Neo4j HTTP transactional endpoint, one auto-committed statement per call.
#[derive(Debug, Clone)]
pub struct Neo4jSink {
    settings: Neo4jSettings,
    endpoint: Url,
    client: reqwest::Client,
}

impl Neo4jSink {
    pub fn new(settings: Neo4jSettings) -> Result<Self, InsertError> {
        let mut root = settings.url.clone();
        if !root.ends_with('/') {
            root.push('/');
        }
        let endpoint = Url::parse(&root)
            .and_then(|base| base.join(&format!("db/{}/tx/commit", settings.database)))
            .map_err(|err| InsertError::InvalidUrl(err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| InsertError::Network(err.to_string()))?;
        Ok(Self {
            settings,
            endpoint,
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl InsertionSink for Neo4jSink {
    async fn merge_relationship(
        &self,
        source: &Entity,
        relationship: &str,
        target: &Entity,
    ) -> Result<(), InsertError> {
        let payload = json!({
            "statements": [{
                "statement": merge_statement(source, relationship, target),
                "parameters": {
                    "source_key": source.key_value(),
                    "source_props": source.properties(),
                    "target_key": target.key_value(),
                    "target_props": target.properties(),
                }
            }]
        });
        let body =
            serde_json::to_vec(&payload).map_err(|err| InsertError::Malformed(err.to_string()))?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.settings.user, self.settings.password.as_deref())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(InsertError::HttpStatus(status.as_u16()));
        }

        let bytes = read_limited(response, self.settings.max_response_bytes)
            .await
            .map_err(|err| match err {
                BodyError::TooLarge { max_bytes, actual } => {
                    InsertError::TooLarge { max_bytes, actual }
                }
                BodyError::Transport(err) => map_reqwest_error(err),
            })?;
        let parsed: TxResponse = serde_json::from_slice(&bytes)
            .map_err(|err| InsertError::Malformed(err.to_string()))?;
        match parsed.errors.into_iter().next() {
            Some(error) => Err(InsertError::Rejected {
                code: error.code,
                message: error.message,
            }),
            None => Ok(()),
        }
    }
}

/// Cypher that merges both nodes on their primary label and key, then the relationship.
///
/// Labels, keys and the relationship type are spliced in as quoted
/// identifiers; all values travel as parameters.
pub fn merge_statement(source: &Entity, relationship: &str, target: &Entity) -> String {
    let mut cypher = String::new();
    push_node_merge(&mut cypher, "s", source, "source");
    push_node_merge(&mut cypher, "t", target, "target");
    cypher.push_str(&format!("MERGE (s)-[:{}]->(t)", quote(relationship)));
    cypher
}

fn push_node_merge(cypher: &mut String, var: &str, entity: &Entity, param: &str) {
    cypher.push_str(&format!(
        "MERGE ({var}:{label} {{{key}: ${param}_key}})\n",
        label = quote(entity.primary_label()),
        key = quote(entity.primary_key()),
    ));
    for label in entity.extra_labels() {
        cypher.push_str(&format!("SET {var}:{}\n", quote(label)));
    }
    cypher.push_str(&format!("SET {var} += ${param}_props\n"));
}

fn quote(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

fn map_reqwest_error(err: reqwest::Error) -> InsertError {
    if err.is_timeout() {
        return InsertError::Timeout;
    }
    InsertError::Network(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{merge_statement, quote};
    use crate::sink::Entity;

    #[test]
    fn identifiers_are_backtick_escaped() {
        assert_eq!(quote("brain`structure"), "`brain``structure`");
    }

    #[test]
    fn statement_merges_nodes_then_relationship() {
        let article = Entity::new("article", "PMC", "PMC1");
        let term = Entity::new("function", "name", "memory").with_label("behaviour");
        let cypher = merge_statement(&article, "ARTICLE_OF", &term);

        assert_eq!(
            cypher,
            "MERGE (s:`article` {`PMC`: $source_key})\n\
             SET s += $source_props\n\
             MERGE (t:`function` {`name`: $target_key})\n\
             SET t:`behaviour`\n\
             SET t += $target_props\n\
             MERGE (s)-[:`ARTICLE_OF`]->(t)"
        );
    }
}
