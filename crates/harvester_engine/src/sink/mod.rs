//! Graph insertion: entities, the idempotent merge seam, and its Neo4j and in-memory backends.
mod memory;
mod neo4j;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

pub use memory::{GraphSnapshot, MemoryGraph, StoredNode};
pub use neo4j::{merge_statement, Neo4jSettings, Neo4jSink};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<&[String]> for PropertyValue {
    fn from(values: &[String]) -> Self {
        match values {
            [single] => PropertyValue::Text(single.clone()),
            many => PropertyValue::List(many.to_vec()),
        }
    }
}

/// A graph node identified by its primary label and the value of its primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    primary_label: String,
    extra_labels: Vec<String>,
    primary_key: String,
    key_value: String,
    properties: BTreeMap<String, PropertyValue>,
}

impl Entity {
    pub fn new(
        primary_label: impl Into<String>,
        primary_key: impl Into<String>,
        key_value: impl Into<String>,
    ) -> Self {
        let primary_key = primary_key.into();
        let key_value = key_value.into();
        let mut properties = BTreeMap::new();
        properties.insert(primary_key.clone(), PropertyValue::Text(key_value.clone()));
        Self {
            primary_label: primary_label.into(),
            extra_labels: Vec::new(),
            primary_key,
            key_value,
            properties,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if label != self.primary_label && !self.extra_labels.contains(&label) {
            self.extra_labels.push(label);
        }
        self
    }

    /// Sets a property. The primary key property cannot be overridden.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        let name = name.into();
        if name != self.primary_key {
            self.properties.insert(name, value.into());
        }
        self
    }

    pub fn primary_label(&self) -> &str {
        &self.primary_label
    }

    pub fn extra_labels(&self) -> &[String] {
        &self.extra_labels
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn key_value(&self) -> &str {
        &self.key_value
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InsertError {
    #[error("invalid graph url: {0}")]
    InvalidUrl(String),
    #[error("graph request timed out")]
    Timeout,
    #[error("graph store returned http status {0}")]
    HttpStatus(u16),
    #[error("graph response too large (max {max_bytes}, actual {actual:?})")]
    TooLarge { max_bytes: u64, actual: Option<u64> },
    #[error("graph store rejected merge: {code}: {message}")]
    Rejected { code: String, message: String },
    #[error("malformed graph response: {0}")]
    Malformed(String),
    #[error("network error during insert: {0}")]
    Network(String),
}

/// Idempotently merges `(source)-[relationship]->(target)` and both nodes.
///
/// Repeating a call with identical arguments must leave the store unchanged.
#[async_trait]
pub trait InsertionSink: Send + Sync {
    async fn merge_relationship(
        &self,
        source: &Entity,
        relationship: &str,
        target: &Entity,
    ) -> Result<(), InsertError>;
}
