use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{Entity, InsertError, InsertionSink, PropertyValue};

/// (primary label, key value)
type NodeKey = (String, String);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredNode {
    pub labels: BTreeSet<String>,
    pub properties: BTreeMap<String, PropertyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphSnapshot {
    pub nodes: BTreeMap<NodeKey, StoredNode>,
    pub relationships: BTreeSet<(NodeKey, String, NodeKey)>,
}

/// In-process graph with merge semantics, used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    inner: Mutex<GraphSnapshot>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn node_count(&self) -> usize {
        self.snapshot().nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.snapshot().relationships.len()
    }

    pub fn node(&self, label: &str, key_value: &str) -> Option<StoredNode> {
        self.snapshot()
            .nodes
            .get(&(label.to_string(), key_value.to_string()))
            .cloned()
    }

    pub fn has_relationship(&self, source: (&str, &str), relationship: &str, target: (&str, &str)) -> bool {
        let key = (
            (source.0.to_string(), source.1.to_string()),
            relationship.to_string(),
            (target.0.to_string(), target.1.to_string()),
        );
        self.snapshot().relationships.contains(&key)
    }
}

fn merge_node(graph: &mut GraphSnapshot, entity: &Entity) -> NodeKey {
    let key = (
        entity.primary_label().to_string(),
        entity.key_value().to_string(),
    );
    let node = graph.nodes.entry(key.clone()).or_default();
    node.labels.insert(entity.primary_label().to_string());
    node.labels.extend(entity.extra_labels().iter().cloned());
    for (name, value) in entity.properties() {
        node.properties.insert(name.clone(), value.clone());
    }
    key
}

#[async_trait]
impl InsertionSink for MemoryGraph {
    async fn merge_relationship(
        &self,
        source: &Entity,
        relationship: &str,
        target: &Entity,
    ) -> Result<(), InsertError> {
        let mut graph = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let source_key = merge_node(&mut graph, source);
        let target_key = merge_node(&mut graph, target);
        graph
            .relationships
            .insert((source_key, relationship.to_string(), target_key));
        Ok(())
    }
}
