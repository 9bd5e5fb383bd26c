use harvester_core::Term;

use crate::pipeline::Harvested;
use crate::sink::Entity;

/// How harvested records map onto graph nodes and relationships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSchema {
    pub relationship: String,
    pub article_label: String,
    /// Primary key of article nodes; holds the record's cross-reference id.
    pub article_key: String,
    /// Extra article property that duplicates the cross-reference id.
    pub article_id_property: String,
    pub term_key: String,
}

impl Default for GraphSchema {
    fn default() -> Self {
        Self {
            relationship: "ARTICLE_OF".to_string(),
            article_label: "article".to_string(),
            article_key: "PMC".to_string(),
            article_id_property: "PMC_ID".to_string(),
            term_key: "name".to_string(),
        }
    }
}

impl GraphSchema {
    pub fn term_entity(&self, term: &Term) -> Entity {
        let labels = term.labels();
        labels
            .iter()
            .skip(1)
            .fold(
                Entity::new(labels.primary(), &self.term_key, term.value()),
                Entity::with_label,
            )
    }

    pub fn article_entity(&self, harvested: &Harvested) -> Entity {
        let entity = Entity::new(
            &self.article_label,
            &self.article_key,
            harvested.article_id.as_str(),
        );
        harvested
            .record
            .fields()
            .fold(entity, |entity, (field, values)| {
                entity.with_property(field, values)
            })
            .with_property(&self.article_id_property, harvested.article_id.as_str())
    }
}
