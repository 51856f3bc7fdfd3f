//! Storage contract for topic persistence.
//!
//! The registry itself is in-memory; this module defines the key-value
//! contract the surrounding application uses to persist topics, plus an
//! in-memory reference implementation for tests and local development.
//! Topics are stored as JSON blobs under `topic:{id}`, with an id index
//! under `topic:index` and per-category sets under `topic:category:{c}`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::TaxonomyError;
use crate::types::{TopicCategory, TopicDefinition, TopicId};

/// Key of the set holding all topic ids.
pub const TOPIC_INDEX_KEY: &str = "topic:index";

/// Storage key for a single topic.
pub fn topic_key(id: &TopicId) -> String {
    format!("topic:{id}")
}

/// Storage key for a category's id set.
pub fn category_key(category: TopicCategory) -> String {
    format!("topic:category:{}", category.as_str())
}

/// Key-value persistence contract for topics.
///
/// Implementations are expected to keep the id index and category sets in
/// step with `put`/`delete`. The real store lives in the surrounding
/// application; this crate only defines the contract.
#[async_trait]
pub trait TopicStore: Send + Sync {
    /// Persist a topic (insert or overwrite).
    async fn put(&self, topic: &TopicDefinition) -> Result<(), TaxonomyError>;

    /// Load a topic by id.
    async fn get(&self, id: &TopicId) -> Result<Option<TopicDefinition>, TaxonomyError>;

    /// Remove a topic.
    async fn delete(&self, id: &TopicId) -> Result<(), TaxonomyError>;

    /// List all stored topic ids.
    async fn list_ids(&self) -> Result<Vec<TopicId>, TaxonomyError>;
}

/// In-memory topic store.
///
/// Serializes through JSON like a real KV store would, so type-level
/// serialization problems surface in tests rather than in production.
/// Keeps the id index and category sets in step with `put`/`delete`;
/// `list_ids` reads the index, never a key scan, so the reserved
/// index and category keys can never leak out as topic ids.
pub struct InMemoryTopicStore {
    blobs: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryTopicStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn read_set(blobs: &HashMap<String, String>, key: &str) -> Result<Vec<String>, TaxonomyError> {
        match blobs.get(key) {
            Some(json) => {
                serde_json::from_str(json).map_err(|e| TaxonomyError::Storage(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    fn write_set(
        blobs: &mut HashMap<String, String>,
        key: &str,
        set: &[String],
    ) -> Result<(), TaxonomyError> {
        let json = serde_json::to_string(set).map_err(|e| TaxonomyError::Storage(e.to_string()))?;
        blobs.insert(key.to_string(), json);
        Ok(())
    }
}

impl Default for InMemoryTopicStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TopicStore for InMemoryTopicStore {
    async fn put(&self, topic: &TopicDefinition) -> Result<(), TaxonomyError> {
        let json = serde_json::to_string(topic)
            .map_err(|e| TaxonomyError::Storage(e.to_string()))?;
        let mut blobs = self.blobs.write().await;
        blobs.insert(topic_key(&topic.id), json);

        let raw_id = topic.id.to_string();
        let mut index = Self::read_set(&blobs, TOPIC_INDEX_KEY)?;
        if !index.contains(&raw_id) {
            index.push(raw_id.clone());
            index.sort();
            Self::write_set(&mut blobs, TOPIC_INDEX_KEY, &index)?;
        }

        let ckey = category_key(topic.category);
        let mut members = Self::read_set(&blobs, &ckey)?;
        if !members.contains(&raw_id) {
            members.push(raw_id);
            Self::write_set(&mut blobs, &ckey, &members)?;
        }
        Ok(())
    }

    async fn get(&self, id: &TopicId) -> Result<Option<TopicDefinition>, TaxonomyError> {
        let blobs = self.blobs.read().await;
        match blobs.get(&topic_key(id)) {
            Some(json) => serde_json::from_str(json)
                .map(Some)
                .map_err(|e| TaxonomyError::Storage(e.to_string())),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &TopicId) -> Result<(), TaxonomyError> {
        let mut blobs = self.blobs.write().await;

        // Need the category before the blob goes away.
        let category = match blobs.get(&topic_key(id)) {
            Some(json) => {
                let topic: TopicDefinition = serde_json::from_str(json)
                    .map_err(|e| TaxonomyError::Storage(e.to_string()))?;
                Some(topic.category)
            }
            None => None,
        };
        blobs.remove(&topic_key(id));

        let mut index = Self::read_set(&blobs, TOPIC_INDEX_KEY)?;
        index.retain(|raw| raw != id.as_str());
        Self::write_set(&mut blobs, TOPIC_INDEX_KEY, &index)?;

        if let Some(category) = category {
            let ckey = category_key(category);
            let mut members = Self::read_set(&blobs, &ckey)?;
            members.retain(|raw| raw != id.as_str());
            Self::write_set(&mut blobs, &ckey, &members)?;
        }
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<TopicId>, TaxonomyError> {
        let blobs = self.blobs.read().await;
        let index = Self::read_set(&blobs, TOPIC_INDEX_KEY)?;
        index.iter().map(|raw| TopicId::parse(raw)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CreateTopicInput, TokenMatchPattern};
    use crate::TopicTaxonomy;

    fn sample_topic(id: &str, category: TopicCategory) -> TopicDefinition {
        let mut registry = TopicTaxonomy::new();
        registry
            .create(CreateTopicInput {
                id: id.to_string(),
                name: id.to_string(),
                description: String::new(),
                category,
                parent_id: None,
                difficulty: Default::default(),
                patterns: TokenMatchPattern::default(),
                aliases: vec![],
                related_topics: vec![],
                prerequisites: vec![],
                keywords: vec![],
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = InMemoryTopicStore::new();
        let topic = sample_topic("language", TopicCategory::Language);

        store.put(&topic).await.unwrap();
        let loaded = store.get(&topic.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, topic.id);
        assert_eq!(loaded.metadata.version, topic.metadata.version);

        let ids = store.list_ids().await.unwrap();
        assert_eq!(ids, vec![topic.id.clone()]);

        store.delete(&topic.id).await.unwrap();
        assert!(store.get(&topic.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_index_excludes_reserved_keys() {
        let store = InMemoryTopicStore::new();
        let language = sample_topic("language", TopicCategory::Language);
        let tool = sample_topic("tool", TopicCategory::Tool);

        store.put(&language).await.unwrap();
        store.put(&tool).await.unwrap();

        // Index and category keys now exist alongside the topic blobs,
        // but only real topic ids come back.
        let ids = store.list_ids().await.unwrap();
        assert_eq!(ids, vec![language.id.clone(), tool.id.clone()]);

        // Re-putting does not duplicate the index entry.
        store.put(&tool).await.unwrap();
        assert_eq!(store.list_ids().await.unwrap().len(), 2);

        store.delete(&language.id).await.unwrap();
        assert_eq!(store.list_ids().await.unwrap(), vec![tool.id.clone()]);
    }

    #[test]
    fn test_key_formats() {
        let id = TopicId::parse("language:rust").unwrap();
        assert_eq!(topic_key(&id), "topic:language:rust");
        assert_eq!(category_key(TopicCategory::Language), "topic:category:language");
    }
}
