//! Topic registry with owned matcher.
//!
//! The registry exclusively owns all topic definitions and the compiled
//! token matcher built from them. Every mutation validates fully before
//! touching any internal map, then rebuilds the matcher; a failed mutation
//! leaves the registry in its prior consistent state.
//!
//! Mutations take `&mut self`, so concurrent mutation is excluded at
//! compile time. Callers that need shared access wrap the registry in
//! `tokio::sync::RwLock`; reads may then run concurrently while writes
//! (mutate-then-rebuild) are serialized. The full rebuild on every
//! mutation is an accepted cost: topic sets are human-curated, hundreds
//! at most, not request-scale.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Utc;

use crate::error::TaxonomyError;
use crate::matcher::{normalize_text, MatchOptions, TokenMatcher};
use crate::types::{
    CreateTopicInput, TopicCategory, TopicDefinition, TopicId, TopicMatchResult, TopicMetadata,
    TopicStatus, TopicUpdate,
};

/// Hierarchical topic registry.
///
/// Construct one instance and pass it by reference; there is deliberately
/// no global singleton so tests can hold multiple isolated registries.
#[derive(Default)]
pub struct TopicTaxonomy {
    /// All topics by id
    pub(crate) topics: HashMap<TopicId, TopicDefinition>,
    /// Secondary index by category
    pub(crate) by_category: HashMap<TopicCategory, Vec<TopicId>>,
    /// Compiled matcher over the current topic set
    matcher: TokenMatcher,
}

impl TopicTaxonomy {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new topic.
    ///
    /// Validates the id format, uniqueness, parent linkage and
    /// prerequisites before any state changes. The new topic starts at
    /// `status = active`, `version = 1`, with empty `child_ids`.
    pub fn create(&mut self, input: CreateTopicInput) -> Result<TopicDefinition, TaxonomyError> {
        let id = TopicId::parse(&input.id)?;

        if self.topics.contains_key(&id) {
            return Err(TaxonomyError::TopicExists(id.to_string()));
        }

        let parent_id = match &input.parent_id {
            Some(raw) => {
                let parent = TopicId::parse(raw)?;
                if !self.topics.contains_key(&parent) {
                    return Err(TaxonomyError::ParentNotFound(parent.to_string()));
                }
                if !parent.is_ancestor_of(&id) {
                    return Err(TaxonomyError::InvalidTopicId {
                        id: id.to_string(),
                        reason: format!("parent '{parent}' is not a prefix-ancestor"),
                    });
                }
                Some(parent)
            }
            None => None,
        };

        let prerequisites = self.validate_prerequisites(&id, &input.prerequisites)?;
        let related_topics = input
            .related_topics
            .iter()
            .map(|raw| TopicId::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let now = Utc::now();
        let topic = TopicDefinition {
            id: id.clone(),
            name: input.name,
            description: input.description,
            category: input.category,
            parent_id: parent_id.clone(),
            difficulty: input.difficulty,
            status: TopicStatus::Active,
            patterns: input.patterns,
            aliases: input.aliases,
            related_topics,
            prerequisites,
            child_ids: Vec::new(),
            keywords: input.keywords,
            metadata: TopicMetadata {
                created_at: now,
                updated_at: now,
                version: 1,
            },
        };

        // All validation passed; mutate.
        if let Some(parent) = &parent_id {
            if let Some(parent_topic) = self.topics.get_mut(parent) {
                parent_topic.child_ids.push(id.clone());
            }
        }
        self.by_category
            .entry(topic.category)
            .or_default()
            .push(id.clone());
        self.topics.insert(id.clone(), topic.clone());

        self.rebuild_matcher();
        tracing::debug!(topic_id = %id, "Created topic");

        Ok(topic)
    }

    /// Apply a partial update to a topic.
    ///
    /// Identity fields (`id`, `category`, `parent_id`) never change.
    /// Bumps the version and rebuilds the matcher unconditionally.
    pub fn update(
        &mut self,
        id: &TopicId,
        update: TopicUpdate,
    ) -> Result<TopicDefinition, TaxonomyError> {
        if !self.topics.contains_key(id) {
            return Err(TaxonomyError::TopicNotFound(id.to_string()));
        }

        // Validate replacement prerequisites against the current graph
        // before touching the topic.
        let prerequisites = match &update.prerequisites {
            Some(prereqs) => {
                let raw: Vec<String> = prereqs.iter().map(|p| p.to_string()).collect();
                Some(self.validate_prerequisites(id, &raw)?)
            }
            None => None,
        };

        let topic = self
            .topics
            .get_mut(id)
            .ok_or_else(|| TaxonomyError::TopicNotFound(id.to_string()))?;

        if let Some(name) = update.name {
            topic.name = name;
        }
        if let Some(description) = update.description {
            topic.description = description;
        }
        if let Some(difficulty) = update.difficulty {
            topic.difficulty = difficulty;
        }
        if let Some(status) = update.status {
            topic.status = status;
        }
        if let Some(patterns) = update.patterns {
            topic.patterns = patterns;
        }
        if let Some(aliases) = update.aliases {
            topic.aliases = aliases;
        }
        if let Some(related) = update.related_topics {
            topic.related_topics = related;
        }
        if let Some(prereqs) = prerequisites {
            topic.prerequisites = prereqs;
        }
        if let Some(keywords) = update.keywords {
            topic.keywords = keywords;
        }

        topic.metadata.version += 1;
        topic.metadata.updated_at = Utc::now();
        let updated = topic.clone();

        self.rebuild_matcher();
        tracing::debug!(topic_id = %id, version = updated.metadata.version, "Updated topic");

        Ok(updated)
    }

    /// Delete a topic.
    ///
    /// Rejected with `HAS_CHILDREN` while child topics exist; delete the
    /// children first. There is no cascade and no reparenting.
    pub fn delete(&mut self, id: &TopicId) -> Result<(), TaxonomyError> {
        let topic = self
            .topics
            .get(id)
            .ok_or_else(|| TaxonomyError::TopicNotFound(id.to_string()))?;

        if !topic.child_ids.is_empty() {
            return Err(TaxonomyError::HasChildren(id.to_string()));
        }

        let parent_id = topic.parent_id.clone();
        let category = topic.category;

        self.topics.remove(id);
        if let Some(parent) = parent_id {
            if let Some(parent_topic) = self.topics.get_mut(&parent) {
                parent_topic.child_ids.retain(|c| c != id);
            }
        }
        if let Some(ids) = self.by_category.get_mut(&category) {
            ids.retain(|c| c != id);
        }

        self.rebuild_matcher();
        tracing::debug!(topic_id = %id, "Deleted topic");

        Ok(())
    }

    /// Get a topic by id.
    pub fn get(&self, id: &TopicId) -> Option<&TopicDefinition> {
        self.topics.get(id)
    }

    /// Get the direct children of a topic.
    pub fn get_children(&self, id: &TopicId) -> Vec<&TopicDefinition> {
        self.topics
            .get(id)
            .map(|t| {
                t.child_ids
                    .iter()
                    .filter_map(|c| self.topics.get(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get all topics in a category, in registration order.
    pub fn get_by_category(&self, category: TopicCategory) -> Vec<&TopicDefinition> {
        self.by_category
            .get(&category)
            .map(|ids| ids.iter().filter_map(|id| self.topics.get(id)).collect())
            .unwrap_or_default()
    }

    /// Iterate all topics in unspecified order.
    pub fn all(&self) -> impl Iterator<Item = &TopicDefinition> {
        self.topics.values()
    }

    /// Number of registered topics.
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Classify free text against the registered topics.
    ///
    /// Normalizes the text and runs the compiled matcher; unmatched text
    /// yields an empty list.
    pub fn classify(&self, text: &str, options: &MatchOptions) -> Vec<TopicMatchResult> {
        self.match_tokens(&normalize_text(text), options)
    }

    /// Match a pre-normalized token set against the registered topics.
    pub fn match_tokens(
        &self,
        tokens: &BTreeSet<String>,
        options: &MatchOptions,
    ) -> Vec<TopicMatchResult> {
        self.matcher.match_tokens(tokens, options)
    }

    /// Parse and validate a prerequisite list: every id must parse, refer
    /// to an existing topic, and must not introduce a cycle through the
    /// current prerequisite graph.
    fn validate_prerequisites(
        &self,
        topic_id: &TopicId,
        raw: &[String],
    ) -> Result<Vec<TopicId>, TaxonomyError> {
        let mut prerequisites = Vec::with_capacity(raw.len());
        for raw_id in raw {
            let prereq = TopicId::parse(raw_id)?;
            if prereq == *topic_id {
                return Err(TaxonomyError::CircularReference(topic_id.to_string()));
            }
            if !self.topics.contains_key(&prereq) {
                return Err(TaxonomyError::TopicNotFound(prereq.to_string()));
            }
            let mut visited = HashSet::new();
            if self.reaches(&prereq, topic_id, &mut visited) {
                return Err(TaxonomyError::CircularReference(format!(
                    "{topic_id} -> {prereq}"
                )));
            }
            prerequisites.push(prereq);
        }
        Ok(prerequisites)
    }

    /// Whether `target` is reachable from `from` along prerequisite edges.
    fn reaches(&self, from: &TopicId, target: &TopicId, visited: &mut HashSet<TopicId>) -> bool {
        if from == target {
            return true;
        }
        if !visited.insert(from.clone()) {
            return false;
        }
        self.topics
            .get(from)
            .map(|t| {
                t.prerequisites
                    .iter()
                    .any(|p| self.reaches(p, target, visited))
            })
            .unwrap_or(false)
    }

    fn rebuild_matcher(&mut self) {
        self.matcher = TokenMatcher::compile(self.topics.values());
        tracing::debug!(topics = self.topics.len(), "Rebuilt token matcher");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TokenMatchPattern, TokenPattern};

    fn input(id: &str, parent: Option<&str>) -> CreateTopicInput {
        CreateTopicInput {
            id: id.to_string(),
            name: id.to_string(),
            description: format!("About {id}"),
            category: TopicCategory::Language,
            parent_id: parent.map(|p| p.to_string()),
            difficulty: Default::default(),
            patterns: TokenMatchPattern::default(),
            aliases: vec![],
            related_topics: vec![],
            prerequisites: vec![],
            keywords: vec![],
        }
    }

    fn seed_language_rust(registry: &mut TopicTaxonomy) {
        registry.create(input("language", None)).unwrap();

        let mut rust = input("language:rust", Some("language"));
        rust.patterns = TokenMatchPattern {
            include: vec![
                TokenPattern::exact("rust", 1.5).required(),
                TokenPattern::exact("cargo", 0.5),
            ],
            ..Default::default()
        };
        registry.create(rust).unwrap();
    }

    #[test]
    fn test_create_then_get_roundtrip() {
        let mut registry = TopicTaxonomy::new();
        let created = registry.create(input("language", None)).unwrap();

        let fetched = registry
            .get(&TopicId::parse("language").unwrap())
            .unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.name, created.name);
        assert_eq!(fetched.metadata.version, 1);
        assert_eq!(fetched.status, TopicStatus::Active);
        assert!(fetched.child_ids.is_empty());
    }

    #[test]
    fn test_duplicate_create_rejected() {
        let mut registry = TopicTaxonomy::new();
        registry.create(input("language", None)).unwrap();

        let err = registry.create(input("language", None)).unwrap_err();
        assert_eq!(err.code(), "TOPIC_EXISTS");
    }

    #[test]
    fn test_parent_must_exist() {
        let mut registry = TopicTaxonomy::new();
        let err = registry
            .create(input("language:rust", Some("language")))
            .unwrap_err();
        assert_eq!(err.code(), "PARENT_NOT_FOUND");
    }

    #[test]
    fn test_parent_must_be_prefix_ancestor() {
        let mut registry = TopicTaxonomy::new();
        registry.create(input("tool", None)).unwrap();

        let err = registry
            .create(input("language:rust", Some("tool")))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_TOPIC_ID");
    }

    #[test]
    fn test_id_format_checked_before_existence() {
        let mut registry = TopicTaxonomy::new();
        let err = registry.create(input("Bad Id", None)).unwrap_err();
        assert_eq!(err.code(), "INVALID_TOPIC_ID");
    }

    #[test]
    fn test_create_links_parent_and_category() {
        let mut registry = TopicTaxonomy::new();
        seed_language_rust(&mut registry);

        let language = TopicId::parse("language").unwrap();
        let rust = TopicId::parse("language:rust").unwrap();
        assert_eq!(registry.get(&language).unwrap().child_ids, vec![rust]);
        assert_eq!(registry.get_by_category(TopicCategory::Language).len(), 2);
    }

    #[test]
    fn test_failed_create_leaves_no_partial_state() {
        let mut registry = TopicTaxonomy::new();
        registry.create(input("language", None)).unwrap();

        // Fails on a nonexistent prerequisite, after parent validation.
        let mut bad = input("language:rust", Some("language"));
        bad.prerequisites = vec!["concept:memory".to_string()];
        assert!(registry.create(bad).is_err());

        let language = TopicId::parse("language").unwrap();
        assert!(registry.get(&language).unwrap().child_ids.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_update_bumps_version() {
        let mut registry = TopicTaxonomy::new();
        registry.create(input("language", None)).unwrap();
        let id = TopicId::parse("language").unwrap();

        let updated = registry
            .update(
                &id,
                TopicUpdate {
                    name: Some("Programming Languages".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.metadata.version, 2);
        assert_eq!(updated.name, "Programming Languages");
        // Identity fields untouched
        assert_eq!(updated.category, TopicCategory::Language);
        assert!(updated.parent_id.is_none());
    }

    #[test]
    fn test_update_missing_topic() {
        let mut registry = TopicTaxonomy::new();
        let id = TopicId::parse("language").unwrap();
        let err = registry.update(&id, TopicUpdate::default()).unwrap_err();
        assert_eq!(err.code(), "TOPIC_NOT_FOUND");
    }

    #[test]
    fn test_delete_with_children_rejected() {
        let mut registry = TopicTaxonomy::new();
        seed_language_rust(&mut registry);

        let language = TopicId::parse("language").unwrap();
        let err = registry.delete(&language).unwrap_err();
        assert_eq!(err.code(), "HAS_CHILDREN");

        // Deleting the leaf first unblocks the parent.
        let rust = TopicId::parse("language:rust").unwrap();
        registry.delete(&rust).unwrap();
        registry.delete(&language).unwrap();
        assert!(registry.is_empty());
        assert!(registry.get_by_category(TopicCategory::Language).is_empty());
    }

    #[test]
    fn test_prerequisite_cycle_rejected() {
        let mut registry = TopicTaxonomy::new();
        registry.create(input("concept", None)).unwrap();
        registry
            .create(input("concept:memory", Some("concept")))
            .unwrap();

        let mut pointers = input("concept:pointers", Some("concept"));
        pointers.prerequisites = vec!["concept:memory".to_string()];
        registry.create(pointers).unwrap();

        // memory -> pointers would close the loop pointers -> memory.
        let memory = TopicId::parse("concept:memory").unwrap();
        let err = registry
            .update(
                &memory,
                TopicUpdate {
                    prerequisites: Some(vec![TopicId::parse("concept:pointers").unwrap()]),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), "CIRCULAR_REFERENCE");

        // Self-reference is also a cycle.
        let err = registry
            .update(
                &memory,
                TopicUpdate {
                    prerequisites: Some(vec![memory.clone()]),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), "CIRCULAR_REFERENCE");
    }

    #[test]
    fn test_classify_learn_rust() {
        let mut registry = TopicTaxonomy::new();
        seed_language_rust(&mut registry);

        let results = registry.classify("I want to learn rust and cargo", &MatchOptions::default());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic_id.as_str(), "language:rust");
        assert!(results[0].score >= 2.0);
        assert_eq!(results[0].confidence, crate::types::MatchConfidence::High);
    }

    #[test]
    fn test_matcher_rebuilt_after_delete() {
        let mut registry = TopicTaxonomy::new();
        seed_language_rust(&mut registry);

        let rust = TopicId::parse("language:rust").unwrap();
        registry.delete(&rust).unwrap();

        let results = registry.classify("rust and cargo", &MatchOptions::default());
        assert!(results.is_empty());
    }
}
