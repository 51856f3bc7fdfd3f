//! Core types for the topic taxonomy.
//!
//! These types model the hierarchical topic tree, the token-match patterns
//! attached to each topic, and the results of classifying free text.
//!
//! With the `typescript` feature enabled, these types can be exported to
//! TypeScript using ts-rs for consistency with the Angular frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::error::TaxonomyError;

/// Maximum number of colon-separated segments in a topic id.
pub const MAX_TOPIC_DEPTH: usize = 5;
/// Minimum total length of a topic id.
pub const MIN_TOPIC_ID_LEN: usize = 2;
/// Maximum total length of a topic id.
pub const MAX_TOPIC_ID_LEN: usize = 100;

/// Hierarchical topic identifier.
///
/// Colon-separated lowercase segments encoding taxonomy depth, e.g.
/// `language:rust:ownership`. A topic's parent id is always a strict
/// prefix of its own id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
    /// Parse and validate a topic id.
    ///
    /// Rules: 2-100 chars total, 1-5 colon-separated segments, each
    /// segment non-empty and limited to lowercase alphanumerics and
    /// underscores.
    pub fn parse(raw: &str) -> Result<Self, TaxonomyError> {
        let invalid = |reason: &str| TaxonomyError::InvalidTopicId {
            id: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.len() < MIN_TOPIC_ID_LEN || raw.len() > MAX_TOPIC_ID_LEN {
            return Err(invalid("length must be 2-100 characters"));
        }

        let segments: Vec<&str> = raw.split(':').collect();
        if segments.len() > MAX_TOPIC_DEPTH {
            return Err(invalid("at most 5 segments"));
        }
        for segment in &segments {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            if !segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            {
                return Err(invalid(
                    "segments must be lowercase alphanumerics or underscores",
                ));
            }
        }

        Ok(Self(raw.to_string()))
    }

    /// Get the raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of segments (1 for a root topic).
    pub fn depth(&self) -> usize {
        self.0.split(':').count()
    }

    /// Iterate the colon-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(':')
    }

    /// The id one level up, or `None` for a root topic.
    pub fn parent(&self) -> Option<TopicId> {
        self.0.rfind(':').map(|idx| TopicId(self.0[..idx].to_string()))
    }

    /// Whether this id is a strict prefix-ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &TopicId) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == b':'
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category a topic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum TopicCategory {
    /// Programming language
    Language,
    /// Library or framework
    Framework,
    /// Developer tool
    Tool,
    /// Abstract concept or theory
    Concept,
    /// Platform or runtime environment
    Platform,
    /// Engineering practice
    Practice,
    /// Application domain
    Domain,
}

impl TopicCategory {
    /// String form used in storage keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::Framework => "framework",
            Self::Tool => "tool",
            Self::Concept => "concept",
            Self::Platform => "platform",
            Self::Practice => "practice",
            Self::Domain => "domain",
        }
    }
}

/// Learner difficulty level, ordered ascending.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    /// No prior exposure assumed
    #[default]
    Beginner,
    /// Comfortable with fundamentals
    Intermediate,
    /// Working knowledge of the area
    Advanced,
    /// Deep specialist knowledge
    Expert,
}

/// Publication status of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    /// Considered by the matcher and shown to users
    #[default]
    Active,
    /// Kept for old references, excluded from matching by default
    Deprecated,
    /// Work in progress, excluded from matching by default
    Draft,
}

/// How a token pattern compares against an input token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum TokenMatchMode {
    /// Exact equality
    #[default]
    Exact,
    /// Input token starts with the pattern token
    Prefix,
    /// Input token contains the pattern token
    Contains,
}

fn default_weight() -> f32 {
    1.0
}

/// A single weighted token pattern.
///
/// Pattern tokens are stored normalized (lowercase). Matching is plain
/// string comparison only; there is deliberately no regex support, so
/// match cost is linear in token length.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct TokenPattern {
    /// Normalized lowercase token
    pub token: String,
    /// Comparison mode
    #[serde(default)]
    pub mode: TokenMatchMode,
    /// Contribution to the topic score when matched
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// If true, the topic is disqualified when this pattern does not match
    #[serde(default)]
    pub required: bool,
}

impl TokenPattern {
    /// Exact-match pattern with the given weight.
    pub fn exact(token: impl Into<String>, weight: f32) -> Self {
        Self {
            token: token.into(),
            mode: TokenMatchMode::Exact,
            weight,
            required: false,
        }
    }

    /// Mark this pattern as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// The full match definition attached to a topic.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct TokenMatchPattern {
    /// Patterns that add to the score
    #[serde(default)]
    pub include: Vec<TokenPattern>,
    /// Patterns that subtract from the score
    #[serde(default)]
    pub exclude: Vec<TokenPattern>,
    /// Minimum score for this topic to be returned; falls back to the
    /// matcher's global default when absent
    #[serde(default)]
    pub min_score: Option<f32>,
    /// If true, every include pattern must match
    #[serde(default)]
    pub require_all: bool,
}

/// Registry bookkeeping for a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct TopicMetadata {
    /// When the topic was created
    pub created_at: DateTime<Utc>,
    /// When the topic was last updated
    pub updated_at: DateTime<Utc>,
    /// Monotonically increasing version, starts at 1
    pub version: u32,
}

/// A topic in the taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct TopicDefinition {
    /// Hierarchical identifier
    pub id: TopicId,
    /// Human-readable name
    pub name: String,
    /// Short description
    pub description: String,
    /// Category (fixed at creation)
    pub category: TopicCategory,
    /// Parent topic (fixed at creation)
    pub parent_id: Option<TopicId>,
    /// Difficulty level
    pub difficulty: DifficultyLevel,
    /// Publication status
    pub status: TopicStatus,
    /// Token-match definition
    pub patterns: TokenMatchPattern,
    /// Alternative names, folded into matching at full weight
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Related (non-prerequisite) topics
    #[serde(default)]
    pub related_topics: Vec<TopicId>,
    /// Topics that should be learned first
    #[serde(default)]
    pub prerequisites: Vec<TopicId>,
    /// Child topics, maintained by the registry and never user-supplied
    #[serde(default)]
    pub child_ids: Vec<TopicId>,
    /// Supporting keywords, folded into matching at half weight
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Registry bookkeeping
    pub metadata: TopicMetadata,
}

/// Input for creating a topic.
///
/// `child_ids`, `status` and `metadata` are registry-derived and therefore
/// absent here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CreateTopicInput {
    /// Hierarchical identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Category
    pub category: TopicCategory,
    /// Parent topic id; must already exist
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Difficulty level
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    /// Token-match definition
    #[serde(default)]
    pub patterns: TokenMatchPattern,
    /// Alternative names
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Related topics
    #[serde(default)]
    pub related_topics: Vec<String>,
    /// Prerequisite topics
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Supporting keywords
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Partial update for a topic.
///
/// Identity fields (`id`, `category`, `parent_id`) cannot be changed and
/// are therefore absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct TopicUpdate {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New difficulty
    pub difficulty: Option<DifficultyLevel>,
    /// New status
    pub status: Option<TopicStatus>,
    /// Replacement match definition
    pub patterns: Option<TokenMatchPattern>,
    /// Replacement aliases
    pub aliases: Option<Vec<String>>,
    /// Replacement related topics
    pub related_topics: Option<Vec<TopicId>>,
    /// Replacement prerequisites
    pub prerequisites: Option<Vec<TopicId>>,
    /// Replacement keywords
    pub keywords: Option<Vec<String>>,
}

/// Confidence bucket for a topic match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    /// Score at or above the high threshold
    High,
    /// Score at or above the medium threshold
    Medium,
    /// Score at or above the accept threshold
    Low,
}

/// A single ranked result from topic classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct TopicMatchResult {
    /// Matched topic
    pub topic_id: TopicId,
    /// Accumulated score
    pub score: f32,
    /// Confidence bucket derived from the score
    pub confidence: MatchConfidence,
    /// Input tokens that contributed to the score
    pub matched_tokens: Vec<String>,
}

/// A node in the rendered topic tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct TopicTreeNode {
    /// The topic at this node
    pub topic: TopicDefinition,
    /// Depth relative to the traversal root (root = 0)
    pub depth: usize,
    /// Ids from the traversal root down to this node, inclusive
    pub path: Vec<TopicId>,
    /// Child nodes
    pub children: Vec<TopicTreeNode>,
}

/// A row in the linearized topic tree, for list rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct FlattenedTopic {
    /// Topic id
    pub topic_id: TopicId,
    /// Topic name
    pub name: String,
    /// Depth relative to the traversal root
    pub depth: usize,
    /// Whether this is the last child of its parent
    pub is_last_child: bool,
}

/// An ordered learning path toward a target topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct LearningPath {
    /// Prerequisites plus the target, ordered by ascending depth with the
    /// target last
    pub topics: Vec<TopicDefinition>,
    /// Difficulty of each step, in path order
    pub difficulty_progression: Vec<DifficultyLevel>,
    /// Total time estimate; always `None` here, resource-time aggregation
    /// is the selector's job
    pub estimated_minutes: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_id_parse_valid() {
        let id = TopicId::parse("language:rust:ownership").unwrap();
        assert_eq!(id.depth(), 3);
        assert_eq!(id.parent().unwrap().as_str(), "language:rust");
        assert_eq!(id.segments().count(), 3);
    }

    #[test]
    fn test_topic_id_parse_invalid() {
        assert!(TopicId::parse("").is_err());
        assert!(TopicId::parse("x").is_err());
        assert!(TopicId::parse("Language:Rust").is_err());
        assert!(TopicId::parse("language::rust").is_err());
        assert!(TopicId::parse("a:b:c:d:e:f").is_err());
        assert!(TopicId::parse("language rust").is_err());
        assert!(TopicId::parse(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_ancestor_check() {
        let lang = TopicId::parse("language").unwrap();
        let rust = TopicId::parse("language:rust").unwrap();
        let rustlike = TopicId::parse("language_extras").unwrap();

        assert!(lang.is_ancestor_of(&rust));
        assert!(!rust.is_ancestor_of(&lang));
        assert!(!rust.is_ancestor_of(&rust));
        // Prefix on the string level but not on the segment level
        assert!(!lang.is_ancestor_of(&rustlike));
    }

    #[test]
    fn test_root_has_no_parent() {
        let id = TopicId::parse("language").unwrap();
        assert!(id.parent().is_none());
        assert_eq!(id.depth(), 1);
    }

    #[test]
    fn test_difficulty_ordering() {
        assert!(DifficultyLevel::Beginner < DifficultyLevel::Intermediate);
        assert!(DifficultyLevel::Advanced < DifficultyLevel::Expert);
    }

    #[test]
    fn test_token_pattern_defaults() {
        let pattern: TokenPattern = serde_json::from_str(r#"{"token":"rust"}"#).unwrap();
        assert_eq!(pattern.mode, TokenMatchMode::Exact);
        assert_eq!(pattern.weight, 1.0);
        assert!(!pattern.required);
    }
}
