//! Weighted, regex-free token matching.
//!
//! Scores pre-normalized token sets against topic match definitions using
//! only exact, prefix and substring comparisons. Every comparison is linear
//! in token length, so the matcher cannot exhibit catastrophic backtracking
//! no matter what the input text looks like.
//!
//! The matcher is a pure function over its compiled topic set: the same
//! token set always yields the same ranked results.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::types::{
    MatchConfidence, TokenMatchMode, TokenPattern, TopicDefinition, TopicId, TopicMatchResult,
    TopicStatus,
};

/// Score at or above which a match is high confidence.
pub const HIGH_CONFIDENCE_SCORE: f32 = 2.0;
/// Score at or above which a match is medium confidence.
pub const MEDIUM_CONFIDENCE_SCORE: f32 = 1.0;
/// Global accept threshold when a topic does not set its own `min_score`.
pub const DEFAULT_MIN_SCORE: f32 = 0.5;

/// Weight of the exact patterns derived from topic aliases.
pub const ALIAS_WEIGHT: f32 = 1.0;
/// Weight of the exact patterns derived from topic keywords.
pub const KEYWORD_WEIGHT: f32 = 0.5;

/// Options for a single classification query.
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// Fallback accept threshold for topics without their own `min_score`
    pub min_score: f32,
    /// Truncate the ranked results to at most this many entries
    pub max_results: Option<usize>,
    /// Consider draft topics
    pub include_draft: bool,
    /// Consider deprecated topics
    pub include_deprecated: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            max_results: None,
            include_draft: false,
            include_deprecated: false,
        }
    }
}

/// Normalize free text into the token set the matcher consumes.
///
/// Lowercases and splits on non-alphanumeric boundaries; the returned set
/// is de-duplicated and deterministically ordered.
pub fn normalize_text(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// A topic's match definition, flattened for scoring.
#[derive(Debug, Clone)]
struct CompiledTopic {
    topic_id: TopicId,
    depth: usize,
    status: TopicStatus,
    include: Vec<TokenPattern>,
    exclude: Vec<TokenPattern>,
    min_score: Option<f32>,
    require_all: bool,
}

/// Compiled token matcher over a snapshot of the topic set.
///
/// Rebuilt in full by the registry on every topic mutation. Holds no
/// references back into the registry, so a rebuilt matcher can replace the
/// old one atomically.
#[derive(Debug, Default)]
pub struct TokenMatcher {
    topics: Vec<CompiledTopic>,
}

impl TokenMatcher {
    /// Compile a matcher from the full topic set.
    ///
    /// Besides the declared include patterns, each alias contributes an
    /// exact pattern at full weight and each keyword an exact pattern at
    /// half weight. Status filtering happens at query time so one compiled
    /// matcher serves both default and draft-inclusive queries.
    pub fn compile<'a>(topics: impl IntoIterator<Item = &'a TopicDefinition>) -> Self {
        let mut compiled = Vec::new();

        for topic in topics {
            let mut include = topic.patterns.include.clone();
            for alias in &topic.aliases {
                include.push(TokenPattern::exact(alias.to_lowercase(), ALIAS_WEIGHT));
            }
            for keyword in &topic.keywords {
                include.push(TokenPattern::exact(keyword.to_lowercase(), KEYWORD_WEIGHT));
            }

            compiled.push(CompiledTopic {
                topic_id: topic.id.clone(),
                depth: topic.id.depth(),
                status: topic.status,
                include,
                exclude: topic.patterns.exclude.clone(),
                min_score: topic.patterns.min_score,
                require_all: topic.patterns.require_all,
            });
        }

        Self { topics: compiled }
    }

    /// Number of topics in the compiled set.
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Score the token set against every eligible topic and rank the
    /// accepted matches.
    ///
    /// Ranking: score descending, then topic depth descending (more
    /// specific topics first), then topic id ascending for determinism.
    /// Unmatched input yields an empty list, never an error.
    pub fn match_tokens(
        &self,
        tokens: &BTreeSet<String>,
        options: &MatchOptions,
    ) -> Vec<TopicMatchResult> {
        let mut results: Vec<(TopicMatchResult, usize)> = Vec::new();

        for topic in &self.topics {
            match topic.status {
                TopicStatus::Active => {}
                TopicStatus::Draft if !options.include_draft => continue,
                TopicStatus::Deprecated if !options.include_deprecated => continue,
                _ => {}
            }

            if let Some(result) = Self::score_topic(topic, tokens, options) {
                results.push((result, topic.depth));
            }
        }

        results.sort_by(|(a, depth_a), (b, depth_b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| depth_b.cmp(depth_a))
                .then_with(|| a.topic_id.cmp(&b.topic_id))
        });

        let mut ranked: Vec<TopicMatchResult> = results.into_iter().map(|(r, _)| r).collect();
        if let Some(max) = options.max_results {
            ranked.truncate(max);
        }
        ranked
    }

    /// Score a single topic, returning `None` when it is disqualified or
    /// below its accept threshold.
    fn score_topic(
        topic: &CompiledTopic,
        tokens: &BTreeSet<String>,
        options: &MatchOptions,
    ) -> Option<TopicMatchResult> {
        let mut score = 0.0f32;
        let mut matched_tokens: Vec<String> = Vec::new();
        let mut include_hits = 0usize;

        for pattern in &topic.include {
            match tokens.iter().find(|t| pattern_matches(pattern, t)) {
                Some(token) => {
                    score += pattern.weight;
                    include_hits += 1;
                    if !matched_tokens.contains(token) {
                        matched_tokens.push(token.clone());
                    }
                }
                None if pattern.required => return None,
                None => {}
            }
        }

        if topic.require_all && include_hits < topic.include.len() {
            return None;
        }

        for pattern in &topic.exclude {
            if tokens.iter().any(|t| pattern_matches(pattern, t)) {
                score -= pattern.weight;
            }
        }

        let threshold = topic.min_score.unwrap_or(options.min_score);
        if score < threshold {
            return None;
        }

        Some(TopicMatchResult {
            topic_id: topic.topic_id.clone(),
            score,
            confidence: confidence_for(score),
            matched_tokens,
        })
    }
}

/// Bucket a score into a confidence level.
pub fn confidence_for(score: f32) -> MatchConfidence {
    if score >= HIGH_CONFIDENCE_SCORE {
        MatchConfidence::High
    } else if score >= MEDIUM_CONFIDENCE_SCORE {
        MatchConfidence::Medium
    } else {
        MatchConfidence::Low
    }
}

fn pattern_matches(pattern: &TokenPattern, token: &str) -> bool {
    match pattern.mode {
        TokenMatchMode::Exact => token == pattern.token,
        TokenMatchMode::Prefix => token.starts_with(&pattern.token),
        TokenMatchMode::Contains => token.contains(&pattern.token),
    }
}
