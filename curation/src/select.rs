//! Budget-constrained resource selection.
//!
//! Greedy weighted set cover over verified resources: each pick is the
//! resource with the highest marginal value, where value is the number of
//! still-uncovered requested topics it covers weighted by its quality
//! composite. Greedy is deliberate; the pool is small and the learner
//! cares more about a predictable, explainable ordering than about the
//! optimal cover.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taxonomy::TopicId;

use crate::config::SelectionDefaults;
use crate::types::{ResourceId, ResourceProvider, VerifiedResource};

/// Assumed minutes for a resource without a time estimate.
pub const DEFAULT_ESTIMATED_MINUTES: u32 = 30;

/// Constraints for one selection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ResourceSelectionCriteria {
    /// Topics the selection should cover
    pub requested_topics: Vec<TopicId>,
    /// Maximum number of resources to select
    pub max_resources: usize,
    /// Total consumption time budget in minutes
    pub max_total_minutes: u32,
    /// Minimum quality composite for pool admission
    pub min_quality_score: f32,
    /// Prefer a different provider or content type than the previous pick
    /// on ties
    pub prioritize_variety: bool,
}

impl ResourceSelectionCriteria {
    /// Criteria for the given topics with configured default budgets.
    pub fn for_topics(topics: Vec<TopicId>, defaults: &SelectionDefaults) -> Self {
        Self {
            requested_topics: topics,
            max_resources: defaults.max_resources,
            max_total_minutes: defaults.max_total_minutes,
            min_quality_score: defaults.min_quality_score,
            prioritize_variety: defaults.prioritize_variety,
        }
    }
}

/// Outcome of a selection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ResourceSelectionResult {
    /// Selected resources, in pick order
    pub selected: Vec<VerifiedResource>,
    /// Requested topics covered by the selection
    pub covered_topics: Vec<TopicId>,
    /// Requested topics no admitted resource covers
    pub uncovered_topics: Vec<TopicId>,
    /// Sum of estimated minutes across the selection
    pub total_minutes: u32,
    /// Run diagnostics
    pub metadata: SelectionMetadata,
}

/// Diagnostics attached to every selection result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SelectionMetadata {
    /// Unique id for this run
    pub selection_id: String,
    /// Resources admitted to the pool after filtering
    pub pool_size: usize,
    /// Resources rejected by the admission filter
    pub rejected_count: usize,
    /// Wall-clock time the run took
    pub selection_time_ms: u64,
}

/// Greedy budget-constrained selector.
pub struct ResourceSelector;

impl ResourceSelector {
    /// Select resources covering the requested topics within budget.
    ///
    /// Admission requires `recommended` and the quality floor. Picks stop
    /// when budgets are exhausted or no remaining resource covers a new
    /// requested topic. Empty inputs yield a valid empty result.
    pub fn select(
        pool: &[VerifiedResource],
        criteria: &ResourceSelectionCriteria,
    ) -> ResourceSelectionResult {
        let started = Instant::now();

        let mut admitted: Vec<&VerifiedResource> = pool
            .iter()
            .filter(|r| r.is_recommended() && r.quality.composite >= criteria.min_quality_score)
            .collect();
        let rejected_count = pool.len() - admitted.len();

        let requested: BTreeSet<&TopicId> = criteria.requested_topics.iter().collect();
        let mut uncovered: BTreeSet<&TopicId> = requested.clone();

        let mut selected: Vec<VerifiedResource> = Vec::new();
        let mut total_minutes: u32 = 0;
        let mut last_pick: Option<(ResourceProvider, Option<String>)> = None;
        let pool_size = admitted.len();

        while selected.len() < criteria.max_resources && !uncovered.is_empty() {
            let best = admitted
                .iter()
                .enumerate()
                .filter_map(|(idx, r)| {
                    let newly_covered = r
                        .topic_ids
                        .iter()
                        .filter(|t| uncovered.contains(t))
                        .count();
                    if newly_covered == 0 {
                        return None;
                    }
                    let value = newly_covered as f32 * r.quality.composite;
                    Some((idx, value))
                })
                .max_by(|(a_idx, a_value), (b_idx, b_value)| {
                    compare_picks(
                        (admitted[*a_idx], *a_value),
                        (admitted[*b_idx], *b_value),
                        last_pick.as_ref(),
                        criteria.prioritize_variety,
                    )
                });

            let Some((idx, _)) = best else {
                break; // nothing left covers a new topic
            };

            let pick = admitted.remove(idx);
            let minutes = pick.estimated_minutes.unwrap_or(DEFAULT_ESTIMATED_MINUTES);
            if total_minutes.saturating_add(minutes) > criteria.max_total_minutes {
                break;
            }

            total_minutes += minutes;
            for topic in &pick.topic_ids {
                uncovered.remove(topic);
            }
            last_pick = Some((pick.provider, pick.evidence.content_type.clone()));
            selected.push(pick.clone());
        }

        let covered_topics: Vec<TopicId> = requested
            .iter()
            .filter(|t| !uncovered.contains(**t))
            .map(|t| (*t).clone())
            .collect();
        let uncovered_topics: Vec<TopicId> = uncovered.iter().map(|t| (*t).clone()).collect();

        let metadata = SelectionMetadata {
            selection_id: Uuid::new_v4().to_string(),
            pool_size,
            rejected_count,
            selection_time_ms: started.elapsed().as_millis() as u64,
        };
        tracing::debug!(
            selection_id = %metadata.selection_id,
            selected = selected.len(),
            covered = covered_topics.len(),
            uncovered = uncovered_topics.len(),
            "Selection complete"
        );

        ResourceSelectionResult {
            selected,
            covered_topics,
            uncovered_topics,
            total_minutes,
            metadata,
        }
    }
}

/// Ordering for candidate picks: marginal value, then quality composite,
/// then provider and content-type variety against the previous pick, then
/// resource id for determinism. Greater means preferred.
fn compare_picks(
    a: (&VerifiedResource, f32),
    b: (&VerifiedResource, f32),
    last_pick: Option<&(ResourceProvider, Option<String>)>,
    prioritize_variety: bool,
) -> Ordering {
    let (a_res, a_value) = a;
    let (b_res, b_value) = b;

    match a_value.partial_cmp(&b_value).unwrap_or(Ordering::Equal) {
        Ordering::Equal => {}
        other => return other,
    }
    match a_res
        .quality
        .composite
        .partial_cmp(&b_res.quality.composite)
        .unwrap_or(Ordering::Equal)
    {
        Ordering::Equal => {}
        other => return other,
    }
    if prioritize_variety {
        if let Some((last_provider, last_content_type)) = last_pick {
            let a_varies = a_res.provider != *last_provider;
            let b_varies = b_res.provider != *last_provider;
            match (a_varies, b_varies) {
                (true, false) => return Ordering::Greater,
                (false, true) => return Ordering::Less,
                _ => {}
            }
            // Provider gave no preference; content type is the second
            // variety axis.
            let a_varies = a_res.evidence.content_type != *last_content_type;
            let b_varies = b_res.evidence.content_type != *last_content_type;
            match (a_varies, b_varies) {
                (true, false) => return Ordering::Greater,
                (false, true) => return Ordering::Less,
                _ => {}
            }
        }
    }
    // Reversed so that the lexicographically smaller id wins under max_by.
    b_res.id.cmp(&a_res.id)
}
