//! Quality signal computation.
//!
//! Pure transformations from raw provider metadata to normalized quality
//! signals in [0, 1]. No I/O; callers pass the metadata the enrichment
//! collaborator already fetched.

use chrono::{DateTime, Utc};

use crate::config::QualityWeights;
use crate::types::{ProviderMetadata, QualityDetails, QualitySignals};

/// Subscriber count at which YouTube channel authority saturates.
pub const YOUTUBE_SUBSCRIBER_CAP: u64 = 1_000_000;
/// Fork count at which GitHub repo authority saturates.
pub const GITHUB_FORK_CAP: u64 = 10_000;
/// Recency assigned when the provider reports no publication date.
pub const UNKNOWN_RECENCY: f32 = 0.5;

/// Reading speed used to turn word counts into minutes.
const WORDS_PER_MINUTE: u32 = 200;

/// Saturating normalization of an engagement count.
///
/// `min(1, log10(1 + count) / log10(1 + cap))`: doubling a small count
/// matters, doubling a huge one barely moves the score.
pub fn saturate(count: u64, cap: u64) -> f32 {
    if cap == 0 {
        return 0.0;
    }
    let score = ((1.0 + count as f64).log10() / (1.0 + cap as f64).log10()) as f32;
    score.min(1.0)
}

/// Linear recency decay from a publication timestamp.
pub fn recency_score(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>, max_age_days: i64) -> f32 {
    match published_at {
        Some(published) => {
            let age_days = (now - published).num_days().max(0);
            (1.0 - age_days as f32 / max_age_days as f32).max(0.0)
        }
        None => UNKNOWN_RECENCY,
    }
}

/// Compute normalized quality signals for enriched metadata.
pub fn compute_quality(
    metadata: &ProviderMetadata,
    now: DateTime<Utc>,
    weights: &QualityWeights,
) -> QualitySignals {
    let mut details = QualityDetails::default();

    let (popularity, recency, authority, completeness) = match metadata {
        ProviderMetadata::Youtube {
            view_count,
            like_count,
            channel_subscribers,
            duration_seconds,
            published_at,
            captions_available,
            ..
        } => {
            details.view_count = *view_count;
            details.age_in_days = published_at.map(|p| (now - p).num_days());

            let popularity = saturate(view_count.unwrap_or(0), weights.youtube_view_cap);
            let recency = recency_score(*published_at, now, weights.max_age_days);
            let authority = saturate(channel_subscribers.unwrap_or(0), YOUTUBE_SUBSCRIBER_CAP);
            let completeness = fraction_present(&[
                view_count.is_some(),
                like_count.is_some(),
                channel_subscribers.is_some(),
                duration_seconds.is_some(),
                published_at.is_some(),
                captions_available.is_some(),
            ], &mut details);
            (popularity, recency, authority, completeness)
        }
        ProviderMetadata::Github {
            description,
            stars,
            forks,
            language,
            topics,
            pushed_at,
            archived,
            license,
            ..
        } => {
            details.star_count = *stars;
            details.age_in_days = pushed_at.map(|p| (now - p).num_days());

            let popularity = saturate(stars.unwrap_or(0), weights.github_star_cap);
            // For repositories, freshness means recent pushes, not creation date.
            let recency = recency_score(*pushed_at, now, weights.max_age_days);
            let mut authority = saturate(forks.unwrap_or(0), GITHUB_FORK_CAP);
            if *archived == Some(true) {
                authority *= 0.5;
            }
            let completeness = fraction_present(&[
                description.is_some(),
                stars.is_some(),
                forks.is_some(),
                language.is_some(),
                !topics.is_empty(),
                pushed_at.is_some(),
                archived.is_some(),
                license.is_some(),
            ], &mut details);
            (popularity, recency, authority, completeness)
        }
        ProviderMetadata::WebPage {
            title,
            description,
            author,
            site_name,
            published_at,
            word_count,
            upvote_count,
        } => {
            details.upvote_count = *upvote_count;
            details.age_in_days = published_at.map(|p| (now - p).num_days());

            let popularity = saturate(upvote_count.unwrap_or(0), weights.web_upvote_cap);
            let recency = recency_score(*published_at, now, weights.max_age_days);
            let authority = if author.is_some() { 0.6 } else { 0.3 };
            let completeness = fraction_present(&[
                title.is_some(),
                description.is_some(),
                author.is_some(),
                site_name.is_some(),
                published_at.is_some(),
                word_count.is_some(),
                upvote_count.is_some(),
            ], &mut details);
            (popularity, recency, authority, completeness)
        }
    };

    let composite = weights.popularity * popularity
        + weights.recency * recency
        + weights.authority * authority
        + weights.completeness * completeness;

    QualitySignals {
        popularity,
        recency,
        authority,
        completeness,
        composite: composite.clamp(0.0, 1.0),
        details,
    }
}

/// Estimate consumption time from provider metadata.
///
/// Videos use their duration, pages assume 200 words per minute,
/// repositories have no meaningful single figure and stay `None`.
pub fn estimate_minutes(metadata: &ProviderMetadata) -> Option<u32> {
    match metadata {
        ProviderMetadata::Youtube {
            duration_seconds, ..
        } => duration_seconds.map(|secs| secs.div_ceil(60).max(1)),
        ProviderMetadata::Github { .. } => None,
        ProviderMetadata::WebPage { word_count, .. } => {
            word_count.map(|words| (words / WORDS_PER_MINUTE).max(1))
        }
    }
}

fn fraction_present(fields: &[bool], details: &mut QualityDetails) -> f32 {
    let present = fields.iter().filter(|f| **f).count() as u32;
    details.fields_present = present;
    details.fields_total = fields.len() as u32;
    present as f32 / fields.len() as f32
}
