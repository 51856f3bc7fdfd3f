//! Configuration for the curation pipeline.
//!
//! Every tunable constant named in the pipeline design lives here, so the
//! surrounding application can override them from a YAML file without
//! touching code.

use serde::{Deserialize, Serialize};

/// Configuration for the resource curation pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurationConfig {
    /// Stage TTLs
    #[serde(default)]
    pub ttl: TtlConfig,
    /// Quality scoring weights and caps
    #[serde(default)]
    pub quality: QualityWeights,
    /// Selection defaults
    #[serde(default)]
    pub selection: SelectionDefaults,
}

impl CurationConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Advisory staleness TTLs per lifecycle stage, in seconds.
///
/// Expiry forces a re-run of the stage; it never deletes data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlConfig {
    /// Raw candidate TTL
    pub candidate_secs: u64,
    /// Enrichment TTL
    pub enrichment_secs: u64,
    /// Verification TTL
    pub verification_secs: u64,
    /// Candidate TTL for known-source provenance
    pub known_source_secs: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            candidate_secs: 3_600,         // 1 hour
            enrichment_secs: 86_400,       // 24 hours
            verification_secs: 604_800,    // 7 days
            known_source_secs: 2_592_000,  // 30 days
        }
    }
}

/// Weights and caps for quality scoring.
///
/// The composite is a fixed weighted combination; the four weights are
/// expected to sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    /// Weight of the popularity signal
    pub popularity: f32,
    /// Weight of the recency signal
    pub recency: f32,
    /// Weight of the authority signal
    pub authority: f32,
    /// Weight of the completeness signal
    pub completeness: f32,
    /// View count at which YouTube popularity saturates
    pub youtube_view_cap: u64,
    /// Star count at which GitHub popularity saturates
    pub github_star_cap: u64,
    /// Upvote count at which web popularity saturates
    pub web_upvote_cap: u64,
    /// Age in days at which recency reaches zero
    pub max_age_days: i64,
    /// Minimum composite for a resource to be recommended
    pub recommended_threshold: f32,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            popularity: 0.3,
            recency: 0.2,
            authority: 0.2,
            completeness: 0.3,
            youtube_view_cap: 10_000_000,
            github_star_cap: 100_000,
            web_upvote_cap: 10_000,
            max_age_days: 1_095, // 3 years
            recommended_threshold: 0.6,
        }
    }
}

/// Default selection budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionDefaults {
    /// Maximum resources per selection
    pub max_resources: usize,
    /// Maximum total consumption time
    pub max_total_minutes: u32,
    /// Minimum quality composite for pool admission
    pub min_quality_score: f32,
    /// Prefer provider and content-type variety between consecutive picks
    pub prioritize_variety: bool,
}

impl Default for SelectionDefaults {
    fn default() -> Self {
        Self {
            max_resources: 10,
            max_total_minutes: 480, // one working day
            min_quality_score: 0.3,
            prioritize_variety: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CurationConfig::default();
        assert_eq!(config.ttl.candidate_secs, 3_600);
        assert_eq!(config.ttl.known_source_secs, 2_592_000);
        let weight_sum = config.quality.popularity
            + config.quality.recency
            + config.quality.authority
            + config.quality.completeness;
        assert!((weight_sum - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = CurationConfig::default();
        let yaml = config.to_yaml().unwrap();
        let back = CurationConfig::from_yaml(&yaml).unwrap();
        assert_eq!(back.ttl.enrichment_secs, config.ttl.enrichment_secs);
        assert_eq!(back.selection.max_resources, config.selection.max_resources);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = CurationConfig::from_yaml("ttl:\n  candidate_secs: 60\n").unwrap();
        assert_eq!(config.ttl.candidate_secs, 60);
        assert_eq!(config.quality.recommended_threshold, 0.6);
    }
}
