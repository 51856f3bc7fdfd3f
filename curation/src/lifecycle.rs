//! Resource lifecycle stage transitions.
//!
//! Candidates move through three immutable snapshots:
//!
//! ```text
//! discovery ──► RawResourceCandidate ──► EnrichedResource ──► VerifiedResource
//!                  (1h / 30d TTL)           (24h TTL)             (7d TTL)
//! ```
//!
//! A stage N+1 snapshot may only be constructed from a non-expired stage N
//! snapshot; the pipeline never skips a stage. Expiry is advisory
//! staleness, not deletion — callers re-run the stage for an expired
//! snapshot before reuse.
//!
//! Trust invariant: nothing here constructs a canonical or display URL
//! from scratch. URLs arrive from the discovery source and are carried
//! through every stage unchanged, so no generator elsewhere in the system
//! can inject a fabricated link through this pipeline.

use chrono::{Duration, Utc};
use dashmap::DashMap;

use taxonomy::TopicId;

use crate::config::{CurationConfig, QualityWeights, TtlConfig};
use crate::error::CurationError;
use crate::quality::{compute_quality, estimate_minutes};
use crate::signing::IntegritySigner;
use crate::types::{
    CanonicalUrl, DisplayUrl, EnrichedResource, ProviderMetadata, RawResourceCandidate,
    ResourceId, ResourceProvider, ResourceSource, ResourceSourceType, VerificationEvidence,
    VerifiedResource,
};
use crate::verify::{assess_usability, classify_accessibility};

/// A discovery, as reported by a search provider, the known-source
/// registry, or the user. The URL is the discoverer's, verbatim.
#[derive(Debug, Clone)]
pub struct DiscoveredResource {
    /// URL exactly as the discovery source supplied it
    pub display_url: DisplayUrl,
    /// Discovery provenance
    pub source: ResourceSource,
    /// Topics the discovery was made for
    pub topic_ids: Vec<TopicId>,
    /// Title from the search result, if any
    pub title_hint: Option<String>,
}

/// Learner context for the usability assessment at verification time.
#[derive(Debug, Clone, Default)]
pub struct VerificationContext {
    /// Prerequisites the learner already covers
    pub prerequisites_covered: Vec<TopicId>,
    /// Prerequisites the learner is missing
    pub missing_prerequisites: Vec<TopicId>,
    /// Issues detected by the caller (content review, staleness checks)
    pub issues: Vec<crate::types::UsabilityIssue>,
}

/// Stage-transition rules for the resource pipeline.
///
/// Holds only configuration; every method is a pure function of its
/// inputs plus the clock, so one instance can be shared freely.
pub struct ResourceLifecycle {
    ttl: TtlConfig,
    quality: QualityWeights,
}

impl ResourceLifecycle {
    /// Build from pipeline configuration.
    pub fn new(config: &CurationConfig) -> Self {
        Self {
            ttl: config.ttl.clone(),
            quality: config.quality.clone(),
        }
    }

    /// Admit a discovery as a stage-1 candidate.
    ///
    /// Normalizes the supplied URL, derives the deterministic resource id,
    /// and stamps the stage TTL: 1 hour by default, 30 days for
    /// known-source provenance.
    pub fn candidate(
        &self,
        input: DiscoveredResource,
    ) -> Result<RawResourceCandidate, CurationError> {
        let canonical_url = CanonicalUrl::normalize(&input.display_url)?;
        let id = ResourceId::for_url(&canonical_url);
        let provider = ResourceProvider::infer(&canonical_url);

        let ttl_secs = match input.source.source_type {
            ResourceSourceType::KnownSource => self.ttl.known_source_secs,
            _ => self.ttl.candidate_secs,
        };

        let now = Utc::now();
        tracing::debug!(resource_id = %id, provider = ?provider, "Admitted candidate");

        Ok(RawResourceCandidate {
            id,
            canonical_url,
            display_url: input.display_url,
            provider,
            source: input.source,
            topic_ids: input.topic_ids,
            title_hint: input.title_hint,
            created_at: now,
            candidate_expires_at: now + Duration::seconds(ttl_secs as i64),
        })
    }

    /// Promote a candidate to stage 2 with fetched provider metadata.
    ///
    /// Identity fields (id, URLs, source, provider) are copied across
    /// unchanged; identity is fixed at candidate creation.
    pub fn enrich(
        &self,
        candidate: &RawResourceCandidate,
        metadata: ProviderMetadata,
    ) -> Result<EnrichedResource, CurationError> {
        let now = Utc::now();
        if candidate.is_expired(now) {
            return Err(CurationError::EnrichmentFailed(format!(
                "candidate {} expired at {}",
                candidate.id, candidate.candidate_expires_at
            )));
        }

        let quality = compute_quality(&metadata, now, &self.quality);
        let estimated_minutes = estimate_minutes(&metadata);

        Ok(EnrichedResource {
            id: candidate.id.clone(),
            canonical_url: candidate.canonical_url.clone(),
            display_url: candidate.display_url.clone(),
            provider: candidate.provider,
            source: candidate.source.clone(),
            topic_ids: candidate.topic_ids.clone(),
            metadata,
            quality,
            estimated_minutes,
            enriched_at: now,
            enrichment_expires_at: now + Duration::seconds(self.ttl.enrichment_secs as i64),
        })
    }

    /// Promote an enrichment to stage 3 with probe evidence.
    ///
    /// Classifies accessibility and assesses usability; a failed probe
    /// degrades the resource (accessibility `error`), it does not abort
    /// the transition.
    pub fn verify(
        &self,
        enriched: &EnrichedResource,
        evidence: VerificationEvidence,
        context: VerificationContext,
    ) -> Result<VerifiedResource, CurationError> {
        let now = Utc::now();
        if enriched.is_expired(now) {
            return Err(CurationError::VerificationFailed(format!(
                "enrichment for {} expired at {}",
                enriched.id, enriched.enrichment_expires_at
            )));
        }

        let accessibility = classify_accessibility(Some(&evidence));
        let usability = assess_usability(
            &enriched.quality,
            accessibility,
            context.prerequisites_covered,
            context.missing_prerequisites,
            context.issues,
            &self.quality,
        );

        Ok(VerifiedResource {
            id: enriched.id.clone(),
            canonical_url: enriched.canonical_url.clone(),
            display_url: enriched.display_url.clone(),
            provider: enriched.provider,
            source: enriched.source.clone(),
            topic_ids: enriched.topic_ids.clone(),
            metadata: enriched.metadata.clone(),
            quality: enriched.quality.clone(),
            estimated_minutes: enriched.estimated_minutes,
            evidence,
            accessibility,
            usability,
            signature: None,
            verified_at: now,
            expires_at: now + Duration::seconds(self.ttl.verification_secs as i64),
        })
    }

    /// Seal a verified snapshot with the integrity signer.
    ///
    /// The signature covers the canonical JSON serialization with the
    /// signature field cleared, so sealing is idempotent.
    pub async fn seal(
        &self,
        resource: &VerifiedResource,
        signer: &dyn IntegritySigner,
    ) -> Result<VerifiedResource, CurationError> {
        let payload = canonical_payload(resource)?;
        let signature = signer
            .sign(&payload)
            .await
            .map_err(|e| CurationError::VerificationFailed(e.to_string()))?;

        let mut sealed = resource.clone();
        sealed.signature = Some(signature);
        Ok(sealed)
    }

    /// Check a sealed snapshot before trusting it from cache.
    ///
    /// An unsigned or mismatching snapshot fails with
    /// `CACHE_INTEGRITY_FAILED`, which forces the caller into a fresh
    /// verification instead of trusting tampered data.
    pub async fn check_seal(
        &self,
        resource: &VerifiedResource,
        signer: &dyn IntegritySigner,
    ) -> Result<(), CurationError> {
        let Some(signature) = &resource.signature else {
            return Err(CurationError::CacheIntegrityFailed(format!(
                "{} is unsigned",
                resource.id
            )));
        };

        let payload = canonical_payload(resource)?;
        let valid = signer
            .verify(&payload, signature)
            .await
            .map_err(|e| CurationError::VerificationFailed(e.to_string()))?;

        if !valid {
            tracing::warn!(resource_id = %resource.id, "Integrity signature mismatch");
            return Err(CurationError::CacheIntegrityFailed(resource.id.to_string()));
        }
        Ok(())
    }
}

fn canonical_payload(resource: &VerifiedResource) -> Result<Vec<u8>, CurationError> {
    let mut unsigned = resource.clone();
    unsigned.signature = None;
    serde_json::to_vec(&unsigned).map_err(|e| CurationError::VerificationFailed(e.to_string()))
}

/// Concurrent discovery dedup ledger.
///
/// Two discoveries sharing a canonical URL are one logical resource:
/// the first-seen provenance is retained and topic ids are unioned.
/// Later discoveries never overwrite provenance; they are logged and
/// merged.
#[derive(Default)]
pub struct DiscoveryLedger {
    by_url: DashMap<CanonicalUrl, RawResourceCandidate>,
}

impl DiscoveryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a candidate, merging with any earlier discovery of the
    /// same canonical URL. Returns the merged snapshot.
    pub fn record(&self, candidate: RawResourceCandidate) -> RawResourceCandidate {
        let mut entry = self
            .by_url
            .entry(candidate.canonical_url.clone())
            .or_insert_with(|| candidate.clone());

        if entry.created_at != candidate.created_at || entry.id != candidate.id {
            tracing::debug!(
                resource_id = %entry.id,
                later_source = ?candidate.source.source_type,
                "Duplicate discovery; first-seen provenance retained"
            );
        }
        for topic_id in candidate.topic_ids {
            if !entry.topic_ids.contains(&topic_id) {
                entry.topic_ids.push(topic_id);
            }
        }

        entry.clone()
    }

    /// Look up the merged candidate for a canonical URL.
    pub fn get(&self, url: &CanonicalUrl) -> Option<RawResourceCandidate> {
        self.by_url.get(url).map(|e| e.clone())
    }

    /// Number of distinct resources seen.
    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}
