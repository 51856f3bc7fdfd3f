//! Storage contract for lifecycle snapshots.
//!
//! Each stage caches under its own key space (`resource:candidate:{id}`,
//! `resource:enriched:{id}`, `resource:verified:{id}`) so a stale
//! enrichment never shadows a live candidate. Reads enforce stage TTLs
//! lazily: an expired snapshot is evicted on read and surfaces as
//! `CACHE_EXPIRED`, telling the caller to re-run that stage.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::CurationError;
use crate::types::{EnrichedResource, RawResourceCandidate, ResourceId, VerifiedResource};

/// Lifecycle stage, used to partition the cache key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStage {
    /// Raw discovery
    Candidate,
    /// Metadata attached
    Enriched,
    /// Accessibility and usability assessed
    Verified,
}

impl ResourceStage {
    /// Key-space segment for this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Enriched => "enriched",
            Self::Verified => "verified",
        }
    }
}

/// Storage key for a snapshot.
pub fn resource_key(stage: ResourceStage, id: &ResourceId) -> String {
    format!("resource:{}:{}", stage.as_str(), id)
}

/// Key-value cache contract for lifecycle snapshots.
///
/// `get_*` returns `CACHE_MISS` for an absent key and `CACHE_EXPIRED`
/// for a snapshot past its stage TTL. The real store lives in the
/// surrounding application; this crate defines the contract and an
/// in-memory reference implementation.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Cache a candidate snapshot.
    async fn put_candidate(&self, candidate: &RawResourceCandidate) -> Result<(), CurationError>;

    /// Load a live candidate snapshot.
    async fn get_candidate(&self, id: &ResourceId) -> Result<RawResourceCandidate, CurationError>;

    /// Cache an enriched snapshot.
    async fn put_enriched(&self, enriched: &EnrichedResource) -> Result<(), CurationError>;

    /// Load a live enriched snapshot.
    async fn get_enriched(&self, id: &ResourceId) -> Result<EnrichedResource, CurationError>;

    /// Cache a verified snapshot.
    async fn put_verified(&self, verified: &VerifiedResource) -> Result<(), CurationError>;

    /// Load a live verified snapshot.
    async fn get_verified(&self, id: &ResourceId) -> Result<VerifiedResource, CurationError>;

    /// Drop every stage's snapshot for a resource.
    async fn evict(&self, id: &ResourceId) -> Result<(), CurationError>;
}

/// In-memory resource store.
///
/// Serializes through JSON like a real KV store would. TTL enforcement
/// is lazy: expired entries stay until the next read evicts them.
#[derive(Default)]
pub struct InMemoryResourceStore {
    blobs: DashMap<String, String>,
}

impl InMemoryResourceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn put_blob<T: Serialize>(&self, key: String, value: &T) -> Result<(), CurationError> {
        let json = serde_json::to_string(value)
            .map_err(|e| CurationError::CacheIntegrityFailed(e.to_string()))?;
        self.blobs.insert(key, json);
        Ok(())
    }

    fn get_blob<T, F>(&self, key: &str, expired: F) -> Result<T, CurationError>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let Some(json) = self.blobs.get(key).map(|e| e.clone()) else {
            return Err(CurationError::CacheMiss(key.to_string()));
        };
        let value: T = serde_json::from_str(&json)
            .map_err(|e| CurationError::CacheIntegrityFailed(e.to_string()))?;
        if expired(&value) {
            self.blobs.remove(key);
            return Err(CurationError::CacheExpired(key.to_string()));
        }
        Ok(value)
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn put_candidate(&self, candidate: &RawResourceCandidate) -> Result<(), CurationError> {
        self.put_blob(resource_key(ResourceStage::Candidate, &candidate.id), candidate)
    }

    async fn get_candidate(&self, id: &ResourceId) -> Result<RawResourceCandidate, CurationError> {
        let now = Utc::now();
        self.get_blob(&resource_key(ResourceStage::Candidate, id), |c: &RawResourceCandidate| {
            c.is_expired(now)
        })
    }

    async fn put_enriched(&self, enriched: &EnrichedResource) -> Result<(), CurationError> {
        self.put_blob(resource_key(ResourceStage::Enriched, &enriched.id), enriched)
    }

    async fn get_enriched(&self, id: &ResourceId) -> Result<EnrichedResource, CurationError> {
        let now = Utc::now();
        self.get_blob(&resource_key(ResourceStage::Enriched, id), |e: &EnrichedResource| {
            e.is_expired(now)
        })
    }

    async fn put_verified(&self, verified: &VerifiedResource) -> Result<(), CurationError> {
        self.put_blob(resource_key(ResourceStage::Verified, &verified.id), verified)
    }

    async fn get_verified(&self, id: &ResourceId) -> Result<VerifiedResource, CurationError> {
        let now = Utc::now();
        self.get_blob(&resource_key(ResourceStage::Verified, id), |v: &VerifiedResource| {
            v.is_expired(now)
        })
    }

    async fn evict(&self, id: &ResourceId) -> Result<(), CurationError> {
        for stage in [
            ResourceStage::Candidate,
            ResourceStage::Enriched,
            ResourceStage::Verified,
        ] {
            self.blobs.remove(&resource_key(stage, id));
        }
        Ok(())
    }
}
