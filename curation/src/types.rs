//! Core types for the resource curation pipeline.
//!
//! Resources move through three immutable snapshots sharing one identity:
//! [`RawResourceCandidate`] (discovery), [`EnrichedResource`] (provider
//! metadata attached) and [`VerifiedResource`] (accessibility probed).
//! Identity is the [`CanonicalUrl`]; the derived [`ResourceId`] is stable
//! for a given canonical form, which is what makes deduplication work.
//!
//! URL-shaped values use distinct newtypes so the compiler rejects passing
//! a display URL where a canonical one is required. Nothing in this crate
//! constructs a URL from scratch; URLs always arrive from a discovery
//! source and are carried through unchanged.
//!
//! With the `typescript` feature enabled, these types can be exported to
//! TypeScript using ts-rs for consistency with the Angular frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use taxonomy::TopicId;

use crate::error::CurationError;

/// Query parameters stripped during canonicalization.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "msclkid", "ref", "ref_src", "si", "feature", "mc_cid", "mc_eid", "igshid",
];

/// User-facing form of a resource's address.
///
/// May carry tracking params or point at a mirror; never used as a
/// deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(transparent)]
pub struct DisplayUrl(String);

impl DisplayUrl {
    /// Wrap a URL string supplied by a discovery source.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized, deduplication-key form of a resource's address.
///
/// Only constructible through [`CanonicalUrl::normalize`], so every value
/// of this type is guaranteed to be in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Normalize a display URL into canonical form.
    ///
    /// Scheme must be http or https. Host is lowercased, default ports and
    /// fragments are dropped, tracking query params (`utm_*` and a known
    /// list) are stripped, and surviving query params are sorted so that
    /// param order never splits one resource into two identities.
    pub fn normalize(display: &DisplayUrl) -> Result<Self, CurationError> {
        let mut url = Url::parse(display.as_str())
            .map_err(|e| CurationError::InvalidUrl(format!("{}: {e}", display.as_str())))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(CurationError::InvalidUrl(format!(
                    "unsupported scheme '{other}' in {}",
                    display.as_str()
                )))
            }
        }
        if url.host_str().is_none() {
            return Err(CurationError::InvalidUrl(format!(
                "missing host in {}",
                display.as_str()
            )));
        }

        url.set_fragment(None);

        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if params.is_empty() {
            url.set_query(None);
        } else {
            params.sort();
            // `query_pairs` decodes; pairs must be re-encoded, not
            // formatted back raw.
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&params)
                .finish();
            url.set_query(Some(&query));
        }

        Ok(Self(url.to_string()))
    }

    /// Get the raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host portion of the canonical URL.
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.0).ok()?.host_str().map(|h| h.to_string())
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

/// Opaque resource identifier, derived from the canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Derive the id for a canonical URL.
    ///
    /// First 16 bytes of SHA-256 over the canonical form, hex-encoded.
    /// Deterministic: the same URL always yields the same id, across
    /// processes and restarts.
    pub fn for_url(url: &CanonicalUrl) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..16]))
    }

    /// Get the raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Integrity signature over a serialized verified snapshot.
///
/// Produced by the integrity-signing collaborator; this crate stores and
/// checks it but never touches key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(transparent)]
pub struct HmacSignature(String);

impl HmacSignature {
    /// Wrap a signature produced by the signing collaborator.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where a candidate was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ResourceSourceType {
    /// Hand-maintained registry of known-good sources
    KnownSource,
    /// YouTube Data API search
    YoutubeApi,
    /// GitHub API search
    GithubApi,
    /// General web search provider
    WebSearch,
    /// Supplied directly by the user
    UserProvided,
    /// Imported from a curated list
    CuratedList,
}

/// Provenance of a discovery. Immutable once the candidate is created;
/// later duplicate discoveries are logged but never overwrite this.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ResourceSource {
    /// Discovery channel
    pub source_type: ResourceSourceType,
    /// When the resource was first seen
    pub discovered_at: DateTime<Utc>,
    /// Search query that surfaced it, if any
    #[serde(default)]
    pub query: Option<String>,
    /// Position in the provider's result list
    #[serde(default)]
    pub result_position: Option<u32>,
    /// Provider response id, for audit correlation
    #[serde(default)]
    pub api_response_id: Option<String>,
}

impl ResourceSource {
    /// Provenance with just a source type, discovered now.
    pub fn now(source_type: ResourceSourceType) -> Self {
        Self {
            source_type,
            discovered_at: Utc::now(),
            query: None,
            result_position: None,
            api_response_id: None,
        }
    }
}

/// Metadata provider family a resource belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ResourceProvider {
    /// YouTube video
    Youtube,
    /// GitHub repository
    Github,
    /// Generic web page
    Web,
}

impl ResourceProvider {
    /// Infer the provider family from a canonical URL's host.
    pub fn infer(url: &CanonicalUrl) -> Self {
        match url.host().as_deref() {
            Some(host) if host.ends_with("youtube.com") || host == "youtu.be" => Self::Youtube,
            Some(host) if host == "github.com" || host.ends_with(".github.com") => Self::Github,
            _ => Self::Web,
        }
    }
}

/// Provider metadata, fetched by the external metadata collaborator.
///
/// This crate only consumes the typed union; it never calls a provider
/// API. Optional fields feed the completeness score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum ProviderMetadata {
    /// YouTube video metadata
    Youtube {
        /// Video title
        title: String,
        /// Channel name
        channel: String,
        /// View count
        view_count: Option<u64>,
        /// Like count
        like_count: Option<u64>,
        /// Channel subscriber count
        channel_subscribers: Option<u64>,
        /// Video length in seconds
        duration_seconds: Option<u32>,
        /// Publication timestamp
        published_at: Option<DateTime<Utc>>,
        /// Whether captions are available
        captions_available: Option<bool>,
    },
    /// GitHub repository metadata
    Github {
        /// `owner/repo`
        full_name: String,
        /// Repository description
        description: Option<String>,
        /// Star count
        stars: Option<u64>,
        /// Fork count
        forks: Option<u64>,
        /// Primary language
        language: Option<String>,
        /// Repository topics
        #[serde(default)]
        topics: Vec<String>,
        /// Last push timestamp
        pushed_at: Option<DateTime<Utc>>,
        /// Whether the repository is archived
        archived: Option<bool>,
        /// SPDX license id
        license: Option<String>,
    },
    /// Generic web page metadata
    WebPage {
        /// Page title
        title: Option<String>,
        /// Meta description
        description: Option<String>,
        /// Author, when published
        author: Option<String>,
        /// Site name
        site_name: Option<String>,
        /// Publication timestamp
        published_at: Option<DateTime<Utc>>,
        /// Word count of the main content
        word_count: Option<u32>,
        /// Upvotes on the aggregator that surfaced the page
        upvote_count: Option<u64>,
    },
}

/// Stage-1 snapshot: a discovered, unenriched candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RawResourceCandidate {
    /// Derived resource id
    pub id: ResourceId,
    /// Deduplication key
    pub canonical_url: CanonicalUrl,
    /// User-facing URL, carried through unchanged
    pub display_url: DisplayUrl,
    /// Provider family
    pub provider: ResourceProvider,
    /// Discovery provenance
    pub source: ResourceSource,
    /// Topics this candidate was discovered for
    pub topic_ids: Vec<TopicId>,
    /// Title hint from the search result, if any
    #[serde(default)]
    pub title_hint: Option<String>,
    /// When the snapshot was created
    pub created_at: DateTime<Utc>,
    /// Staleness deadline for this stage
    pub candidate_expires_at: DateTime<Utc>,
}

impl RawResourceCandidate {
    /// Whether this snapshot has passed its stage TTL.
    ///
    /// Expiry is advisory staleness, not removal; callers re-run discovery
    /// for an expired candidate before reuse.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.candidate_expires_at
    }
}

/// Stage-2 snapshot: candidate plus provider metadata and quality signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct EnrichedResource {
    /// Same id as the candidate
    pub id: ResourceId,
    /// Same canonical URL as the candidate
    pub canonical_url: CanonicalUrl,
    /// Same display URL as the candidate
    pub display_url: DisplayUrl,
    /// Provider family
    pub provider: ResourceProvider,
    /// Discovery provenance, carried unchanged
    pub source: ResourceSource,
    /// Topics, unioned across duplicate discoveries
    pub topic_ids: Vec<TopicId>,
    /// Fetched provider metadata
    pub metadata: ProviderMetadata,
    /// Normalized quality signals
    pub quality: QualitySignals,
    /// Estimated consumption time
    pub estimated_minutes: Option<u32>,
    /// When enrichment happened
    pub enriched_at: DateTime<Utc>,
    /// Staleness deadline for this stage
    pub enrichment_expires_at: DateTime<Utc>,
}

impl EnrichedResource {
    /// Whether this snapshot has passed its stage TTL.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.enrichment_expires_at
    }
}

/// Raw counts and measurements behind the normalized quality scores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct QualityDetails {
    /// View count (YouTube)
    pub view_count: Option<u64>,
    /// Star count (GitHub)
    pub star_count: Option<u64>,
    /// Upvote count (web aggregators)
    pub upvote_count: Option<u64>,
    /// Age of the content in days
    pub age_in_days: Option<i64>,
    /// Optional metadata fields present
    pub fields_present: u32,
    /// Optional metadata fields defined for the provider
    pub fields_total: u32,
}

/// Normalized quality signals, all in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct QualitySignals {
    /// Saturating-normalized engagement counts
    pub popularity: f32,
    /// Linear decay from publication age
    pub recency: f32,
    /// Publisher standing (channel size, repo activity, https)
    pub authority: f32,
    /// Fraction of optional metadata present
    pub completeness: f32,
    /// Fixed weighted combination of the four signals
    pub composite: f32,
    /// Raw inputs the scores were derived from
    pub details: QualityDetails,
}

/// Walls detected between the client and the content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ContentWalls {
    /// Payment required
    pub paywall: bool,
    /// Account login required
    pub login: bool,
    /// Bot-detection challenge
    pub bot_check: bool,
    /// Age verification gate
    pub age_gate: bool,
    /// Blocking cookie-consent interstitial
    pub cookie_wall: bool,
    /// Geographic restriction
    pub geo_block: bool,
}

/// Confidence level of a verification probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum VerificationLevel {
    /// Full content fetch succeeded
    High,
    /// Headers only
    Medium,
    /// Indirect evidence only
    Low,
    /// Probe failed (timeout, network error, SSRF refusal)
    Failed,
}

/// Evidence gathered by the SSRF-safe fetch collaborator.
///
/// A timed-out or aborted fetch arrives here as `level = failed`; this
/// crate has no timeout semantics of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct VerificationEvidence {
    /// HTTP status, if a response arrived
    pub http_status: Option<u16>,
    /// Probe round-trip time
    pub response_time_ms: Option<u32>,
    /// Response content type
    pub content_type: Option<String>,
    /// Response content length
    pub content_length: Option<u64>,
    /// Whether the final URL uses https
    pub uses_https: bool,
    /// Whether certificate validation passed
    pub valid_certificate: bool,
    /// Walls detected in the response
    #[serde(default)]
    pub walls: ContentWalls,
    /// 200 response whose body is an error page
    #[serde(default)]
    pub is_soft_404: bool,
    /// 200 response that is an empty JS application shell
    #[serde(default)]
    pub is_js_app_shell: bool,
    /// Redirects followed, in order
    #[serde(default)]
    pub redirect_chain: Vec<DisplayUrl>,
    /// URL the probe ended at
    #[serde(default)]
    pub final_url: Option<DisplayUrl>,
    /// Probe confidence
    pub level: VerificationLevel,
}

/// Accessibility classification derived from verification evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum AccessibilityStatus {
    /// Reachable without obstruction
    Accessible,
    /// Behind a paywall
    Paywalled,
    /// Requires login or other auth
    RequiresAuth,
    /// Behind a bot-detection wall or blocking consent interstitial
    BotProtected,
    /// Geographically restricted
    GeoBlocked,
    /// Gone or never existed (includes soft 404s)
    NotFound,
    /// Probe was rate limited
    RateLimited,
    /// Probe failed outright
    Error,
    /// No evidence available
    Unknown,
}

impl AccessibilityStatus {
    /// Whether the resource can actually be consumed.
    pub fn is_accessible(&self) -> bool {
        matches!(self, Self::Accessible)
    }
}

/// Severity of a usability issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// Disqualifies the resource outright
    Blocking,
    /// Significant drawback
    Major,
    /// Worth noting
    Minor,
}

/// Category of a usability issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum UsabilityIssueKind {
    /// Content is stale for its subject
    Outdated,
    /// Learner is missing prerequisites the resource assumes
    MissingPrerequisites,
    /// Pitched at the wrong audience level
    AudienceMismatch,
    /// Poor audio/video/writing quality
    LowProductionQuality,
    /// Covers only part of the topic
    Incomplete,
    /// Obstructed by a wall or error
    Inaccessible,
}

/// A typed usability issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct UsabilityIssue {
    /// Issue category
    pub kind: UsabilityIssueKind,
    /// Severity
    pub severity: IssueSeverity,
    /// Human-readable detail
    pub detail: String,
}

/// Judgment of whether a verified resource fits a learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct UsabilityAssessment {
    /// Overall usability in [0, 1]
    pub score: f32,
    /// Accessible, good enough quality, no blocking issue
    pub recommended: bool,
    /// Detected issues
    pub issues: Vec<UsabilityIssue>,
    /// Notable strengths
    pub strengths: Vec<String>,
    /// Fit with the requested audience level, [0, 1]
    pub audience_match: f32,
    /// Prerequisites the learner already covers
    pub prerequisites_covered: Vec<TopicId>,
    /// Prerequisites the learner is missing
    pub missing_prerequisites: Vec<TopicId>,
}

/// Stage-3 snapshot: enriched resource plus verification outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct VerifiedResource {
    /// Same id as the earlier stages
    pub id: ResourceId,
    /// Same canonical URL as the earlier stages
    pub canonical_url: CanonicalUrl,
    /// Same display URL as the earlier stages
    pub display_url: DisplayUrl,
    /// Provider family
    pub provider: ResourceProvider,
    /// Discovery provenance, carried unchanged
    pub source: ResourceSource,
    /// Topics this resource covers
    pub topic_ids: Vec<TopicId>,
    /// Provider metadata from enrichment
    pub metadata: ProviderMetadata,
    /// Quality signals from enrichment
    pub quality: QualitySignals,
    /// Estimated consumption time
    pub estimated_minutes: Option<u32>,
    /// Evidence from the accessibility probe
    pub evidence: VerificationEvidence,
    /// Derived accessibility classification
    pub accessibility: AccessibilityStatus,
    /// Derived usability assessment
    pub usability: UsabilityAssessment,
    /// Integrity signature, attached when the snapshot is sealed
    #[serde(default)]
    pub signature: Option<HmacSignature>,
    /// When verification happened
    pub verified_at: DateTime<Utc>,
    /// Staleness deadline for this stage
    pub expires_at: DateTime<Utc>,
}

impl VerifiedResource {
    /// Whether this snapshot has passed its stage TTL.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the resource is fit for selection.
    pub fn is_recommended(&self) -> bool {
        self.usability.recommended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_strips_tracking_and_fragment() {
        let display = DisplayUrl::new(
            "HTTPS://WWW.Example.com:443/Path/page?utm_source=x&b=2&a=1&fbclid=abc#section",
        );
        let canonical = CanonicalUrl::normalize(&display).unwrap();
        assert_eq!(canonical.as_str(), "https://www.example.com/Path/page?a=1&b=2");
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let display = DisplayUrl::new("https://example.com/a?utm_campaign=x&z=1&y=2");
        let once = CanonicalUrl::normalize(&display).unwrap();
        let twice = CanonicalUrl::normalize(&DisplayUrl::new(once.as_str())).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonicalize_keeps_separators_encoded() {
        // An encoded `&` inside a value must not come back as a raw
        // separator, or the second pass would see two params.
        let display = DisplayUrl::new("https://example.com/a?q=a%26b");
        let once = CanonicalUrl::normalize(&display).unwrap();
        assert_eq!(once.as_str(), "https://example.com/a?q=a%26b");

        let twice = CanonicalUrl::normalize(&DisplayUrl::new(once.as_str())).unwrap();
        assert_eq!(once, twice);

        let display = DisplayUrl::new("https://example.com/a?q=x%3D1&p=2");
        let once = CanonicalUrl::normalize(&display).unwrap();
        let twice = CanonicalUrl::normalize(&DisplayUrl::new(once.as_str())).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonicalize_keeps_identifying_params() {
        // The video id must survive even though `si` is stripped.
        let display = DisplayUrl::new("https://www.youtube.com/watch?v=abc123&si=share_junk");
        let canonical = CanonicalUrl::normalize(&display).unwrap();
        assert_eq!(canonical.as_str(), "https://www.youtube.com/watch?v=abc123");
    }

    #[test]
    fn test_canonicalize_rejects_bad_urls() {
        for raw in ["not a url", "ftp://example.com/file", "javascript:alert(1)"] {
            let err = CanonicalUrl::normalize(&DisplayUrl::new(raw)).unwrap_err();
            assert_eq!(err.code(), "INVALID_URL");
        }
    }

    #[test]
    fn test_resource_id_deterministic() {
        let a = CanonicalUrl::normalize(&DisplayUrl::new("https://example.com/x")).unwrap();
        let b = CanonicalUrl::normalize(&DisplayUrl::new("https://example.com/x?utm_source=y"))
            .unwrap();
        assert_eq!(ResourceId::for_url(&a), ResourceId::for_url(&b));
        assert_eq!(ResourceId::for_url(&a).as_str().len(), 32);

        let other = CanonicalUrl::normalize(&DisplayUrl::new("https://example.com/y")).unwrap();
        assert_ne!(ResourceId::for_url(&a), ResourceId::for_url(&other));
    }

    #[test]
    fn test_provider_inference() {
        let of = |raw: &str| {
            ResourceProvider::infer(&CanonicalUrl::normalize(&DisplayUrl::new(raw)).unwrap())
        };
        assert_eq!(of("https://www.youtube.com/watch?v=abc"), ResourceProvider::Youtube);
        assert_eq!(of("https://youtu.be/abc"), ResourceProvider::Youtube);
        assert_eq!(of("https://github.com/rust-lang/rust"), ResourceProvider::Github);
        assert_eq!(of("https://blog.example.com/post"), ResourceProvider::Web);
    }

    #[test]
    fn test_provider_metadata_tagged_serialization() {
        let metadata = ProviderMetadata::Github {
            full_name: "rust-lang/rust".to_string(),
            description: None,
            stars: Some(90_000),
            forks: None,
            language: Some("Rust".to_string()),
            topics: vec![],
            pushed_at: None,
            archived: None,
            license: None,
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["provider"], "github");
        let back: ProviderMetadata = serde_json::from_value(json).unwrap();
        assert!(matches!(back, ProviderMetadata::Github { .. }));
    }
}
