//! Error taxonomy for the resource curation pipeline.
//!
//! Grouped by pipeline stage: discovery, enrichment, verification,
//! content walls, and cache integrity. Every variant maps to a stable
//! SCREAMING_SNAKE code consumed by the surrounding application's API
//! layer and audit log.

/// Error types for resource curation operations.
#[derive(Debug, thiserror::Error)]
pub enum CurationError {
    // --- Discovery ---
    /// URL failed parsing or normalization
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL points at a provider this pipeline does not handle
    #[error("Unsupported provider for URL: {0}")]
    UnsupportedProvider(String),

    /// Discovery call failed upstream
    #[error("Discovery failed: {0}")]
    DiscoveryFailed(String),

    /// Discovery produced no results
    #[error("No results for query: {0}")]
    NoResults(String),

    // --- Enrichment ---
    /// Enrichment rejected (expired candidate, inconsistent input)
    #[error("Enrichment failed: {0}")]
    EnrichmentFailed(String),

    /// Provider API rate limit hit
    #[error("Provider API rate limited: {0}")]
    ApiRateLimited(String),

    /// Provider API quota exhausted
    #[error("Provider API quota exceeded: {0}")]
    ApiQuotaExceeded(String),

    /// Provider API credentials rejected
    #[error("Provider API auth failed: {0}")]
    ApiAuthFailed(String),

    /// Provider returned no usable metadata
    #[error("Metadata unavailable: {0}")]
    MetadataUnavailable(String),

    // --- Verification ---
    /// Verification rejected (expired enrichment, inconsistent input)
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Resource no longer exists
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Resource access forbidden
    #[error("Resource forbidden: {0}")]
    ResourceForbidden(String),

    /// Accessibility probe timed out
    #[error("Resource timed out: {0}")]
    ResourceTimeout(String),

    /// Fetch layer refused the target address
    #[error("SSRF protection blocked: {0}")]
    SsrfBlocked(String),

    /// TLS negotiation or certificate failure
    #[error("TLS error: {0}")]
    TlsError(String),

    // --- Content ---
    /// Content sits behind a paywall
    #[error("Paywall detected: {0}")]
    PaywallDetected(String),

    /// Content requires a login
    #[error("Login required: {0}")]
    LoginRequired(String),

    /// Content sits behind a bot-detection wall
    #[error("Bot wall detected: {0}")]
    BotWallDetected(String),

    /// Content removed or otherwise unavailable
    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    // --- Cache ---
    /// Nothing stored under the requested key
    #[error("Cache miss: {0}")]
    CacheMiss(String),

    /// Stored snapshot has passed its stage TTL
    #[error("Cache expired: {0}")]
    CacheExpired(String),

    /// Stored snapshot failed its integrity check; re-verify
    #[error("Cache integrity check failed: {0}")]
    CacheIntegrityFailed(String),
}

impl CurationError {
    /// Stable error code used by the surrounding application.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::UnsupportedProvider(_) => "UNSUPPORTED_PROVIDER",
            Self::DiscoveryFailed(_) => "DISCOVERY_FAILED",
            Self::NoResults(_) => "NO_RESULTS",
            Self::EnrichmentFailed(_) => "ENRICHMENT_FAILED",
            Self::ApiRateLimited(_) => "API_RATE_LIMITED",
            Self::ApiQuotaExceeded(_) => "API_QUOTA_EXCEEDED",
            Self::ApiAuthFailed(_) => "API_AUTH_FAILED",
            Self::MetadataUnavailable(_) => "METADATA_UNAVAILABLE",
            Self::VerificationFailed(_) => "VERIFICATION_FAILED",
            Self::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            Self::ResourceForbidden(_) => "RESOURCE_FORBIDDEN",
            Self::ResourceTimeout(_) => "RESOURCE_TIMEOUT",
            Self::SsrfBlocked(_) => "SSRF_BLOCKED",
            Self::TlsError(_) => "TLS_ERROR",
            Self::PaywallDetected(_) => "PAYWALL_DETECTED",
            Self::LoginRequired(_) => "LOGIN_REQUIRED",
            Self::BotWallDetected(_) => "BOT_WALL_DETECTED",
            Self::ContentUnavailable(_) => "CONTENT_UNAVAILABLE",
            Self::CacheMiss(_) => "CACHE_MISS",
            Self::CacheExpired(_) => "CACHE_EXPIRED",
            Self::CacheIntegrityFailed(_) => "CACHE_INTEGRITY_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            CurationError::EnrichmentFailed("x".into()).code(),
            "ENRICHMENT_FAILED"
        );
        assert_eq!(
            CurationError::CacheIntegrityFailed("x".into()).code(),
            "CACHE_INTEGRITY_FAILED"
        );
    }
}
