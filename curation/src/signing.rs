//! Integrity signing contract for verified snapshots.
//!
//! The surrounding application signs each verified snapshot so a tampered
//! cache entry can be detected before it is trusted. Key management lives
//! with the application; this crate only defines the contract and a local
//! keyed-digest implementation for tests and single-node deployments.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::types::HmacSignature;

/// Error types for signing operations.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// Key material unavailable
    #[error("Signing key unavailable: {0}")]
    KeyUnavailable(String),

    /// Backend failure
    #[error("Signing backend error: {0}")]
    Backend(String),
}

/// Trait for signing serialized verified snapshots.
///
/// A clean abstraction over the signing mechanism, allowing for KMS-backed,
/// local, and mock implementations.
#[async_trait]
pub trait IntegritySigner: Send + Sync {
    /// Sign a serialized snapshot.
    async fn sign(&self, payload: &[u8]) -> Result<HmacSignature, SigningError>;

    /// Check a signature against a serialized snapshot.
    async fn verify(&self, payload: &[u8], signature: &HmacSignature) -> Result<bool, SigningError>;
}

/// Local keyed-digest signer.
///
/// SHA-256 over key-prefixed payload. Good enough for detecting cache
/// tampering on a single node; production deployments plug in the
/// application's HMAC service instead.
pub struct LocalKeySigner {
    key: Vec<u8>,
}

impl LocalKeySigner {
    /// Create a signer with the given key bytes.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    fn digest(&self, payload: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.key);
        hasher.update(payload);
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl IntegritySigner for LocalKeySigner {
    async fn sign(&self, payload: &[u8]) -> Result<HmacSignature, SigningError> {
        Ok(HmacSignature::new(self.digest(payload)))
    }

    async fn verify(&self, payload: &[u8], signature: &HmacSignature) -> Result<bool, SigningError> {
        Ok(self.digest(payload) == signature.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_and_verify() {
        let signer = LocalKeySigner::new(b"test-key".to_vec());

        let signature = signer.sign(b"payload").await.unwrap();
        assert!(signer.verify(b"payload", &signature).await.unwrap());
        assert!(!signer.verify(b"tampered", &signature).await.unwrap());
    }

    #[tokio::test]
    async fn test_different_keys_differ() {
        let a = LocalKeySigner::new(b"key-a".to_vec());
        let b = LocalKeySigner::new(b"key-b".to_vec());

        let sig_a = a.sign(b"payload").await.unwrap();
        assert!(!b.verify(b"payload", &sig_a).await.unwrap());
    }
}
