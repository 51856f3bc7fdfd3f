//! Resource curation - discovery lifecycle, quality scoring, selection
//!
//! Takes learning-resource discoveries (URLs from search, known-source
//! registries, or the learner) through a staged trust pipeline and selects
//! a budget-constrained set covering the requested topics:
//!
//! - **Staged lifecycle**: candidate, enriched, verified snapshots with
//!   per-stage staleness TTLs
//! - **URL integrity**: discovered URLs are carried verbatim through every
//!   stage; nothing in the pipeline constructs one
//! - **Quality signals**: popularity, recency, authority, completeness
//!   normalized to [0, 1] per provider
//! - **Greedy selection**: weighted set cover over verified resources
//!   under resource-count and time budgets
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Curation pipeline                         │
//! │                                                              │
//! │  discovery   ┌───────────┐   ┌──────────┐   ┌──────────┐    │
//! │  ──────────► │ Candidate │──►│ Enriched │──►│ Verified │    │
//! │  (ledger)    └───────────┘   └──────────┘   └────┬─────┘    │
//! │                 1h / 30d        24h              │ 7d       │
//! │                                           ┌──────▼───────┐  │
//! │                                           │   Selector   │  │
//! │                                           └──────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod quality;
pub mod select;
pub mod signing;
pub mod storage;
pub mod types;
pub mod verify;

// Re-export main types
pub use config::{CurationConfig, QualityWeights, SelectionDefaults, TtlConfig};
pub use error::CurationError;
pub use lifecycle::{DiscoveredResource, DiscoveryLedger, ResourceLifecycle, VerificationContext};
pub use quality::{compute_quality, estimate_minutes};
pub use select::{ResourceSelectionCriteria, ResourceSelectionResult, ResourceSelector, SelectionMetadata};
pub use signing::{IntegritySigner, LocalKeySigner, SigningError};
pub use storage::{InMemoryResourceStore, ResourceStore};
pub use types::*;
pub use verify::{assess_usability, classify_accessibility};
