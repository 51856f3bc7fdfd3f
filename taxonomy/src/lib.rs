//! Hierarchical Topic Taxonomy for Wayfinder
//!
//! This crate implements the topic side of resource curation: a
//! hierarchical topic registry with prerequisite ordering, and a weighted,
//! regex-free token matcher for classifying free-form learning goals.
//!
//! # Key Components
//!
//! - [`TopicTaxonomy`]: owned topic registry (CRUD, tree navigation,
//!   prerequisite graph, learning paths); rebuilds its matcher on mutation
//! - [`TokenMatcher`]: weighted exact/prefix/contains token scoring,
//!   immune to catastrophic backtracking by construction
//! - [`TopicStore`]: key-value persistence contract with an in-memory
//!   reference implementation
//!
//! # Example
//!
//! ```
//! use taxonomy::{CreateTopicInput, MatchOptions, TopicCategory, TopicTaxonomy};
//!
//! let mut registry = TopicTaxonomy::new();
//! let input: CreateTopicInput = serde_json::from_value(serde_json::json!({
//!     "id": "language",
//!     "name": "Programming Languages",
//!     "category": "language",
//!     "keywords": ["programming"],
//! })).unwrap();
//! registry.create(input).unwrap();
//!
//! let matches = registry.classify("programming basics", &MatchOptions::default());
//! assert_eq!(matches.len(), 1);
//! ```

pub mod error;
pub mod matcher;
pub mod navigate;
pub mod registry;
pub mod storage;
pub mod types;

// Re-export main types
pub use error::TaxonomyError;
pub use matcher::{normalize_text, MatchOptions, TokenMatcher, DEFAULT_MIN_SCORE};
pub use registry::TopicTaxonomy;
pub use storage::{InMemoryTopicStore, TopicStore};
pub use types::*;
