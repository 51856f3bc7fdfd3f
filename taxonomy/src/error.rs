//! Error types for taxonomy operations.

/// Error types for topic registry and matcher operations.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    /// Topic id failed format validation
    #[error("Invalid topic id '{id}': {reason}")]
    InvalidTopicId { id: String, reason: String },

    /// Topic already registered
    #[error("Topic already exists: {0}")]
    TopicExists(String),

    /// Topic not found in the registry
    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    /// Referenced parent topic does not exist
    #[error("Parent topic not found: {0}")]
    ParentNotFound(String),

    /// Deletion rejected because the topic still has children
    #[error("Topic has children and cannot be deleted: {0}")]
    HasChildren(String),

    /// Prerequisite edges would form a cycle
    #[error("Circular prerequisite reference involving: {0}")]
    CircularReference(String),

    /// Underlying storage failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TaxonomyError {
    /// Stable error code used by the surrounding application's API layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTopicId { .. } => "INVALID_TOPIC_ID",
            Self::TopicExists(_) => "TOPIC_EXISTS",
            Self::TopicNotFound(_) => "TOPIC_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::HasChildren(_) => "HAS_CHILDREN",
            Self::CircularReference(_) => "CIRCULAR_REFERENCE",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}
