//! Error types for the artifact store.

/// Result type for artifact store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during artifact store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Handle was never issued, is malformed, or its tombstone has been pruned
    #[error("Artifact not found: {id}")]
    NotFound { id: String },

    /// Handle was issued but the artifact has outlived its TTL
    #[error("Artifact expired: {id}")]
    Expired { id: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl StoreError {
    /// Whether this error represents a lookup miss (missing or expired).
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Expired { .. })
    }
}
