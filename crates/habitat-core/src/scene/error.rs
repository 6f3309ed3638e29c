//! Error types for scene configuration loading

use thiserror::Error;

/// Scene configuration errors. Never cached; a later load retries.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// No document exists under this id
    #[error("Scene config not found: {0}")]
    NotFound(String),

    /// Id cannot name a document (empty, or contains path components)
    #[error("Invalid scene config id: {0:?}")]
    InvalidId(String),

    /// Transport failure while fetching the document
    #[error("Failed to fetch scene config {id}: {reason}")]
    Fetch { id: String, reason: String },

    /// Document is not a valid scene description
    #[error("Failed to parse scene config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two descriptors share an id
    #[error("Duplicate module id: {0}")]
    DuplicateModuleId(String),
}

/// Result type for scene configuration operations
pub type Result<T> = std::result::Result<T, ConfigLoadError>;
