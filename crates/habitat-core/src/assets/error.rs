//! Error types for module asset loading

use thiserror::Error;

/// Asset loading errors. A failure omits one module and leaves its siblings alone.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glTF in {path}: {source}")]
    Gltf {
        path: String,
        #[source]
        source: gltf::Error,
    },

    /// Format this loader cannot read (obj, fbx)
    #[error("Unsupported asset format: {0}")]
    Unsupported(String),

    /// Asset parsed but has nothing to pick
    #[error("Asset has no mesh geometry: {0}")]
    Empty(String),

    #[error("Failed to fetch asset {path}: {reason}")]
    Fetch { path: String, reason: String },
}

/// Result type for asset operations
pub type Result<T> = std::result::Result<T, AssetLoadError>;
