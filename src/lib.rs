//! Archive-Tree: a normalized tree view over Korean document archives
//!
//! This crate walks the ad-hoc navigation pages of the ITKC classical-texts
//! database and the Annals of the Joseon Dynasty search site, classifying each
//! node as a container or a leaf document, and flattens leaf pages back into
//! readable text. Every remote fetch goes through a single-flight cache.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod model;
pub mod sources;
pub mod storage;
pub mod text;

use thiserror::Error;

/// Main error type for archive operations
///
/// Cloneable so that every caller waiting on the same in-flight fetch can
/// receive the leader's failure.
#[derive(Debug, Clone, Error)]
pub enum ArchiveError {
    #[error("Network error for {url}: {detail}")]
    Network {
        url: String,
        status: Option<u16>,
        detail: String,
    },

    #[error("Malformed markup ({context}): {detail}")]
    MalformedMarkup { context: String, detail: String },

    #[error("Unexpected {field} format: {raw:?}")]
    DataFormat { field: String, raw: String },

    #[error("Unknown glyph code: {0}")]
    UnknownGlyphCode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),
}

impl ArchiveError {
    /// Builds a `MalformedMarkup` error for an expected element that is missing
    pub fn missing(context: &str, selector: &str) -> Self {
        Self::MalformedMarkup {
            context: context.to_string(),
            detail: format!("expected element `{}` not found", selector),
        }
    }

    /// Returns true if the caller may reasonably retry the request
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

impl From<storage::StorageError> for ArchiveError {
    fn from(err: storage::StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::{CacheKey, FetchCache};
pub use config::Config;
pub use crawler::{enumerate_leaves, Archive};
pub use model::{LeafDocument, ListingPage, Node, NodeKind};
pub use sources::SourceAdapter;
