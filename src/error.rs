//! Error types for the catalog sync engine.
//!
//! The taxonomy mirrors the failure policy of the engine:
//! - `Fetch` / `Extraction` are recoverable per item (skip and continue)
//! - `Assembly` wraps either of the above for a single item
//! - `Database` is fatal at sweep setup, recoverable never

use thiserror::Error;

/// Domain-specific errors for sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid or malformed URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network/HTTP failure while fetching a page
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Embedded payload missing or undecodable
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Failure while assembling one item; carries the item URL
    #[error("Failed to assemble item at {url}: {source}")]
    Assembly {
        url: String,
        #[source]
        source: Box<SyncError>,
    },

    /// Persistence gateway failure
    #[error("Database error: {0}")]
    Database(String),

    /// Generic error with context
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl SyncError {
    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create an extraction error
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Wrap an error as an assembly failure for the given item URL.
    pub fn assembly(url: impl Into<String>, source: SyncError) -> Self {
        Self::Assembly {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

/// Result type alias using SyncError.
pub type Result<T> = std::result::Result<T, SyncError>;
