//! Error types for storage backends
//!
//! Store errors stay inside this crate's sync layer: the
//! [`CollectionSyncManager`](crate::CollectionSyncManager) logs them and
//! resolves each operation to an empty or unchanged collection.

use std::path::PathBuf;

/// Storage backend errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend refused or could not serve the request
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// File-backed store opened on a path without a `.json` extension
    #[error("not a JSON file: {}", .0.display())]
    NotJsonFile(PathBuf),

    /// Filesystem failure
    #[error("io error on {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Stored or received data is not a collection of records
    #[error("malformed collection: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Response envelope carried no `items`
    #[error("response has no items")]
    MissingItems,
}

impl StoreError {
    /// Wrap an I/O error with the path it concerns
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if retrying the same call could succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io { .. })
    }
}
