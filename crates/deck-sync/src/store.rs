//! Storage boundary
//!
//! The sync manager only talks to its backend through [`CollectionStore`]:
//! one read-all and one wholesale replace. There is no partial update.

use crate::error::StoreError;
use deck_filter::Record;
use serde::{Deserialize, Serialize};

/// Flat ordered list of records
pub type Collection = Vec<Record>;

/// Remote collection endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CollectionStore: Send + Sync {
    /// Read the whole collection
    async fn fetch_all(&self) -> Result<Collection, StoreError>;

    /// Overwrite the whole collection
    ///
    /// Returns the collection the backend now holds.
    async fn replace_all(&self, items: Collection) -> Result<Collection, StoreError>;
}

/// `{ message, items }` response envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrudResponse {
    /// Status text from the backend
    #[serde(default)]
    pub message: String,
    /// Payload; absent on failed requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Collection>,
}

impl CrudResponse {
    /// Successful response carrying `items`
    #[must_use]
    pub fn ok(message: impl Into<String>, items: Collection) -> Self {
        Self {
            message: message.into(),
            items: Some(items),
        }
    }

    /// Take the payload
    ///
    /// # Errors
    /// `StoreError::MissingItems` when the envelope has no `items`.
    pub fn into_items(self) -> Result<Collection, StoreError> {
        self.items.ok_or(StoreError::MissingItems)
    }
}

/// On-disk or on-wire shape: a bare array or an envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum StoredCollection {
    Bare(Collection),
    Envelope(CrudResponse),
}

impl StoredCollection {
    pub(crate) fn into_items(self) -> Result<Collection, StoreError> {
        match self {
            Self::Bare(items) => Ok(items),
            Self::Envelope(response) => response.into_items(),
        }
    }
}
