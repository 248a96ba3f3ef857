//! Card edits pushed through the sync manager

use crate::manager::CollectionSyncManager;
use deck_filter::STATUS_PROPERTY;
use serde_json::Value;

/// Status a card returns to when resubmitted for review
pub const RESUBMIT_STATUS: &str = "pending";

/// Edits single cards by id
///
/// Every edit copies the cached card, changes one field and hands the copy to
/// [`CollectionSyncManager::update_one`]. An unknown id is a `false` no-op.
#[derive(Debug, Clone)]
pub struct CardEditor {
    manager: CollectionSyncManager,
}

impl CardEditor {
    /// Create editor over `manager`
    #[must_use]
    pub fn new(manager: CollectionSyncManager) -> Self {
        Self { manager }
    }

    /// Set one field of the card with id `id`
    pub async fn set_field(
        &self,
        id: impl Into<Value>,
        property: impl Into<String>,
        value: impl Into<Value>,
    ) -> bool {
        let id = id.into();
        let Some(mut card) = self.manager.get_by_id(id.clone()) else {
            tracing::debug!(%id, "edit skipped; card not found");
            return false;
        };
        card.insert(property.into(), value.into());
        self.manager.update_one(card).await
    }

    /// Move a card to workflow `status`
    pub async fn set_status(&self, id: impl Into<Value>, status: &str) -> bool {
        self.set_field(id, STATUS_PROPERTY, status).await
    }

    /// Send a card back for review
    pub async fn resubmit(&self, id: impl Into<Value>) -> bool {
        self.set_status(id, RESUBMIT_STATUS).await
    }

    /// Manager edits go through
    #[inline]
    #[must_use]
    pub fn manager(&self) -> &CollectionSyncManager {
        &self.manager
    }
}
