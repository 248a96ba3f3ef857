//! Deck Sync - remote card collections for filtered list views
//!
//! - [`CollectionStore`]: the backend boundary (read-all, replace-all)
//! - [`MemoryStore`] and [`JsonFileStore`]: stores shipped with the crate
//! - [`CollectionSyncManager`]: cached collection, wholesale updates and
//!   an in-flight counter
//! - [`ListView`]: a [`deck_filter::FilterListEngine`] kept current from a
//!   registry and a manager
//! - [`CardEditor`]: single-card edits through the manager
//!
//! # Example
//!
//! ```rust,ignore
//! use deck_sync::{CollectionSyncManager, JsonFileStore, ListView, SyncConfig};
//! use deck_filter::FilterRegistry;
//! use std::sync::Arc;
//!
//! let store = Arc::new(JsonFileStore::open("cards.json")?);
//! let manager = CollectionSyncManager::connect(store, SyncConfig::new()).await;
//! let registry = Arc::new(FilterRegistry::new());
//! let mut view = ListView::bind(registry, manager, ["currentWorkflow"]);
//!
//! view.pump();
//! for card in view.visible() {
//!     println!("{}", card["cardTitle"]);
//! }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod editor;
pub mod error;
pub mod in_flight;
pub mod json_file;
pub mod manager;
pub mod memory;
pub mod store;
pub mod view;

pub use config::SyncConfig;
pub use editor::{CardEditor, RESUBMIT_STATUS};
pub use error::StoreError;
pub use in_flight::{InFlightCounter, InFlightGuard};
pub use json_file::{is_json_file, JsonFileStore};
pub use manager::{CollectionSyncManager, SyncOutcome};
pub use memory::MemoryStore;
pub use store::{Collection, CollectionStore, CrudResponse};
pub use view::{ListView, ViewChange};
