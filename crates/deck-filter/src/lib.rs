//! Deck Filter - reactive filters for card catalogs
//!
//! The filtering core shared by every list view:
//! - A [`FilterRegistry`] holding the canonical set of named filters
//! - A per-view [`FilterListEngine`] that narrows collections by the AND of
//!   its active per-property predicates
//! - Producers ([`Filterer`], [`MenuFilter`], [`SearchFilter`]) that write
//!   into the registry on user input
//!
//! # Example
//!
//! ```rust
//! use deck_filter::{Condition, Filter, FilterListEngine, FilterRegistry};
//! use serde_json::json;
//!
//! let registry = FilterRegistry::new();
//! let mut engine = FilterListEngine::with_config(["status"]);
//! let mut changes = registry.subscribe_changes();
//!
//! registry
//!     .register_filter(Filter::new("f1", "status").with_condition(Condition::Match))
//!     .unwrap();
//! registry.change_filter("f1", "active", Condition::Match);
//!
//! while let Ok(filter) = changes.try_recv() {
//!     engine.apply_filter(&filter);
//! }
//!
//! let cards = vec![json!({"id": 1, "status": "active"}), json!({"id": 2, "status": "paused"})];
//! assert_eq!(engine.filter_list(&cards).len(), 1);
//! ```

#![warn(unreachable_pub)]

pub mod condition;
pub mod engine;
pub mod error;
pub mod model;
pub mod producer;
pub mod registry;
pub mod value;

pub use condition::Condition;
pub use engine::{FilterListEngine, FilterState, DEFAULT_ID_PROPERTY};
pub use error::FilterError;
pub use model::{Filter, Filterable, Record, ValueType};
pub use producer::{Filterer, MenuFilter, MenuItem, SearchFilter, CARD_STATUSES, STATUS_PROPERTY};
pub use registry::{DuplicatePolicy, FilterRegistry, RegistryConfig, RegistryEvent};
pub use value::{loose_eq, FilterValue};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
