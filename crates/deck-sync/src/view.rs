//! List view binding
//!
//! [`ListView`] wires one [`FilterListEngine`] to a shared [`FilterRegistry`]
//! and a [`CollectionSyncManager`]. It keeps the latest collection and the
//! engine state current, either by draining pending notifications with
//! [`pump`](ListView::pump) or by awaiting them with
//! [`changed`](ListView::changed).

use crate::manager::CollectionSyncManager;
use crate::store::Collection;
use deck_filter::{Filter, FilterListEngine, FilterRegistry, Record, RegistryEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;

/// One notification applied to a view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange {
    /// A filter was registered, changed or reset
    Filter {
        /// Filter as emitted
        filter: Filter,
        /// Whether this view filters by its property
        applied: bool,
    },
    /// A filter was deleted
    ///
    /// The view falls back to the last active filter still registered for the
    /// same property, or resets the property when there is none.
    Deleted {
        /// Filter as removed
        filter: Filter,
        /// Whether this view filters by its property
        applied: bool,
    },
    /// A fetch or update settled with this many items
    Collection(usize),
    /// Notifications were missed and the view was rebuilt
    Resynced,
    /// Every source has shut down
    Closed,
}

/// Filtered list bound to a registry and a sync manager
#[derive(Debug)]
pub struct ListView {
    registry: Arc<FilterRegistry>,
    manager: CollectionSyncManager,
    engine: FilterListEngine,
    items: Collection,
    events: Receiver<RegistryEvent>,
    collections: Receiver<Collection>,
}

impl ListView {
    /// Bind a view filtering by `allowed` properties
    ///
    /// Subscribes before reading, then seeds the items from the manager's
    /// cache and the engine from the registry's current filters.
    #[must_use]
    pub fn bind<I, S>(
        registry: Arc<FilterRegistry>,
        manager: CollectionSyncManager,
        allowed: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let events = registry.subscribe();
        let collections = manager.subscribe();

        let mut view = Self {
            engine: FilterListEngine::with_config(allowed),
            items: manager.get_all(),
            registry,
            manager,
            events,
            collections,
        };
        view.seed_filters();
        view
    }

    /// Apply every pending notification; returns how many were applied
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let before = applied;

            match self.events.try_recv() {
                Ok(event) => {
                    self.on_event(event);
                    applied += 1;
                }
                Err(TryRecvError::Lagged(missed)) => {
                    self.resync(missed);
                    applied += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => {}
            }

            match self.collections.try_recv() {
                Ok(items) => {
                    self.items = items;
                    applied += 1;
                }
                Err(TryRecvError::Lagged(missed)) => {
                    self.resync(missed);
                    applied += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => {}
            }

            if applied == before {
                return applied;
            }
        }
    }

    /// Wait for the next notification and apply it
    pub async fn changed(&mut self) -> ViewChange {
        tokio::select! {
            received = self.events.recv() => match received {
                Ok(event) => self.on_event(event),
                Err(err) => self.on_recv_error(err),
            },
            received = self.collections.recv() => match received {
                Ok(items) => {
                    self.items = items;
                    ViewChange::Collection(self.items.len())
                }
                Err(err) => self.on_recv_error(err),
            },
        }
    }

    /// Items passing every active filter, in collection order
    #[must_use]
    pub fn visible(&self) -> Vec<&Record> {
        self.engine.filter_list(&self.items)
    }

    /// Visibility flag per item id
    #[must_use]
    pub fn display_list(&self) -> HashMap<String, bool> {
        self.engine
            .get_display_list(&self.items, &self.manager.config().id_property)
    }

    /// Latest collection, unfiltered
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[Record] {
        &self.items
    }

    /// Engine holding this view's filter state
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &FilterListEngine {
        &self.engine
    }

    /// Manager this view reads from
    #[inline]
    #[must_use]
    pub fn manager(&self) -> &CollectionSyncManager {
        &self.manager
    }

    /// Rebuild items and engine state from their sources
    pub fn resync(&mut self, missed: u64) {
        tracing::warn!(missed, "list view lagged; resyncing");
        let allowed = self.engine.allowed_properties().to_vec();
        self.engine.set_config(allowed);
        self.seed_filters();
        self.items = self.manager.get_all();
    }

    /// Apply the active filters in registration order; the last one per
    /// property wins
    fn seed_filters(&mut self) {
        let filters = self.registry.get_all_filters();
        for filter in filters.iter().filter(|filter| filter.is_active()) {
            self.engine.apply_filter(filter);
        }
    }

    fn on_event(&mut self, event: RegistryEvent) -> ViewChange {
        match event {
            RegistryEvent::Changed(filter) => {
                let applied = self.engine.apply_filter(&filter);
                ViewChange::Filter { filter, applied }
            }
            RegistryEvent::Deleted(filter) => {
                let applied = self.on_delete(&filter);
                ViewChange::Deleted { filter, applied }
            }
        }
    }

    fn on_delete(&mut self, filter: &Filter) -> bool {
        let mut cleared = filter.clone();
        cleared.reset();
        if !self.engine.apply_filter(&cleared) {
            return false;
        }
        let survivor = self
            .registry
            .get_filters(&filter.property, None)
            .into_iter()
            .rev()
            .find(Filter::is_active);
        if let Some(survivor) = survivor {
            tracing::debug!(filter_id = %filter.id, survivor = %survivor.id, "deleted filter's property taken over");
            self.engine.apply_filter(&survivor);
        }
        true
    }

    fn on_recv_error(&mut self, err: RecvError) -> ViewChange {
        match err {
            RecvError::Lagged(missed) => {
                self.resync(missed);
                ViewChange::Resynced
            }
            RecvError::Closed => ViewChange::Closed,
        }
    }
}
