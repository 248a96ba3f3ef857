//! Collection sync manager
//!
//! Holds the server-confirmed copy of a remote collection and pushes local
//! edits back as wholesale replacements.
//!
//! # Notifications
//!
//! - collection received: a `broadcast` channel carrying the cached
//!   collection each time a fetch or update settles, success or not
//! - in flight: a `watch` channel carrying the number of outstanding
//!   fetches and updates (see [`InFlightCounter`])
//!
//! # Failure semantics
//!
//! Store errors never reach the caller. A failed fetch clears the cache; a
//! failed update keeps it. Both are logged and both still settle the counter
//! and emit. There is no retry and no cancellation: every issued operation
//! runs to completion, and the last one to settle is what the cache holds.

use crate::config::SyncConfig;
use crate::in_flight::{InFlightCounter, InFlightGuard};
use crate::store::{Collection, CollectionStore};
use deck_filter::Record;
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// How a remote operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncOutcome {
    /// Backend answered; the cache holds its collection
    Confirmed,
    /// Backend failed; the cache was cleared (fetch) or kept (update)
    Failed,
}

impl SyncOutcome {
    /// Check if the backend confirmed the operation
    #[inline]
    #[must_use]
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

struct Shared {
    store: Arc<dyn CollectionStore>,
    config: SyncConfig,
    cache: RwLock<Collection>,
    in_flight: InFlightCounter,
    received: broadcast::Sender<Collection>,
    response_received: AtomicBool,
}

/// Cached view of a remote collection
///
/// Cloning is cheap; clones share one cache and one set of channels.
#[derive(Clone)]
pub struct CollectionSyncManager {
    shared: Arc<Shared>,
}

impl CollectionSyncManager {
    /// Create a manager and start the initial fetch in the background
    ///
    /// The in-flight count is already 1 when this returns.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(store: Arc<dyn CollectionStore>, config: SyncConfig) -> Self {
        let manager = Self::unfetched(store, config);
        let guard = manager.shared.in_flight.begin();
        let task = manager.clone();
        tokio::spawn(async move {
            task.fetch_with(guard).await;
        });
        manager
    }

    /// Create a manager and wait for the initial fetch to settle
    pub async fn connect(store: Arc<dyn CollectionStore>, config: SyncConfig) -> Self {
        Self::connect_with_outcome(store, config).await.0
    }

    /// Like [`connect`](Self::connect), also reporting how the fetch ended
    pub async fn connect_with_outcome(
        store: Arc<dyn CollectionStore>,
        config: SyncConfig,
    ) -> (Self, SyncOutcome) {
        let manager = Self::unfetched(store, config);
        let outcome = manager.fetch().await;
        (manager, outcome)
    }

    fn unfetched(store: Arc<dyn CollectionStore>, config: SyncConfig) -> Self {
        let (received, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                store,
                config,
                cache: RwLock::new(Vec::new()),
                in_flight: InFlightCounter::new(),
                received,
                response_received: AtomicBool::new(false),
            }),
        }
    }

    /// Copy of the cached collection
    #[must_use]
    pub fn get_all(&self) -> Collection {
        self.shared.cache.read().clone()
    }

    /// First cached item whose id strictly equals `id`
    #[must_use]
    pub fn get_by_id(&self, id: impl Into<Value>) -> Option<Record> {
        let id = id.into();
        let id_property = &self.shared.config.id_property;
        self.shared
            .cache
            .read()
            .iter()
            .find(|item| item.get(id_property) == Some(&id))
            .cloned()
    }

    /// Number of cached items
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.cache.read().len()
    }

    /// Check if the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.cache.read().is_empty()
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.shared.config
    }

    /// Receive the collection each time an operation settles
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.shared.received.subscribe()
    }

    /// Receive the outstanding operation count
    #[must_use]
    pub fn subscribe_in_flight(&self) -> watch::Receiver<usize> {
        self.shared.in_flight.subscribe()
    }

    /// Outstanding fetches and updates
    #[inline]
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.current()
    }

    /// Check if any fetch or update has settled
    #[inline]
    #[must_use]
    pub fn has_response(&self) -> bool {
        self.shared.response_received.load(Ordering::Acquire)
    }

    /// Wait until no fetch or update is outstanding
    pub async fn settled(&self) {
        self.shared.in_flight.settled().await;
    }

    /// Re-read the whole collection from the store
    pub async fn fetch(&self) -> SyncOutcome {
        let guard = self.shared.in_flight.begin();
        self.fetch_with(guard).await
    }

    /// Push the cached collection to the store
    ///
    /// On success the cache becomes whatever the store returned. On failure
    /// the cache is kept. Either way the configured settle delay elapses
    /// before the counter drops and the collection is emitted.
    pub async fn update_all(&self) -> SyncOutcome {
        let guard = self.shared.in_flight.begin();
        self.update_with(guard).await
    }

    /// Start [`update_all`](Self::update_all) without waiting for it
    ///
    /// The in-flight count includes the update when this returns.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn spawn_update_all(&self) -> tokio::task::JoinHandle<SyncOutcome> {
        let guard = self.shared.in_flight.begin();
        let task = self.clone();
        tokio::spawn(async move { task.update_with(guard).await })
    }

    /// Replace one cached item by id and push the collection
    ///
    /// Returns `false` without touching the cache or the store when `item`
    /// has no id or no cached item has that id. Otherwise returns `true`
    /// once the update settles, whatever its outcome.
    pub async fn update_one(&self, item: Record) -> bool {
        let id_property = &self.shared.config.id_property;
        let Some(id) = item.get(id_property).cloned() else {
            tracing::debug!(property = %id_property, "update skipped; item has no id");
            return false;
        };

        {
            let mut cache = self.shared.cache.write();
            let Some(slot) = cache
                .iter_mut()
                .find(|cached| cached.get(id_property) == Some(&id))
            else {
                tracing::debug!(%id, "update skipped; id not cached");
                return false;
            };
            *slot = item;
        }

        self.update_all().await;
        true
    }

    async fn fetch_with(&self, guard: InFlightGuard) -> SyncOutcome {
        let outcome = match self.shared.store.fetch_all().await {
            Ok(items) => {
                tracing::debug!(items = items.len(), "collection fetched");
                *self.shared.cache.write() = items;
                SyncOutcome::Confirmed
            }
            Err(error) => {
                tracing::error!(%error, transient = error.is_transient(), "collection fetch failed");
                self.shared.cache.write().clear();
                SyncOutcome::Failed
            }
        };
        self.settle(guard);
        outcome
    }

    async fn update_with(&self, guard: InFlightGuard) -> SyncOutcome {
        let snapshot = self.get_all();
        let outcome = match self.shared.store.replace_all(snapshot).await {
            Ok(items) => {
                tracing::debug!(items = items.len(), "collection replaced");
                *self.shared.cache.write() = items;
                SyncOutcome::Confirmed
            }
            Err(error) => {
                tracing::warn!(%error, transient = error.is_transient(), "collection update failed; keeping cached copy");
                SyncOutcome::Failed
            }
        };

        let delay = self.shared.config.settle_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.settle(guard);
        outcome
    }

    fn settle(&self, guard: InFlightGuard) {
        self.shared.response_received.store(true, Ordering::Release);
        drop(guard);
        // no receivers is not an error
        let _ = self.shared.received.send(self.get_all());
    }
}

impl fmt::Debug for CollectionSyncManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionSyncManager")
            .field("items", &self.len())
            .field("in_flight", &self.in_flight())
            .field("has_response", &self.has_response())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}
