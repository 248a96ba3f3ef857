//! Shared filter registry
//!
//! Provides [`FilterRegistry`], the canonical set of active filters. Any number
//! of producers (menus, search bars) write into one registry, and any number
//! of list views subscribe to its change and delete channels.
//!
//! Notifications go out on `tokio::sync::broadcast` channels owned by the
//! registry instance: one per kind, plus [`subscribe`](FilterRegistry::subscribe)
//! carrying both kinds as [`RegistryEvent`]s on a single stream. They are sent
//! while the map lock is held, so two mutations of the same id are always
//! observed in the order they were made. Receivers created after a mutation
//! do not see it.

use crate::condition::Condition;
use crate::error::FilterError;
use crate::model::Filter;
use crate::value::FilterValue;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// What [`FilterRegistry::register_filter`] does when the id is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Replace the existing filter (last writer wins) and notify
    #[default]
    Overwrite,
    /// Keep the existing filter and hand its id to the new producer
    Share,
    /// Refuse the registration
    Reject,
}

/// Registry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Policy for ids that are already registered
    pub duplicate_policy: DuplicatePolicy,
    /// Buffered notifications per channel before slow receivers lag
    pub channel_capacity: usize,
}

impl RegistryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With duplicate-id policy
    #[inline]
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// With channel capacity
    #[inline]
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Overwrite,
            channel_capacity: 64,
        }
    }
}

/// One registry mutation, as seen on [`FilterRegistry::subscribe`]
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// Registered, changed or reset
    Changed(Filter),
    /// Removed
    Deleted(Filter),
}

impl RegistryEvent {
    /// Filter carried by the event
    #[inline]
    #[must_use]
    pub fn filter(&self) -> &Filter {
        match self {
            Self::Changed(filter) | Self::Deleted(filter) => filter,
        }
    }
}

/// Canonical set of filters keyed by id
#[derive(Debug)]
pub struct FilterRegistry {
    filters: RwLock<IndexMap<String, Filter>>,
    policy: DuplicatePolicy,
    changed: broadcast::Sender<Filter>,
    deleted: broadcast::Sender<Filter>,
    events: broadcast::Sender<RegistryEvent>,
}

impl FilterRegistry {
    /// Create empty registry with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create empty registry
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        let capacity = config.channel_capacity.max(1);
        let (changed, _) = broadcast::channel(capacity);
        let (deleted, _) = broadcast::channel(capacity);
        let (events, _) = broadcast::channel(capacity);
        Self {
            filters: RwLock::new(IndexMap::new()),
            policy: config.duplicate_policy,
            changed,
            deleted,
            events,
        }
    }

    /// Active duplicate-id policy
    #[inline]
    #[must_use]
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Receive every filter change (registration, change, reset)
    #[must_use]
    pub fn subscribe_changes(&self) -> broadcast::Receiver<Filter> {
        self.changed.subscribe()
    }

    /// Receive every removed filter
    #[must_use]
    pub fn subscribe_deletes(&self) -> broadcast::Receiver<Filter> {
        self.deleted.subscribe()
    }

    /// Receive changes and deletes interleaved in mutation order
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Store `filter` under its id
    ///
    /// # Errors
    /// `FilterError::DuplicateId` when the id is taken and the policy is
    /// [`DuplicatePolicy::Reject`]. The other policies always succeed.
    pub fn register_filter(&self, filter: Filter) -> Result<String, FilterError> {
        let mut filters = self.filters.write();
        let id = filter.id.clone();

        if filters.contains_key(&id) {
            match self.policy {
                DuplicatePolicy::Overwrite => {
                    tracing::debug!(filter_id = %id, "filter id reused; overwriting");
                }
                DuplicatePolicy::Share => {
                    tracing::debug!(filter_id = %id, "filter id reused; sharing existing entry");
                    return Ok(id);
                }
                DuplicatePolicy::Reject => return Err(FilterError::DuplicateId(id)),
            }
        }

        tracing::debug!(filter_id = %id, property = %filter.property, "filter registered");
        filters.insert(id.clone(), filter.clone());
        self.emit_change(filter);
        Ok(id)
    }

    /// Update value and condition of a registered filter
    ///
    /// Returns `false` without notifying when `id` is unknown.
    pub fn change_filter(
        &self,
        id: &str,
        value: impl Into<FilterValue>,
        condition: impl Into<Condition>,
    ) -> bool {
        let mut filters = self.filters.write();
        let Some(filter) = filters.get_mut(id) else {
            tracing::debug!(filter_id = %id, "change ignored; unknown filter");
            return false;
        };

        filter.value = value.into();
        filter.condition = condition.into();
        tracing::debug!(filter_id = %id, value = %filter.value, condition = %filter.condition, "filter changed");
        let snapshot = filter.clone();
        self.emit_change(snapshot);
        true
    }

    /// Clear value and condition of a registered filter
    #[inline]
    pub fn reset_filter(&self, id: &str) -> bool {
        self.change_filter(id, FilterValue::unset(), Condition::Unset)
    }

    /// Reset every filter; returns how many were reset
    pub fn reset_all_filters(&self) -> usize {
        self.reset_where(|_| true)
    }

    /// Reset every filter created at `location`; returns how many were reset
    pub fn reset_filters_by_location(&self, location: &str) -> usize {
        self.reset_where(|filter| filter.set_location == location)
    }

    /// Remove a filter and notify delete subscribers
    pub fn delete_filter(&self, id: &str) -> bool {
        let mut filters = self.filters.write();
        match filters.shift_remove(id) {
            Some(removed) => {
                tracing::debug!(filter_id = %id, "filter deleted");
                self.emit_delete(removed);
                true
            }
            None => false,
        }
    }

    /// Remove every filter; returns how many were removed
    pub fn delete_all_filters(&self) -> usize {
        let mut filters = self.filters.write();
        let count = filters.len();
        for (_, removed) in filters.drain(..) {
            self.emit_delete(removed);
        }
        tracing::debug!(count, "all filters deleted");
        count
    }

    /// Look up one filter
    #[must_use]
    pub fn get_filter_by_id(&self, id: &str) -> Option<Filter> {
        self.filters.read().get(id).cloned()
    }

    /// Snapshot of every filter, in registration order
    #[must_use]
    pub fn get_all_filters(&self) -> Vec<Filter> {
        self.filters.read().values().cloned().collect()
    }

    /// Filters whose descriptor field `field` renders as `value`
    ///
    /// `field` is a descriptor field name such as `property` or `setLocation`
    /// (see [`Filter::field_text`]).
    #[must_use]
    pub fn get_filters_by_property(&self, field: &str, value: &str) -> Vec<Filter> {
        self.filters
            .read()
            .values()
            .filter(|filter| filter.field_text(field).as_deref() == Some(value))
            .cloned()
            .collect()
    }

    /// Filters targeting item `property`, optionally limited to one location
    #[must_use]
    pub fn get_filters(&self, property: &str, location: Option<&str>) -> Vec<Filter> {
        self.filters
            .read()
            .values()
            .filter(|filter| filter.property == property)
            .filter(|filter| location.map_or(true, |loc| filter.set_location == loc))
            .cloned()
            .collect()
    }

    /// Check if `id` is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.filters.read().contains_key(id)
    }

    /// Number of registered filters
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.read().len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.read().is_empty()
    }

    fn reset_where(&self, mut predicate: impl FnMut(&Filter) -> bool) -> usize {
        let mut filters = self.filters.write();
        let mut count = 0;
        for filter in filters.values_mut().filter(|filter| predicate(filter)) {
            filter.reset();
            count += 1;
            self.emit_change(filter.clone());
        }
        tracing::debug!(count, "filters reset");
        count
    }

    fn emit_change(&self, filter: Filter) {
        // no receivers is not an error
        let _ = self.events.send(RegistryEvent::Changed(filter.clone()));
        let _ = self.changed.send(filter);
    }

    fn emit_delete(&self, filter: Filter) {
        let _ = self.events.send(RegistryEvent::Deleted(filter.clone()));
        let _ = self.deleted.send(filter);
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
