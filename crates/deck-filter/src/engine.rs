//! Filter predicate engine
//!
//! Provides [`FilterListEngine`], one per list view. The engine is configured
//! with the fixed set of item properties the view filters by, receives filter
//! changes from a shared registry, and narrows collections with the AND of
//! every active per-property predicate.
//!
//! # Evaluation rules
//! - a property is active when its value is not the empty text
//! - `Unset` and unrecognized conditions are skipped (fail-open)
//! - filters for properties outside the configured set are ignored

use crate::condition::Condition;
use crate::model::{Filter, Filterable};
use crate::value::{loose_eq, FilterValue};
use serde_json::Value;
use std::collections::HashMap;

/// Default item property holding the record id
pub const DEFAULT_ID_PROPERTY: &str = "id";

/// Stored value and condition for one allowed property
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// Comparison value; empty text is inactive
    pub value: FilterValue,
    /// Comparison operator
    pub condition: Condition,
}

impl FilterState {
    /// Whether this state narrows a list
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.value.is_unset() && self.condition.is_recognized()
    }

    /// Evaluate against one field; `None` when the state does not apply
    fn test(&self, field: Option<&Value>) -> Option<bool> {
        if self.value.is_unset() {
            return None;
        }
        match self.condition {
            Condition::Match => Some(loose_eq(field, &self.value)),
            Condition::IsNot => Some(!loose_eq(field, &self.value)),
            Condition::Includes => Some(includes(field, &self.value)),
            Condition::Unset | Condition::Unrecognized(_) => None,
        }
    }
}

/// Case-insensitive substring test; only text fields can match
fn includes(field: Option<&Value>, value: &FilterValue) -> bool {
    match field {
        Some(Value::String(text)) => text
            .to_lowercase()
            .contains(&value.to_string().to_lowercase()),
        _ => false,
    }
}

/// Per-view predicate engine
#[derive(Debug, Clone, Default)]
pub struct FilterListEngine {
    allowed: Vec<String>,
    states: HashMap<String, FilterState>,
}

impl FilterListEngine {
    /// Create engine with no allowed properties
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create engine configured for `allowed` properties
    #[must_use]
    pub fn with_config<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut engine = Self::new();
        engine.set_config(allowed);
        engine
    }

    /// Declare the properties this engine filters by
    ///
    /// Resets every per-property state to unset. Duplicate and empty names
    /// are dropped; order of first appearance is the evaluation order.
    pub fn set_config<I, S>(&mut self, allowed: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed.clear();
        self.states.clear();
        for property in allowed.into_iter().map(Into::into) {
            if property.is_empty() || self.states.contains_key(&property) {
                tracing::debug!(%property, "skipping empty or repeated allowed property");
                continue;
            }
            self.states.insert(property.clone(), FilterState::default());
            self.allowed.push(property);
        }
    }

    /// Store a filter's value and condition if its property is allowed
    ///
    /// Returns `false` and changes nothing otherwise.
    pub fn apply_filter(&mut self, filter: &Filter) -> bool {
        let Some(state) = self.states.get_mut(&filter.property) else {
            tracing::debug!(filter_id = %filter.id, property = %filter.property, "filter not allowed for this list");
            return false;
        };
        state.value = filter.value.clone();
        state.condition = filter.condition.clone();
        true
    }

    /// Configured properties, in evaluation order
    #[inline]
    #[must_use]
    pub fn allowed_properties(&self) -> &[String] {
        &self.allowed
    }

    /// Check if `property` is configured
    #[inline]
    #[must_use]
    pub fn is_allowed(&self, property: &str) -> bool {
        self.states.contains_key(property)
    }

    /// Stored state for `property`
    #[inline]
    #[must_use]
    pub fn state(&self, property: &str) -> Option<&FilterState> {
        self.states.get(property)
    }

    /// Allowed properties whose state currently narrows a list
    pub fn active_properties(&self) -> impl Iterator<Item = &str> + '_ {
        self.allowed
            .iter()
            .filter(|property| self.states[property.as_str()].is_active())
            .map(String::as_str)
    }

    /// Check if any allowed property is active
    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        self.active_properties().next().is_some()
    }

    /// Check one item against every active filter
    #[must_use]
    pub fn matches<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        self.allowed.iter().all(|property| {
            self.states[property.as_str()]
                .test(item.field(property))
                .unwrap_or(true)
        })
    }

    /// Lazily filtered view of `items`
    pub fn filter_iter<'a, T: Filterable + 'a>(
        &'a self,
        items: &'a [T],
    ) -> impl Iterator<Item = &'a T> + 'a {
        items.iter().filter(move |item| self.matches(*item))
    }

    /// Items passing every active filter, in input order
    #[must_use]
    pub fn filter_list<'a, T: Filterable>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(*item)).collect()
    }

    /// Visibility flag per item id
    ///
    /// With no active filters every id maps to `true`. Otherwise only ids of
    /// surviving items map to `true`. Ids are the text rendering of the
    /// `id_property` field; items without it are left out. Ids must be unique
    /// for the result to be meaningful.
    #[must_use]
    pub fn get_display_list<T: Filterable>(
        &self,
        items: &[T],
        id_property: &str,
    ) -> HashMap<String, bool> {
        let active = self.has_active_filters();
        let mut display = HashMap::with_capacity(items.len());

        for item in items {
            if let Some(id) = item.field(id_property) {
                display.insert(crate::value::field_text(id), !active);
            }
        }

        if active {
            for item in self.filter_iter(items) {
                if let Some(id) = item.field(id_property) {
                    display.insert(crate::value::field_text(id), true);
                }
            }
        }

        display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn items() -> Vec<Value> {
        vec![
            json!({"id": "1", "status": "active", "title": "A"}),
            json!({"id": "2", "status": "paused", "title": "B"}),
        ]
    }

    fn engine() -> FilterListEngine {
        FilterListEngine::with_config(["status", "title"])
    }

    #[test]
    fn scenario_match_then_reset() {
        let mut engine = engine();
        let items = items();

        let filter = Filter::new("f1", "status")
            .with_value("active")
            .with_condition(Condition::Match)
            .with_location("menu");
        assert!(engine.apply_filter(&filter));
        assert_eq!(engine.filter_list(&items), vec![&items[0]]);

        let mut reset = filter.clone();
        reset.reset();
        assert!(engine.apply_filter(&reset));
        assert_eq!(engine.filter_list(&items).len(), 2);
    }

    #[test]
    fn rejects_properties_outside_config() {
        let mut engine = engine();
        let before = engine.clone();

        let filter = Filter::new("f", "campaignId")
            .with_value("x")
            .with_condition(Condition::Match);
        assert!(!engine.apply_filter(&filter));
        assert_eq!(engine.state("campaignId"), None);
        assert_eq!(engine.state("status"), before.state("status"));
    }

    #[test]
    fn includes_is_case_insensitive() {
        let mut engine = FilterListEngine::with_config(["title"]);
        engine.apply_filter(
            &Filter::new("s", "title")
                .with_value("abc")
                .with_condition(Condition::Includes),
        );

        assert!(engine.matches(&json!({"title": "XaBcY"})));
        assert!(!engine.matches(&json!({"title": "xyz"})));
    }

    #[test]
    fn includes_excludes_non_text_fields() {
        let mut engine = FilterListEngine::with_config(["views"]);
        engine.apply_filter(
            &Filter::new("s", "views")
                .with_value("3")
                .with_condition(Condition::Includes),
        );

        assert!(!engine.matches(&json!({"views": 30})));
        assert!(!engine.matches(&json!({})));
        assert!(engine.matches(&json!({"views": "130"})));
    }

    #[test]
    fn is_not_keeps_missing_fields() {
        let mut engine = FilterListEngine::with_config(["status"]);
        engine.apply_filter(
            &Filter::new("s", "status")
                .with_value("active")
                .with_condition(Condition::IsNot),
        );

        assert!(engine.matches(&json!({"status": "paused"})));
        assert!(engine.matches(&json!({})));
        assert!(!engine.matches(&json!({"status": "active"})));
    }

    #[test]
    fn unknown_condition_is_skipped() {
        let mut engine = engine();
        engine.apply_filter(
            &Filter::new("s", "status")
                .with_value("active")
                .with_condition("starts-with"),
        );

        assert!(!engine.has_active_filters());
        assert_eq!(engine.filter_list(&items()).len(), 2);
    }

    #[test]
    fn numeric_filter_values_are_active() {
        let mut engine = FilterListEngine::with_config(["likes"]);
        engine.apply_filter(
            &Filter::new("n", "likes")
                .with_value(10)
                .with_condition(Condition::Match),
        );

        let cards = vec![json!({"likes": 10}), json!({"likes": "10"}), json!({"likes": 11})];
        assert_eq!(engine.filter_list(&cards).len(), 2);
    }

    #[test]
    fn display_list_all_visible_without_filters() {
        let engine = engine();
        let display = engine.get_display_list(&items(), DEFAULT_ID_PROPERTY);
        assert_eq!(display.len(), 2);
        assert!(display.values().all(|visible| *visible));
    }

    #[test]
    fn display_list_hides_filtered_ids() {
        let mut engine = engine();
        engine.apply_filter(
            &Filter::new("f1", "status")
                .with_value("paused")
                .with_condition(Condition::Match),
        );

        let display = engine.get_display_list(&items(), "id");
        assert_eq!(display.get("1"), Some(&false));
        assert_eq!(display.get("2"), Some(&true));
    }

    #[test]
    fn set_config_resets_and_dedupes() {
        let mut engine = engine();
        engine.apply_filter(
            &Filter::new("f1", "status")
                .with_value("paused")
                .with_condition(Condition::Match),
        );

        engine.set_config(["status", "status", "", "title"]);
        assert_eq!(engine.allowed_properties(), ["status", "title"]);
        assert!(!engine.has_active_filters());
    }

    #[test]
    fn filter_iter_is_lazy_and_ordered() {
        let mut engine = engine();
        engine.apply_filter(
            &Filter::new("f1", "title")
                .with_value("A")
                .with_condition(Condition::IsNot),
        );
        let items = items();
        let mut iter = engine.filter_iter(&items);
        assert_eq!(iter.next(), Some(&items[1]));
        assert_eq!(iter.next(), None);
    }
}
