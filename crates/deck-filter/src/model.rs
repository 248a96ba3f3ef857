//! Filter descriptors and the record shape they test

use crate::condition::Condition;
use crate::value::FilterValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Item record: property name to JSON value
pub type Record = Map<String, Value>;

/// Read access to named fields of an item
///
/// The engine only ever asks for the single property a filter names, and
/// treats an absent field as its own case rather than as `null`.
pub trait Filterable {
    /// Field value for `property`, if present
    fn field(&self, property: &str) -> Option<&Value>;
}

impl Filterable for Record {
    #[inline]
    fn field(&self, property: &str) -> Option<&Value> {
        self.get(property)
    }
}

impl Filterable for Value {
    #[inline]
    fn field(&self, property: &str) -> Option<&Value> {
        self.get(property)
    }
}

impl<T: Filterable + ?Sized> Filterable for &T {
    #[inline]
    fn field(&self, property: &str) -> Option<&Value> {
        (**self).field(property)
    }
}

/// Declared type of a filter's value (informational only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Text values
    #[default]
    String,
    /// Numeric values
    Number,
    /// Boolean values
    Boolean,
}

impl ValueType {
    /// String tag for this type
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// A named predicate descriptor
///
/// `id` is supplied by the caller. Two producers using the same id share (or
/// clobber) one registry entry; see [`DuplicatePolicy`](crate::DuplicatePolicy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Registry key
    pub id: String,
    /// Item field this filter tests
    pub property: String,
    /// Comparison value; empty text means inactive
    #[serde(default)]
    pub value: FilterValue,
    /// Declared value type
    #[serde(default)]
    pub value_type: ValueType,
    /// Comparison operator
    #[serde(default)]
    pub condition: Condition,
    /// Tag of the UI region that created the filter
    #[serde(default)]
    pub set_location: String,
}

impl Filter {
    /// Create an unset filter for `property`
    #[must_use]
    pub fn new(id: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            property: property.into(),
            value: FilterValue::unset(),
            value_type: ValueType::default(),
            condition: Condition::Unset,
            set_location: String::new(),
        }
    }

    /// With comparison value
    #[inline]
    #[must_use]
    pub fn with_value(mut self, value: impl Into<FilterValue>) -> Self {
        self.value = value.into();
        self
    }

    /// With condition
    #[inline]
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = condition.into();
        self
    }

    /// With value type
    #[inline]
    #[must_use]
    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// With origin location tag
    #[inline]
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.set_location = location.into();
        self
    }

    /// Whether the filter carries a value
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.value.is_unset()
    }

    /// Clear value and condition
    pub fn reset(&mut self) {
        self.value = FilterValue::unset();
        self.condition = Condition::Unset;
    }

    /// Text of a descriptor field looked up by name
    ///
    /// Accepts the serialized (camelCase) names and their snake_case
    /// spellings. Unknown names yield `None`.
    #[must_use]
    pub fn field_text(&self, field: &str) -> Option<String> {
        match field {
            "id" => Some(self.id.clone()),
            "property" => Some(self.property.clone()),
            "value" => Some(self.value.to_string()),
            "valueType" | "value_type" => Some(self.value_type.as_str().to_string()),
            "condition" => Some(self.condition.as_str().to_string()),
            "setLocation" | "set_location" => Some(self.set_location.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_filter_is_inactive() {
        let filter = Filter::new("f1", "status").with_condition(Condition::Match);
        assert!(!filter.is_active());
    }

    #[test]
    fn reset_clears_value_and_condition() {
        let mut filter = Filter::new("f1", "status")
            .with_value("active")
            .with_condition("match");
        assert!(filter.is_active());

        filter.reset();
        assert!(!filter.is_active());
        assert_eq!(filter.condition, Condition::Unset);
    }

    #[test]
    fn deserializes_camel_case() {
        let filter: Filter = serde_json::from_value(json!({
            "id": "f1",
            "property": "status",
            "value": "active",
            "valueType": "string",
            "condition": "match",
            "setLocation": "menu"
        }))
        .unwrap();

        assert_eq!(filter.set_location, "menu");
        assert_eq!(filter.condition, Condition::Match);
        assert_eq!(filter.value, FilterValue::from("active"));
    }

    #[test]
    fn field_text_lookup() {
        let filter = Filter::new("f1", "status").with_location("menu");
        assert_eq!(filter.field_text("setLocation").as_deref(), Some("menu"));
        assert_eq!(filter.field_text("set_location").as_deref(), Some("menu"));
        assert_eq!(filter.field_text("valueType").as_deref(), Some("string"));
        assert_eq!(filter.field_text("nope"), None);
    }

    #[test]
    fn record_and_value_are_filterable() {
        let value = json!({"status": "active"});
        let record = value.as_object().unwrap().clone();
        assert_eq!(record.field("status"), Some(&json!("active")));
        assert_eq!(value.field("status"), Some(&json!("active")));
        assert_eq!(value.field("missing"), None);
    }
}
