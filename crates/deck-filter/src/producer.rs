//! Filter producers
//!
//! UI controls that write into a shared [`FilterRegistry`]:
//! - [`Filterer`]: one filter id with a fixed property and condition
//! - [`MenuFilter`]: pick-one menu with a leading "show all" entry
//! - [`SearchFilter`]: free-text `includes` search
//!
//! Each producer holds a caller-supplied id. Producers created with the same id
//! address the same registry entry.

use crate::condition::Condition;
use crate::error::FilterError;
use crate::model::{Filter, Record, ValueType};
use crate::registry::FilterRegistry;
use crate::value::{field_text, FilterValue};
use std::sync::Arc;

/// Card workflow statuses offered by [`MenuFilter::status_menu`]
pub const CARD_STATUSES: [&str; 7] = [
    "saved",
    "pending",
    "active",
    "paused",
    "expired",
    "declined",
    "terminated",
];

/// Item property holding a card's workflow status
pub const STATUS_PROPERTY: &str = "currentWorkflow";

/// Registers one filter and changes or resets its value
#[derive(Debug, Clone)]
pub struct Filterer {
    registry: Arc<FilterRegistry>,
    id: String,
    property: String,
    condition: Condition,
    value_type: ValueType,
    location: String,
    initial_value: FilterValue,
    registered: bool,
}

impl Filterer {
    /// Location tag used when none is given
    pub const DEFAULT_LOCATION: &'static str = "filterer";

    /// Create an unregistered producer
    #[must_use]
    pub fn new(
        registry: Arc<FilterRegistry>,
        id: impl Into<String>,
        property: impl Into<String>,
        condition: Condition,
    ) -> Self {
        Self {
            registry,
            id: id.into(),
            property: property.into(),
            condition,
            value_type: ValueType::String,
            location: Self::DEFAULT_LOCATION.to_string(),
            initial_value: FilterValue::unset(),
            registered: false,
        }
    }

    /// With origin location tag
    #[inline]
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// With declared value type
    #[inline]
    #[must_use]
    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// With the value the filter is registered with
    #[inline]
    #[must_use]
    pub fn with_initial_value(mut self, value: impl Into<FilterValue>) -> Self {
        self.initial_value = value.into();
        self
    }

    /// Register the filter with the registry
    ///
    /// # Errors
    /// Propagates `FilterError::DuplicateId` from a rejecting registry.
    pub fn register(&mut self) -> Result<&str, FilterError> {
        let filter = Filter::new(self.id.clone(), self.property.clone())
            .with_value(self.initial_value.clone())
            .with_condition(self.condition.clone())
            .with_value_type(self.value_type)
            .with_location(self.location.clone());
        self.registry.register_filter(filter)?;
        self.registered = true;
        Ok(&self.id)
    }

    /// Set a new value under this producer's condition
    pub fn change(&self, value: impl Into<FilterValue>) -> bool {
        self.registry
            .change_filter(&self.id, value, self.condition.clone())
    }

    /// Reset the filter to unset
    pub fn reset(&self) -> bool {
        self.registry.reset_filter(&self.id)
    }

    /// Current registry entry for this producer's id
    #[must_use]
    pub fn current(&self) -> Option<Filter> {
        self.registry.get_filter_by_id(&self.id)
    }

    /// Filter id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Item property targeted
    #[inline]
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Origin location tag
    #[inline]
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Whether [`register`](Self::register) succeeded
    #[inline]
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registered
    }
}

/// One entry of a menu built by [`MenuFilter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Label shown to the user
    pub label: String,
    /// Index into the option list; `None` for the "show all" entry
    pub data_index: Option<usize>,
}

/// Pick-one menu bound to a `match` filter
#[derive(Debug, Clone)]
pub struct MenuFilter {
    filterer: Filterer,
    options: Vec<Record>,
    label_property: String,
    value_property: String,
    show_all_label: String,
    selected: usize,
}

impl MenuFilter {
    /// Location tag used when none is given
    pub const DEFAULT_LOCATION: &'static str = "menu-filter";

    /// Create a menu over `options`
    ///
    /// Each option contributes its `label_property` as the menu label and its
    /// `value_property` as the filter value.
    #[must_use]
    pub fn new(
        registry: Arc<FilterRegistry>,
        id: impl Into<String>,
        property: impl Into<String>,
        options: Vec<Record>,
        label_property: impl Into<String>,
        value_property: impl Into<String>,
    ) -> Self {
        Self {
            filterer: Filterer::new(registry, id, property, Condition::Match)
                .with_location(Self::DEFAULT_LOCATION),
            options,
            label_property: label_property.into(),
            value_property: value_property.into(),
            show_all_label: "All".to_string(),
            selected: 0,
        }
    }

    /// Card-status menu over [`CARD_STATUSES`]
    #[must_use]
    pub fn status_menu(registry: Arc<FilterRegistry>, id: impl Into<String>) -> Self {
        let options = CARD_STATUSES
            .iter()
            .map(|status| {
                let mut option = Record::new();
                option.insert("label".to_string(), capitalize(status).into());
                option.insert("workflow".to_string(), (*status).into());
                option
            })
            .collect();
        Self::new(registry, id, STATUS_PROPERTY, options, "label", "workflow")
            .with_location("status-menu")
    }

    /// With origin location tag
    #[inline]
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.filterer = self.filterer.with_location(location);
        self
    }

    /// With label of the "show all" entry
    #[inline]
    #[must_use]
    pub fn with_show_all_label(mut self, label: impl Into<String>) -> Self {
        self.show_all_label = label.into();
        self
    }

    /// Register the filter and return the menu, selecting "show all"
    ///
    /// # Errors
    /// Propagates `FilterError::DuplicateId` from a rejecting registry.
    pub fn create_menu(&mut self) -> Result<Vec<MenuItem>, FilterError> {
        self.filterer.register()?;
        self.selected = 0;
        Ok(self.menu_items())
    }

    /// Menu entries: "show all" first, then one per option
    #[must_use]
    pub fn menu_items(&self) -> Vec<MenuItem> {
        let options = self.options.iter().enumerate().map(|(index, option)| MenuItem {
            label: option
                .get(&self.label_property)
                .map(field_text)
                .unwrap_or_default(),
            data_index: Some(index),
        });

        std::iter::once(MenuItem {
            label: self.show_all_label.clone(),
            data_index: None,
        })
        .chain(options)
        .collect()
    }

    /// Select a menu entry
    ///
    /// An option sets the filter to its value; "show all" resets the filter.
    /// Returns `false` for an index past the option list or an unregistered
    /// filter.
    pub fn select(&mut self, data_index: Option<usize>) -> bool {
        match data_index {
            None => {
                self.selected = 0;
                self.filterer.reset()
            }
            Some(index) => {
                let Some(option) = self.options.get(index) else {
                    return false;
                };
                let value = option
                    .get(&self.value_property)
                    .map(FilterValue::from_json)
                    .unwrap_or_default();
                self.selected = index + 1;
                self.filterer.change(value)
            }
        }
    }

    /// Position of the selected entry in [`menu_items`](Self::menu_items)
    #[inline]
    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Underlying producer
    #[inline]
    #[must_use]
    pub fn filterer(&self) -> &Filterer {
        &self.filterer
    }
}

/// Free-text search bound to an `includes` filter
#[derive(Debug, Clone)]
pub struct SearchFilter {
    filterer: Filterer,
    input: String,
}

impl SearchFilter {
    /// Filter id used when none is given
    pub const DEFAULT_ID: &'static str = "search-bar";
    /// Location tag used when none is given
    pub const DEFAULT_LOCATION: &'static str = "search-filter";

    /// Create a search over `property` with the default id
    #[must_use]
    pub fn new(registry: Arc<FilterRegistry>, property: impl Into<String>) -> Self {
        Self::with_id(registry, Self::DEFAULT_ID, property)
    }

    /// Create a search with an explicit id
    #[must_use]
    pub fn with_id(
        registry: Arc<FilterRegistry>,
        id: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            filterer: Filterer::new(registry, id, property, Condition::Includes)
                .with_location(Self::DEFAULT_LOCATION),
            input: String::new(),
        }
    }

    /// With origin location tag
    #[inline]
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.filterer = self.filterer.with_location(location);
        self
    }

    /// Register the filter
    ///
    /// When the registry keeps an existing entry for this id (shared ids) and
    /// it carries a value, the input box adopts that value.
    ///
    /// # Errors
    /// Propagates `FilterError::DuplicateId` from a rejecting registry.
    pub fn register(&mut self) -> Result<(), FilterError> {
        self.filterer.register()?;
        if let Some(existing) = self.filterer.current().filter(Filter::is_active) {
            self.input = existing.value.to_string();
        }
        Ok(())
    }

    /// Text typed into the search box
    pub fn on_text_input(&mut self, text: impl Into<String>) -> bool {
        self.input = text.into();
        self.filterer.change(self.input.clone())
    }

    /// Clear the search box and reset the filter
    pub fn on_cancel(&mut self) -> bool {
        self.input.clear();
        self.filterer.reset()
    }

    /// Current search text
    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Underlying producer
    #[inline]
    #[must_use]
    pub fn filterer(&self) -> &Filterer {
        &self.filterer
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
