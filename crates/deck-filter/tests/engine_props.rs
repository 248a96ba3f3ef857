use deck_filter::{Condition, Filter, FilterListEngine, Record};
use proptest::prelude::*;
use serde_json::{json, Value};

const STATUSES: [&str; 4] = ["active", "paused", "saved", "expired"];

fn card(id: usize, status: &str, title: &str) -> Record {
    let value = json!({"id": id, "status": status, "title": title});
    match value {
        Value::Object(record) => record,
        _ => unreachable!(),
    }
}

fn cards_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec((0..STATUSES.len(), "[a-cA-C]{0,4}"), 0..20).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(id, (status, title))| card(id, STATUSES[status], &title))
            .collect()
    })
}

fn condition_strategy() -> impl Strategy<Value = Condition> {
    prop_oneof![
        Just(Condition::Match),
        Just(Condition::IsNot),
        Just(Condition::Includes),
        Just(Condition::Unset),
        Just(Condition::from("starts-with")),
    ]
}

fn engine_with(property: &str, value: &str, condition: &Condition) -> FilterListEngine {
    let mut engine = FilterListEngine::with_config(["status", "title"]);
    engine.apply_filter(
        &Filter::new("f", property)
            .with_value(value)
            .with_condition(condition.clone()),
    );
    engine
}

proptest! {
    #[test]
    fn prop_result_is_ordered_subsequence(
        cards in cards_strategy(),
        status in 0..STATUSES.len(),
        condition in condition_strategy(),
    ) {
        let engine = engine_with("status", STATUSES[status], &condition);
        let result = engine.filter_list(&cards);

        let mut remaining = cards.iter();
        for item in &result {
            prop_assert!(remaining.any(|candidate| std::ptr::eq(candidate, *item)));
        }
    }

    #[test]
    fn prop_two_filters_are_intersection(
        cards in cards_strategy(),
        status in 0..STATUSES.len(),
        title in "[a-c]{1,2}",
    ) {
        let mut both = FilterListEngine::with_config(["status", "title"]);
        both.apply_filter(&Filter::new("s", "status").with_value(STATUSES[status]).with_condition(Condition::Match));
        both.apply_filter(&Filter::new("t", "title").with_value(title.as_str()).with_condition(Condition::Includes));

        let by_status = engine_with("status", STATUSES[status], &Condition::Match);
        let by_title = engine_with("title", &title, &Condition::Includes);

        let expected: Vec<&Record> = cards
            .iter()
            .filter(|card| by_status.matches(*card) && by_title.matches(*card))
            .collect();
        prop_assert_eq!(both.filter_list(&cards), expected);
    }

    #[test]
    fn prop_resetting_one_filter_only_widens(
        cards in cards_strategy(),
        status in 0..STATUSES.len(),
        status_condition in condition_strategy(),
        title in "[a-c]{1,2}",
        title_condition in condition_strategy(),
        reset_status in any::<bool>(),
    ) {
        let status_filter = Filter::new("s", "status")
            .with_value(STATUSES[status])
            .with_condition(status_condition);
        let title_filter = Filter::new("t", "title")
            .with_value(title.as_str())
            .with_condition(title_condition);

        let mut engine = FilterListEngine::with_config(["status", "title"]);
        engine.apply_filter(&status_filter);
        engine.apply_filter(&title_filter);
        let before: Vec<Value> = engine
            .filter_list(&cards)
            .into_iter()
            .map(|card| card["id"].clone())
            .collect();

        let mut reset = if reset_status { status_filter } else { title_filter };
        reset.reset();
        engine.apply_filter(&reset);
        let after: Vec<Value> = engine
            .filter_list(&cards)
            .into_iter()
            .map(|card| card["id"].clone())
            .collect();

        prop_assert!(after.len() >= before.len());
        for card in &before {
            prop_assert!(after.contains(card));
        }
    }

    #[test]
    fn prop_inactive_filters_keep_everything(
        cards in cards_strategy(),
        condition in condition_strategy(),
    ) {
        let engine = engine_with("status", "", &condition);
        prop_assert_eq!(engine.filter_list(&cards).len(), cards.len());
        prop_assert!(engine
            .get_display_list(&cards, "id")
            .values()
            .all(|visible| *visible));
    }

    #[test]
    fn prop_disallowed_property_changes_nothing(
        cards in cards_strategy(),
        value in "[a-z]{1,5}",
    ) {
        let mut engine = FilterListEngine::with_config(["status"]);
        let applied = engine.apply_filter(
            &Filter::new("c", "campaignId").with_value(value.as_str()).with_condition(Condition::Match),
        );

        prop_assert!(!applied);
        prop_assert_eq!(engine.filter_list(&cards).len(), cards.len());
    }

    #[test]
    fn prop_match_and_is_not_partition(
        cards in cards_strategy(),
        status in 0..STATUSES.len(),
    ) {
        let matching = engine_with("status", STATUSES[status], &Condition::Match);
        let excluding = engine_with("status", STATUSES[status], &Condition::IsNot);

        prop_assert_eq!(
            matching.filter_list(&cards).len() + excluding.filter_list(&cards).len(),
            cards.len()
        );
    }

    #[test]
    fn prop_display_list_agrees_with_filter_list(
        cards in cards_strategy(),
        status in 0..STATUSES.len(),
    ) {
        let engine = engine_with("status", STATUSES[status], &Condition::Match);
        let display = engine.get_display_list(&cards, "id");
        let visible = engine.filter_list(&cards);

        prop_assert_eq!(display.len(), cards.len());
        prop_assert_eq!(display.values().filter(|shown| **shown).count(), visible.len());
        for card in visible {
            let id = card["id"].to_string();
            prop_assert_eq!(display.get(&id), Some(&true));
        }
    }
}
