use deck_filter::{
    Condition, DuplicatePolicy, Filter, FilterListEngine, FilterRegistry, MenuFilter,
    RegistryConfig, SearchFilter,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;

fn cards() -> Vec<Value> {
    vec![
        json!({"id": "c1", "currentWorkflow": "active", "cardTitle": "Summer Promo"}),
        json!({"id": "c2", "currentWorkflow": "paused", "cardTitle": "Winter promo"}),
        json!({"id": "c3", "currentWorkflow": "active", "cardTitle": "Loyalty"}),
    ]
}

fn drain(engine: &mut FilterListEngine, changes: &mut Receiver<Filter>) {
    while let Ok(filter) = changes.try_recv() {
        engine.apply_filter(&filter);
    }
}

#[test]
fn menu_and_search_compose_in_one_view() {
    let registry = Arc::new(FilterRegistry::new());
    let mut changes = registry.subscribe_changes();
    let mut engine = FilterListEngine::with_config(["currentWorkflow", "cardTitle"]);

    let mut menu = MenuFilter::status_menu(registry.clone(), "status");
    menu.create_menu().unwrap();
    let mut search = SearchFilter::new(registry.clone(), "cardTitle");
    search.register().unwrap();

    // "active" is the third status
    menu.select(Some(2));
    search.on_text_input("PROMO");
    drain(&mut engine, &mut changes);

    let items = cards();
    let visible: Vec<&str> = engine
        .filter_list(&items)
        .into_iter()
        .map(|card| card["id"].as_str().unwrap())
        .collect();
    assert_eq!(visible, vec!["c1"]);

    search.on_cancel();
    drain(&mut engine, &mut changes);
    assert_eq!(engine.filter_list(&items).len(), 2);
}

#[test]
fn views_only_honor_their_own_properties() {
    let registry = FilterRegistry::new();
    let mut status_changes = registry.subscribe_changes();
    let mut title_changes = registry.subscribe_changes();
    let mut by_status = FilterListEngine::with_config(["currentWorkflow"]);
    let mut by_title = FilterListEngine::with_config(["cardTitle"]);

    registry
        .register_filter(
            Filter::new("status", "currentWorkflow")
                .with_value("paused")
                .with_condition(Condition::Match),
        )
        .unwrap();
    drain(&mut by_status, &mut status_changes);
    drain(&mut by_title, &mut title_changes);

    let items = cards();
    assert_eq!(by_status.filter_list(&items).len(), 1);
    assert_eq!(by_title.filter_list(&items).len(), 3);
}

#[test]
fn reset_by_location_leaves_other_regions() {
    let registry = Arc::new(FilterRegistry::new());
    let mut menu = MenuFilter::status_menu(registry.clone(), "status");
    menu.create_menu().unwrap();
    let mut search = SearchFilter::new(registry.clone(), "cardTitle");
    search.register().unwrap();

    menu.select(Some(0));
    search.on_text_input("promo");

    assert_eq!(registry.reset_filters_by_location("status-menu"), 1);
    assert!(!registry.get_filter_by_id("status").unwrap().is_active());
    assert!(registry
        .get_filter_by_id(SearchFilter::DEFAULT_ID)
        .unwrap()
        .is_active());
}

#[test]
fn rejecting_registry_refuses_second_menu() {
    let registry = Arc::new(FilterRegistry::with_config(
        RegistryConfig::new().with_duplicate_policy(DuplicatePolicy::Reject),
    ));
    let mut first = MenuFilter::status_menu(registry.clone(), "status");
    first.create_menu().unwrap();

    let mut second = MenuFilter::status_menu(registry.clone(), "status");
    let err = second.create_menu().unwrap_err();
    assert_eq!(err.filter_id(), "status");
    assert_eq!(registry.len(), 1);
}

#[test]
fn concurrent_changes_are_all_delivered() {
    let registry = Arc::new(FilterRegistry::with_config(
        RegistryConfig::new().with_channel_capacity(1024),
    ));
    let mut changes = registry.subscribe_changes();

    for worker in 0..4 {
        registry
            .register_filter(Filter::new(format!("w{worker}"), "cardTitle"))
            .unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                for round in 0..50 {
                    registry.change_filter(&format!("w{worker}"), round, Condition::Match);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut last_seen = [-1_i64; 4];
    let mut received = 0;
    while let Ok(filter) = changes.try_recv() {
        received += 1;
        let worker: usize = filter.id[1..].parse().unwrap();
        if let deck_filter::FilterValue::Number(round) = filter.value {
            #[allow(clippy::cast_possible_truncation)]
            let round = round as i64;
            assert!(round > last_seen[worker]);
            last_seen[worker] = round;
        }
    }

    assert_eq!(received, 4 + 4 * 50);
    assert_eq!(last_seen, [49; 4]);
}
