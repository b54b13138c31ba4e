//! Filtering behaviour for both dispositions

use event_filter::{transform_event, DenyRule, Disposition, Event, EventFilter};
use serde_json::{json, Value};

fn event(value: Value) -> Event {
    Event::from_value(value).expect("event must be an object")
}

fn rename_filter(prefix: &str) -> EventFilter {
    EventFilter::new(DenyRule::new(
        ["Product Added", "Order Completed"],
        Some(prefix),
        Disposition::rename("SK~"),
    ))
    .expect("rule is valid")
}

fn suppress_filter(prefix: &str) -> EventFilter {
    EventFilter::new(DenyRule::new(
        ["Product Added", "Order Completed"],
        Some(prefix),
        Disposition::Suppress,
    ))
    .expect("rule is valid")
}

#[test]
fn test_exact_match_is_renamed() {
    let filter = rename_filter("Single");
    let input = event(json!({
        "event": "Product Added",
        "properties": { "sku": "A-1", "price": 9.5 },
        "userId": "user-7"
    }));

    let output = filter.filter(input, &json!({})).expect("renamed event is kept");

    assert_eq!(output.name("event"), Some("SK~Product Added"));
    assert_eq!(output.get("properties"), Some(&json!({ "sku": "A-1", "price": 9.5 })));
    assert_eq!(output.get("userId"), Some(&json!("user-7")));
}

#[test]
fn test_prefix_match_is_renamed() {
    let filter = rename_filter("Single");
    let output = filter
        .filter(event(json!({ "event": "Single Item Viewed" })), &Value::Null)
        .expect("renamed event is kept");
    assert_eq!(output.name("event"), Some("SK~Single Item Viewed"));
}

#[test]
fn test_prefix_match_is_suppressed() {
    let filter = suppress_filter("Home");
    let output = filter.filter(event(json!({ "event": "Home Page Viewed" })), &Value::Null);
    assert!(output.is_none());
}

#[test]
fn test_exact_match_is_suppressed() {
    let filter = suppress_filter("Home");
    for name in ["Product Added", "Order Completed"] {
        assert!(filter
            .filter(event(json!({ "event": name })), &Value::Null)
            .is_none());
    }
}

#[test]
fn test_unmatched_event_is_identical() {
    let input = event(json!({
        "event": "Page Viewed",
        "type": "track",
        "context": { "library": { "name": "analytics-ios" } },
        "timestamp": "2024-01-01T00:00:00Z"
    }));

    assert_eq!(rename_filter("Single").filter(input.clone(), &Value::Null), Some(input.clone()));
    assert_eq!(suppress_filter("Single").filter(input.clone(), &Value::Null), Some(input));
}

#[test]
fn test_name_in_denylist_and_prefix_is_renamed_once() {
    let filter = EventFilter::new(DenyRule::new(
        ["Single Item Viewed"],
        Some("Single"),
        Disposition::rename_default(),
    ))
    .unwrap();

    let output = filter
        .filter(event(json!({ "event": "Single Item Viewed" })), &Value::Null)
        .unwrap();
    assert_eq!(output.name("event"), Some("SK~Single Item Viewed"));
}

#[test]
fn test_absent_or_empty_name_passes_through() {
    for filter in [rename_filter("Single"), suppress_filter("Single")] {
        let missing = event(json!({ "type": "identify", "userId": "u-1" }));
        assert_eq!(filter.filter(missing.clone(), &Value::Null), Some(missing));

        let empty = event(json!({ "event": "", "type": "track" }));
        assert_eq!(filter.filter(empty.clone(), &Value::Null), Some(empty));
    }
}

#[test]
fn test_non_string_name_is_not_a_match() {
    let filter = suppress_filter("Single");
    for name in [json!(12), json!(null), json!(true), json!({ "event": "Product Added" })] {
        let input = event(json!({ "event": name }));
        assert_eq!(filter.filter(input.clone(), &Value::Null), Some(input));
    }
}

#[test]
fn test_metadata_is_ignored() {
    let filter = rename_filter("Single");
    let with_meta = filter.filter(
        event(json!({ "event": "Order Completed" })),
        &json!({ "sourceId": "src-1", "destinationId": "dst-9" }),
    );
    let without_meta = filter.filter(event(json!({ "event": "Order Completed" })), &Value::Null);
    assert_eq!(with_meta, without_meta);
}

#[test]
fn test_renamed_name_is_not_renamed_again_unless_denied() {
    let filter = rename_filter("Single");
    let once = filter
        .filter(event(json!({ "event": "Product Added" })), &Value::Null)
        .unwrap();
    let twice = filter.filter(once.clone(), &Value::Null).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_filter_batch_drops_only_suppressed() {
    let filter = suppress_filter("Home");
    let events = vec![
        event(json!({ "event": "Page Viewed" })),
        event(json!({ "event": "Home Page Viewed" })),
        event(json!({ "event": "Order Completed" })),
        event(json!({ "type": "identify" })),
    ];

    let kept = filter.filter_batch(events);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].name("event"), Some("Page Viewed"));
    assert_eq!(kept[1].get("type"), Some(&json!("identify")));
}

#[test]
fn test_transform_event_matches_filter() {
    let rule = DenyRule::new(["Product Added"], Some("Single"), Disposition::rename_default());
    let filter = EventFilter::new(rule.clone()).unwrap();

    for name in ["Product Added", "Single Click", "Checkout Started"] {
        let input = event(json!({ "event": name }));
        assert_eq!(
            transform_event(input.clone(), &Value::Null, &rule),
            filter.filter(input, &Value::Null)
        );
    }
}
