#![allow(missing_docs)]

use std::error::Error;

use sombra_merge::merge::{
    EagerPolicy, MergeError, MergeExecutor, MergeOutcome, EMPTY_IDENTITY_MESSAGE,
};
use sombra_merge::props;
use sombra_merge::storage::{Graph, GraphOptions, PropValueOwned, PropertyMap};

type TestResult = Result<(), Box<dyn Error>>;

fn graph() -> Graph {
    Graph::open(GraphOptions::default())
}

#[test]
fn missing_or_empty_identity_fails_in_both_modes() {
    let graph = graph();
    let mut tx = graph.begin_write();
    let mut merge = MergeExecutor::new(&mut tx);

    let err = merge
        .merge_node(&["Person"], None, props! { "name" => "Jim" })
        .unwrap_err();
    assert_eq!(err, MergeError::EmptyIdentity);
    assert_eq!(err.to_string(), EMPTY_IDENTITY_MESSAGE);
    assert_eq!(
        merge.merge_node(&["Person"], Some(PropertyMap::new()), PropertyMap::new()),
        Err(MergeError::EmptyIdentity)
    );
    assert_eq!(
        merge.merge_node_eager(&["Person"], None, EagerPolicy::default()),
        Err(MergeError::EmptyIdentity)
    );
    assert_eq!(
        merge.merge_node_eager(&["Person"], Some(PropertyMap::new()), EagerPolicy::default()),
        Err(MergeError::EmptyIdentity)
    );
    drop(merge);
    assert_eq!(tx.node_count(), 0);
    assert_eq!(tx.pending_changes(), 0);
}

#[test]
fn creates_once_then_matches() -> TestResult {
    let graph = graph();
    let mut tx = graph.begin_write();
    let mut merge = MergeExecutor::new(&mut tx);

    let created = merge.merge_node(
        &["Person", "Employee"],
        Some(props! { "ssid" => "123", "name" => "Jim" }),
        props! { "name" => "John", "age" => 40i64 },
    )?;
    assert_eq!(created.outcome(), MergeOutcome::Created);
    let node = &created.rows()[0];
    assert_eq!(node.labels, vec!["Employee".to_string(), "Person".to_string()]);
    assert_eq!(
        node.props,
        props! { "ssid" => "123", "name" => "John", "age" => 40i64 }
    );

    let again = merge.merge_node(
        &["Person"],
        Some(props! { "ssid" => "123" }),
        props! { "name" => "Someone else" },
    )?;
    assert_eq!(again.outcome(), MergeOutcome::Matched { count: 1 });
    assert_eq!(again.rows()[0], *node);

    drop(merge);
    assert_eq!(tx.node_count(), 1);
    Ok(())
}

#[test]
fn basic_mode_returns_match_unchanged() -> TestResult {
    let graph = graph();
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["Person"], &props! { "ssid" => "123", "name" => "Jim" })?;
    let before = tx.pending_changes();

    let mut merge = MergeExecutor::new(&mut tx);
    let rows = merge.merge_node(
        &["Person"],
        Some(props! { "ssid" => "123" }),
        props! { "name" => "John" },
    )?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.rows()[0].id, a);
    assert_eq!(rows.rows()[0].prop("name"), Some(&PropValueOwned::from("Jim")));
    drop(merge);

    assert_eq!(tx.pending_changes(), before, "matching wrote to the store");
    Ok(())
}

#[test]
fn create_props_override_identity_values() -> TestResult {
    let graph = graph();
    let mut tx = graph.begin_write();
    let mut merge = MergeExecutor::new(&mut tx);

    let first = merge.merge_node(
        &["Person"],
        Some(props! { "ssid" => 0i64 }),
        props! { "ssid" => -1i64 },
    )?;
    assert!(first.was_created());
    assert_eq!(first.rows()[0].props, props! { "ssid" => -1i64 });

    // The stored node no longer carries the identity value, so the same merge creates again.
    let second = merge.merge_node(
        &["Person"],
        Some(props! { "ssid" => 0i64 }),
        props! { "ssid" => -1i64 },
    )?;
    assert!(second.was_created());
    assert_ne!(second.rows()[0].id, first.rows()[0].id);
    drop(merge);
    assert_eq!(tx.node_count(), 2);
    Ok(())
}

#[test]
fn basic_mode_returns_every_match() -> TestResult {
    let graph = graph();
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["Person"], &props! { "team" => "red" })?;
    tx.create_node_with(&["Person"], &props! { "team" => "blue" })?;
    let c = tx.create_node_with(&["Person"], &props! { "team" => "red" })?;

    let rows = MergeExecutor::new(&mut tx).merge_node(
        &["Person"],
        Some(props! { "team" => "red" }),
        PropertyMap::new(),
    )?;
    let ids: Vec<_> = rows.into_iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![a, c]);
    Ok(())
}

#[test]
fn requested_labels_must_all_be_present() -> TestResult {
    let graph = graph();
    let mut tx = graph.begin_write();
    tx.create_node_with(&["Person"], &props! { "ssid" => "1" })?;

    let rows = MergeExecutor::new(&mut tx).merge_node(
        &["Person", "Admin"],
        Some(props! { "ssid" => "1" }),
        PropertyMap::new(),
    )?;
    assert!(rows.was_created());
    assert_eq!(tx.node_count(), 2);
    Ok(())
}

#[test]
fn empty_label_set_matches_any_node() -> TestResult {
    let graph = graph();
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["Person"], &props! { "ssid" => "1" })?;

    let rows = MergeExecutor::new(&mut tx).merge_node(&[], Some(props! { "ssid" => "1" }), PropertyMap::new())?;
    assert_eq!(rows.rows()[0].id, a);
    Ok(())
}

#[test]
fn unusual_labels_round_trip() -> TestResult {
    let graph = graph();
    let mut tx = graph.begin_write();
    let labels = ["Label with spaces", "ns:Thing", "kebab-case", "Äpfel", "日本"];
    for label in labels {
        let mut merge = MergeExecutor::new(&mut tx);
        let created = merge.merge_node(&[label], Some(props! { "k" => 1i64 }), PropertyMap::new())?;
        assert!(created.was_created(), "{label}");
        assert_eq!(created.rows()[0].labels, vec![label.to_string()]);
        let matched = merge.merge_node(&[label], Some(props! { "k" => 1i64 }), PropertyMap::new())?;
        assert_eq!(matched.rows()[0].id, created.rows()[0].id, "{label}");
    }
    assert_eq!(tx.node_count(), labels.len());
    Ok(())
}

#[test]
fn identity_equality_is_type_aware() -> TestResult {
    let graph = graph();
    let mut tx = graph.begin_write();
    tx.create_node_with(&["Item"], &props! { "code" => 123i64, "ratio" => 1.0f64 })?;
    let mut merge = MergeExecutor::new(&mut tx);

    assert!(merge
        .merge_node(&["Item"], Some(props! { "code" => "123" }), PropertyMap::new())?
        .was_created());
    assert!(merge
        .merge_node(&["Item"], Some(props! { "ratio" => 1i64 }), PropertyMap::new())?
        .was_created());
    assert!(!merge
        .merge_node(&["Item"], Some(props! { "code" => 123i64 }), PropertyMap::new())?
        .was_created());
    Ok(())
}

#[test]
fn list_identity_compares_element_wise() -> TestResult {
    let graph = graph();
    let mut tx = graph.begin_write();
    tx.create_node_with(&["Item"], &props! { "tags" => vec!["a", "b"] })?;
    let mut merge = MergeExecutor::new(&mut tx);

    assert!(!merge
        .merge_node(&["Item"], Some(props! { "tags" => vec!["a", "b"] }), PropertyMap::new())?
        .was_created());
    assert!(merge
        .merge_node(&["Item"], Some(props! { "tags" => vec!["b", "a"] }), PropertyMap::new())?
        .was_created());
    Ok(())
}

#[test]
fn mixed_list_rejected_before_store_access() {
    let graph = graph();
    let mut tx = graph.begin_write();
    let mixed = PropValueOwned::List(vec![PropValueOwned::Int(1), PropValueOwned::from("a")]);
    let err = MergeExecutor::new(&mut tx)
        .merge_node(&["Item"], Some(props! { "bad" => mixed }), PropertyMap::new())
        .unwrap_err();
    assert!(matches!(err, MergeError::InvalidValue(_)));
    assert_eq!(tx.pending_changes(), 0);
}

#[test]
fn merges_from_json_parameters() -> TestResult {
    use serde_json::json;
    use sombra_merge::storage::props_from_json;

    let graph = graph();
    let mut tx = graph.begin_write();
    let identity = props_from_json(&json!({ "ssid": "123" }))?;
    let create = props_from_json(&json!({ "name": "Jim", "scores": [1, 2, 3] }))?;
    let rows = MergeExecutor::new(&mut tx).merge_node(
        &["Person"],
        identity,
        create.unwrap_or_default(),
    )?;
    let node = &rows.rows()[0];
    assert_eq!(node.prop("scores"), Some(&PropValueOwned::from(vec![1i64, 2, 3])));

    let rendered = serde_json::to_value(node)?;
    assert_eq!(rendered["labels"], json!(["Person"]));
    Ok(())
}
