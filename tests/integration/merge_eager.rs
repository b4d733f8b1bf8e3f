#![allow(missing_docs)]

use std::error::Error;
use std::sync::Arc;

use serde_json::json;
use sombra_merge::merge::{EagerPolicy, MergeExecutor, MergeOutcome};
use sombra_merge::props;
use sombra_merge::storage::{
    CounterMetrics, Graph, GraphOptions, PropValueOwned, PropertyMap,
};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn on_match_updates_existing_node_and_keeps_other_keys() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["Person"], &props! { "ssid" => "123", "name" => "Jim" })?;

    let mut merge = MergeExecutor::new(&mut tx);
    let basic = merge.merge_node(
        &["Person"],
        Some(props! { "ssid" => "123" }),
        props! { "name" => "John" },
    )?;
    assert_eq!(basic.rows()[0].prop("name"), Some(&PropValueOwned::from("Jim")));

    let eager = merge.merge_node_eager(
        &["Person"],
        Some(props! { "ssid" => "123" }),
        EagerPolicy::new(props! { "name" => "X" }, props! { "occupation" => "juggler" }),
    )?;
    assert_eq!(eager.outcome(), MergeOutcome::Matched { count: 1 });
    let node = &eager.rows()[0];
    assert_eq!(node.id, a);
    assert_eq!(
        node.props,
        props! { "ssid" => "123", "name" => "Jim", "occupation" => "juggler" }
    );
    drop(merge);

    let stored = tx.node_view(a)?.ok_or("node vanished")?;
    assert_eq!(stored.props, node.props);
    Ok(())
}

#[test]
fn on_create_applies_only_when_nothing_matches() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let rows = MergeExecutor::new(&mut tx).merge_node_eager(
        &["Person"],
        Some(props! { "ssid" => "7" }),
        EagerPolicy::new(props! { "name" => "X" }, props! { "occupation" => "juggler" }),
    )?;
    assert!(rows.was_created());
    assert_eq!(rows.rows()[0].props, props! { "ssid" => "7", "name" => "X" });
    assert_eq!(tx.node_count(), 1);
    Ok(())
}

#[test]
fn fan_out_updates_every_match_without_creating() -> TestResult {
    let metrics = Arc::new(CounterMetrics::default());
    let graph = Graph::open(GraphOptions::new().metrics(metrics.clone()));
    let mut tx = graph.begin_write();
    let mut expected = Vec::new();
    for i in 0..5i64 {
        expected.push(tx.create_node_with(&["Job"], &props! { "queue" => "q1", "n" => i })?);
        tx.create_node_with(&["Job"], &props! { "queue" => "q2", "n" => i })?;
    }
    let created_before = CounterMetrics::get(&metrics.nodes_created);

    let rows = MergeExecutor::new(&mut tx).merge_node_eager(
        &["Job"],
        Some(props! { "queue" => "q1" }),
        EagerPolicy::new(PropertyMap::new(), props! { "state" => "claimed" }),
    )?;
    assert_eq!(rows.outcome(), MergeOutcome::Matched { count: 5 });
    let ids: Vec<_> = rows.rows().iter().map(|n| n.id).collect();
    assert_eq!(ids, expected);
    for node in rows.rows() {
        assert_eq!(node.prop("state"), Some(&PropValueOwned::from("claimed")));
    }
    assert_eq!(CounterMetrics::get(&metrics.nodes_created), created_before);
    assert_eq!(CounterMetrics::get(&metrics.nodes_updated), 5);
    Ok(())
}

#[test]
fn on_match_may_rewrite_identity_keys() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    tx.create_node_with(&["Ticket"], &props! { "status" => "open" })?;
    tx.create_node_with(&["Ticket"], &props! { "status" => "open" })?;

    let mut merge = MergeExecutor::new(&mut tx);
    let rows = merge.merge_node_eager(
        &["Ticket"],
        Some(props! { "status" => "open" }),
        EagerPolicy::new(PropertyMap::new(), props! { "status" => "closed" }),
    )?;
    assert_eq!(rows.len(), 2);

    let again = merge.merge_node_eager(
        &["Ticket"],
        Some(props! { "status" => "open" }),
        EagerPolicy::new(props! { "fresh" => true }, PropertyMap::new()),
    )?;
    assert!(again.was_created());
    Ok(())
}

#[test]
fn empty_on_match_issues_no_writes() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    tx.create_node_with(&["Person"], &props! { "ssid" => "1" })?;
    let before = tx.pending_changes();
    let rows = MergeExecutor::new(&mut tx).merge_node_eager(
        &["Person"],
        Some(props! { "ssid" => "1" }),
        EagerPolicy::default(),
    )?;
    assert_eq!(rows.len(), 1);
    assert_eq!(tx.pending_changes(), before);
    Ok(())
}

#[test]
fn eager_relationship_merge() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["N"], &PropertyMap::new())?;
    let b = tx.create_node_with(&["N"], &PropertyMap::new())?;
    let mut merge = MergeExecutor::new(&mut tx);

    let policy = EagerPolicy::new(props! { "count" => 1i64 }, props! { "seen" => true });
    let created = merge.merge_relationship_eager(a, "VISITED", None, policy.clone(), b)?;
    assert!(created.was_created());
    assert_eq!(created.rows()[0].props, props! { "count" => 1i64 });

    let matched = merge.merge_relationship_eager(a, "VISITED", None, policy, b)?;
    assert_eq!(matched.outcome(), MergeOutcome::Matched { count: 1 });
    assert_eq!(
        matched.rows()[0].props,
        props! { "count" => 1i64, "seen" => true }
    );
    Ok(())
}

#[test]
fn eager_relationship_fan_out_updates_every_parallel_edge() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["Person"], &props! { "name" => "Jim" })?;
    let b = tx.create_node_with(&["Person"], &props! { "name" => "John" })?;
    let mut expected = Vec::new();
    for _ in 0..3 {
        expected.push(tx.create_edge_with(a, "KNOWS", b, &props! { "rid" => 123i64 })?);
    }
    tx.create_edge_with(a, "KNOWS", b, &props! { "rid" => 456i64 })?;
    let edges_before = tx.edge_count();

    let rows = MergeExecutor::new(&mut tx).merge_relationship_eager(
        a,
        "KNOWS",
        Some(props! { "rid" => 123i64 }),
        EagerPolicy::new(props! { "created" => true }, props! { "since" => "Fri" }),
        b,
    )?;
    assert_eq!(rows.outcome(), MergeOutcome::Matched { count: 3 });
    let ids: Vec<_> = rows.rows().iter().map(|r| r.id).collect();
    assert_eq!(ids, expected);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    for rel in rows.rows() {
        assert_eq!(rel.prop("since"), Some(&PropValueOwned::from("Fri")));
        assert_eq!(rel.prop("rid"), Some(&PropValueOwned::Int(123)));
        assert!(rel.prop("created").is_none());
    }
    assert_eq!(tx.edge_count(), edges_before);
    Ok(())
}

#[test]
fn policy_from_json() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let policy = EagerPolicy::from_json(&json!({
        "onCreateProps": { "name": "X" },
        "onMatchProps": null,
    }))?;
    assert!(policy.on_match_props.is_empty());
    let rows = MergeExecutor::new(&mut tx).merge_node_eager(
        &["Person"],
        Some(props! { "ssid" => "1" }),
        policy,
    )?;
    assert_eq!(rows.rows()[0].prop("name"), Some(&PropValueOwned::from("X")));

    assert!(EagerPolicy::from_json(&json!(["not", "a", "map"])).is_err());
    Ok(())
}
