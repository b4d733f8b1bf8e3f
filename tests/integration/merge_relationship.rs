#![allow(missing_docs)]

use std::error::Error;

use sombra_merge::merge::{MergeError, MergeExecutor, MergeOutcome};
use sombra_merge::props;
use sombra_merge::storage::{Graph, GraphOptions, PropValueOwned, PropertyMap};
use sombra_merge::types::{GraphError, NodeId};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn null_identity_creates_bare_relationship_then_matches_it() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["Person"], &props! { "name" => "a" })?;
    let b = tx.create_node_with(&["Person"], &props! { "name" => "b" })?;

    let mut merge = MergeExecutor::new(&mut tx);
    let created = merge.merge_relationship(a, "KNOWS", None, None, b)?;
    assert_eq!(created.outcome(), MergeOutcome::Created);
    let rel = &created.rows()[0];
    assert_eq!((rel.start, rel.ty.as_str(), rel.end), (a, "KNOWS", b));
    assert!(rel.props.is_empty());

    let matched = merge.merge_relationship(a, "KNOWS", Some(PropertyMap::new()), None, b)?;
    assert_eq!(matched.outcome(), MergeOutcome::Matched { count: 1 });
    assert_eq!(matched.rows()[0].id, rel.id);
    drop(merge);

    assert_eq!(tx.edge_count(), 1);
    Ok(())
}

#[test]
fn direction_and_type_are_part_of_identity() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["N"], &PropertyMap::new())?;
    let b = tx.create_node_with(&["N"], &PropertyMap::new())?;
    tx.create_edge_with(b, "LINKS", a, &PropertyMap::new())?;
    tx.create_edge_with(a, "OTHER", b, &PropertyMap::new())?;

    let rows = MergeExecutor::new(&mut tx).merge_relationship(a, "LINKS", None, None, b)?;
    assert!(rows.was_created());
    assert_eq!(tx.edge_count(), 3);
    Ok(())
}

#[test]
fn identity_and_create_props_seed_new_relationship() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["N"], &PropertyMap::new())?;
    let b = tx.create_node_with(&["N"], &PropertyMap::new())?;
    tx.create_edge_with(a, "RATED", b, &props! { "source" => "web", "stars" => 3i64 })?;

    let mut merge = MergeExecutor::new(&mut tx);
    let rows = merge.merge_relationship(
        a,
        "RATED",
        Some(props! { "source" => "app" }),
        Some(props! { "stars" => 5i64, "source" => "override" }),
        b,
    )?;
    assert!(rows.was_created());
    assert_eq!(
        rows.rows()[0].props,
        props! { "source" => "override", "stars" => 5i64 }
    );

    let rows = merge.merge_relationship(
        a,
        "RATED",
        Some(props! { "source" => "web" }),
        Some(props! { "stars" => 1i64 }),
        b,
    )?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.rows()[0].prop("stars"), Some(&PropValueOwned::Int(3)));
    Ok(())
}

#[test]
fn parallel_relationships_all_match() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["N"], &PropertyMap::new())?;
    let b = tx.create_node_with(&["N"], &PropertyMap::new())?;
    let e1 = tx.create_edge_with(a, "LINKS", b, &props! { "w" => 1i64 })?;
    let e2 = tx.create_edge_with(a, "LINKS", b, &props! { "w" => 2i64 })?;

    let rows = MergeExecutor::new(&mut tx).merge_relationship(a, "LINKS", None, None, b)?;
    let ids: Vec<_> = rows.rows().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![e1, e2]);
    Ok(())
}

#[test]
fn unusual_types_round_trip() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["N"], &PropertyMap::new())?;
    let b = tx.create_node_with(&["N"], &PropertyMap::new())?;
    let types = ["HAS SPACE", "ns:REL", "kebab-rel", "GEHÖRT_ZU"];
    for ty in types {
        let mut merge = MergeExecutor::new(&mut tx);
        let created = merge.merge_relationship(a, ty, None, None, b)?;
        assert!(created.was_created(), "{ty}");
        assert_eq!(created.rows()[0].ty, ty);
        let matched = merge.merge_relationship(a, ty, None, None, b)?;
        assert_eq!(matched.rows()[0].id, created.rows()[0].id, "{ty}");
    }
    assert_eq!(tx.edge_count(), types.len());
    Ok(())
}

#[test]
fn missing_endpoint_is_a_creation_error() {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["N"], &PropertyMap::new()).unwrap();

    let err = MergeExecutor::new(&mut tx)
        .merge_relationship(a, "LINKS", None, None, NodeId(404))
        .unwrap_err();
    assert_eq!(
        err,
        MergeError::EntityCreation {
            kind: "relationship",
            source: GraphError::NotFound("end node"),
        }
    );
    assert_eq!(tx.edge_count(), 0);
}

#[test]
fn empty_type_is_rejected() {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["N"], &PropertyMap::new()).unwrap();
    let err = MergeExecutor::new(&mut tx)
        .merge_relationship(a, "", None, None, a)
        .unwrap_err();
    assert_eq!(
        err,
        MergeError::EmptyName {
            what: "relationship type"
        }
    );
}

#[test]
fn self_loops_are_supported() -> TestResult {
    let graph = Graph::open(GraphOptions::default());
    let mut tx = graph.begin_write();
    let a = tx.create_node_with(&["N"], &PropertyMap::new())?;
    let mut merge = MergeExecutor::new(&mut tx);
    let first = merge.merge_relationship(a, "SELF", None, None, a)?;
    let second = merge.merge_relationship(a, "SELF", None, None, a)?;
    assert!(first.was_created());
    assert_eq!(second.rows()[0].id, first.rows()[0].id);
    Ok(())
}
