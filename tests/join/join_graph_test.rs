//! Join-path resolution over the table graph.

use std::collections::BTreeSet;
use std::sync::Arc;

use strata::join::{JoinGraph, JoinKind};
use strata::QueryError;

fn targets(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn chain() -> JoinGraph {
    let mut graph = JoinGraph::new("a");
    graph.add_edge("a", "b", "b_id", JoinKind::Left);
    graph.add_edge("b", "c", "c_id", JoinKind::Left);
    graph
}

#[test]
fn root_and_empty_sets_need_no_joins() {
    let mut graph = chain();
    assert_eq!(graph.path(&targets(&[])).unwrap().len(), 0);
    assert_eq!(graph.path(&targets(&["a"])).unwrap().len(), 0);
}

#[test]
fn chain_target_orders_edges_topologically() {
    let mut graph = chain();
    let path = graph.path(&targets(&["c"])).unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!((path[0].from.as_str(), path[0].to.as_str()), ("a", "b"));
    assert_eq!((path[1].from.as_str(), path[1].to.as_str()), ("b", "c"));
    assert_eq!(path[1].foreign_key, "c_id");
}

#[test]
fn multiple_targets_share_the_prefix() {
    let mut graph = chain();
    graph.add_edge("b", "d", "d_id", JoinKind::Left);
    let path = graph.path(&targets(&["c", "d"])).unwrap();
    assert_eq!(path.len(), 3);
    // The incoming edge of b precedes both departures from it.
    assert_eq!(path[0].to, "b");
}

#[test]
fn paths_are_cached_until_mutation() {
    let mut graph = chain();
    let first = graph.path(&targets(&["c"])).unwrap();
    let second = graph.path(&targets(&["c"])).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    graph.add_edge("c", "d", "d_id", JoinKind::Left);
    let third = graph.path(&targets(&["c"])).unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(first.as_ref(), third.as_ref());
}

#[test]
fn re_adding_an_edge_changes_nothing() {
    let mut graph = chain();
    assert_eq!(graph.edge_count(), 2);
    graph.add_edge("a", "b", "b_id", JoinKind::Left);
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn unreachable_target_is_an_error() {
    let mut graph = chain();
    assert_eq!(
        graph.path(&targets(&["z"])).unwrap_err(),
        QueryError::UnreachableTarget("z".to_string())
    );
    // A node only reachable against edge direction is unreachable too.
    graph.add_edge("z", "a", "a_id", JoinKind::Left);
    assert_eq!(
        graph.path(&targets(&["z"])).unwrap_err(),
        QueryError::UnreachableTarget("z".to_string())
    );
}

#[test]
fn closing_a_cycle_fails_validation() {
    let mut graph = chain();
    assert!(graph.validate().is_ok());
    graph.add_edge("c", "a", "a_id", JoinKind::Left);
    assert_eq!(
        graph.validate().unwrap_err(),
        QueryError::CyclicJoinGraph {
            from: "c".to_string(),
            to: "a".to_string(),
        }
    );
}

#[test]
fn join_kinds_render_their_sql() {
    assert_eq!(JoinKind::Left.as_sql(), "LEFT JOIN");
    assert_eq!(JoinKind::Inner.as_sql(), "INNER JOIN");
    assert_eq!(JoinKind::Right.as_sql(), "RIGHT JOIN");
    assert_eq!(JoinKind::default(), JoinKind::Left);
}
