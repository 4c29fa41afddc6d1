//! Tests for QueryService and TreeBuilder over a store
//!
//! Every query reads the store fresh; childless classification is global.

use std::collections::BTreeSet;

use rstest::{fixture, rstest};

use catorder::domain::{CategoryTree, Position, Term, TermId, TreeBuilder, ROOT};
use catorder::infrastructure::TermStore;
use catorder::util::testing::{init_test_setup, shop_terms, Harness};

#[fixture]
fn shop() -> Harness {
    init_test_setup();
    Harness::new(shop_terms())
}

fn ids(nodes: &[catorder::domain::TreeNode]) -> Vec<TermId> {
    nodes.iter().map(|n| n.id).collect()
}

#[test]
fn given_flat_terms_when_build_tree_then_nested_and_childless_global() {
    // Arrange: {id, parent, order}
    let terms = vec![
        Term::new(1, "a", ROOT).with_order(0),
        Term::new(2, "b", ROOT).with_order(1),
        Term::new(3, "c", 1).with_order(0),
    ];

    // Act
    let builder = TreeBuilder::new();
    let tree = builder.build_tree(&terms);

    // Assert: [1[3], 2[]]
    assert_eq!(tree.root_ids(), vec![1, 2]);
    let first = &tree.roots()[0];
    assert_eq!(first.child_ids(), vec![3]);
    assert!(first.has_children);
    assert!(!first.is_childless);
    let second = &tree.roots()[1];
    assert!(second.children.is_empty());
    assert!(!second.has_children);
    assert!(second.is_childless);
    assert_eq!(builder.childless_ids(&terms), BTreeSet::from([2, 3]));
}

#[rstest]
#[case([0, 1, 2, 0, 1, 0])]
#[case([5, 5, 5, 5, 5, 5])]
#[case([-3, 9, 1, 7, 2, 4])]
fn given_permuted_orders_when_classifying_then_childless_unchanged(#[case] ranks: [i64; 6]) {
    // Arrange
    let terms: Vec<Term> = shop_terms()
        .into_iter()
        .zip(ranks)
        .map(|(t, r)| t.with_order(r))
        .collect();

    // Act
    let childless = TreeBuilder::new().childless_ids(&terms);

    // Assert
    assert_eq!(childless, BTreeSet::from([2, 3, 5, 6]));
}

#[rstest]
fn given_every_node_when_building_then_has_children_matches_children(shop: Harness) {
    let tree = shop.queries.get_tree().unwrap();

    assert_eq!(tree.len(), 6);
    assert_eq!(tree.depth(), 3);
    for node in tree.iter() {
        assert_eq!(node.has_children, !node.children.is_empty());
    }
}

#[rstest]
fn given_store_when_get_tree_then_ranked_siblings(shop: Harness) {
    let tree = shop.queries.get_tree().unwrap();

    assert_eq!(tree.root_ids(), vec![1, 2, 5]);
    let clothing = tree.find(1).unwrap();
    assert_eq!(clothing.child_ids(), vec![3, 4]);
    assert_eq!(tree.find(4).unwrap().child_ids(), vec![6]);
}

#[test]
fn given_empty_store_when_get_tree_then_no_categories_signal() {
    init_test_setup();
    let h = Harness::new(vec![]);

    let tree = h.queries.get_tree().unwrap();

    assert_eq!(tree, CategoryTree::Empty);
    assert!(h.queries.get_root_categories().unwrap().is_empty());
    assert!(h.queries.get_childless_ids().unwrap().is_empty());
}

#[rstest]
fn given_store_when_get_root_categories_then_shallow_with_global_childless(shop: Harness) {
    // Act
    let roots = shop.queries.get_root_categories().unwrap();

    // Assert
    assert_eq!(ids(&roots), vec![1, 2, 5]);
    assert!(roots.iter().all(|n| n.children.is_empty() && !n.has_children));
    assert!(!roots[0].is_childless);
    assert!(roots[1].is_childless);
}

#[rstest]
fn given_store_when_get_childless_roots_then_only_leaf_roots(shop: Harness) {
    let roots = shop.queries.get_childless_roots().unwrap();
    assert_eq!(ids(&roots), vec![2, 5]);
}

#[rstest]
fn given_mutation_when_querying_again_then_fresh_state(shop: Harness) {
    // Arrange
    let before = shop.queries.get_tree().unwrap();

    // Act
    shop.store.set_order(5, -1).unwrap();
    let after = shop.queries.get_tree().unwrap();

    // Assert
    assert_eq!(before.root_ids(), vec![1, 2, 5]);
    assert_eq!(after.root_ids(), vec![5, 1, 2]);
}

#[rstest]
fn given_store_when_snapshot_then_tree_and_childless_together(shop: Harness) {
    // Arrange
    shop.store.set_position(2, Some(Position::Right)).unwrap();

    // Act
    let snapshot = shop.queries.snapshot().unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();

    // Assert
    assert_eq!(snapshot.childless_ids, BTreeSet::from([2, 3, 5, 6]));
    assert_eq!(json["childless_ids"], serde_json::json!([2, 3, 5, 6]));
    assert_eq!(json["categories"][1]["position"], "right");
    assert_eq!(json["categories"][0]["children"][1]["children"][0]["id"], 6);
}

#[rstest]
fn given_unknown_id_when_get_position_then_none(shop: Harness) {
    assert_eq!(shop.queries.get_position(404).unwrap(), None);
}

#[rstest]
fn given_orphan_when_building_then_excluded_but_parent_classified() {
    // Arrange: 9 points at a missing parent
    let terms = vec![Term::new(1, "a", ROOT), Term::new(9, "orphan", 42)];

    // Act
    let builder = TreeBuilder::new();
    let tree = builder.build_tree(&terms);

    // Assert
    assert_eq!(tree.len(), 1);
    assert_eq!(builder.childless_ids(&terms), BTreeSet::from([1, 9]));
}
