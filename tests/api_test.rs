//! Tests for the CategoryApi transport facade
//!
//! Status mapping:
//! - 200 applied (with refreshed tree)
//! - 400 unknown action / invalid argument / malformed body
//! - 404 unknown category
//! - 409 invalid move or cycle
//! - 500 store failure

use rstest::{fixture, rstest};
use serde_json::json;

use catorder::application::api::{OrderAction, UpdateOrderRequest};
use catorder::domain::{Position, ReorderItem, ROOT};
use catorder::infrastructure::TermStore;
use catorder::util::testing::{init_test_setup, shop_terms, Harness};

#[fixture]
fn shop() -> Harness {
    init_test_setup();
    Harness::new(shop_terms())
}

#[rstest]
fn given_valid_move_when_update_order_then_200_with_fresh_tree(shop: Harness) {
    // Arrange
    let request = UpdateOrderRequest::new(2, OrderAction::MoveUp);

    // Act
    let response = shop.api().update_order(&request);

    // Assert
    assert_eq!(response.status, 200);
    assert!(response.success);
    let ids: Vec<_> = response
        .categories
        .as_ref()
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, vec![2, 1, 5]);
    assert!(response.message.is_none());
}

#[rstest]
fn given_unknown_action_when_update_order_then_400_and_nothing_written(shop: Harness) {
    // Arrange
    let request = UpdateOrderRequest {
        category_id: 2,
        action: "teleport".into(),
        new_order: Some(9),
        new_parent: None,
        position: None,
    };

    // Act
    let response = shop.api().update_order(&request);

    // Assert
    assert_eq!(response.status, 400);
    assert!(!response.success);
    assert!(response.message.unwrap().contains("Unknown action"));
    assert_eq!(shop.store.get_order(2).unwrap(), 1);
}

#[rstest]
#[case::first_up(UpdateOrderRequest::new(1, OrderAction::MoveUp), 409)]
#[case::root_left(UpdateOrderRequest::new(1, OrderAction::MoveLeft), 409)]
#[case::cycle(UpdateOrderRequest::new(1, OrderAction::SetParent).with_new_parent(6), 409)]
#[case::missing(UpdateOrderRequest::new(42, OrderAction::MoveDown), 404)]
#[case::bad_position(UpdateOrderRequest::new(2, OrderAction::SetPosition).with_position("top"), 400)]
#[case::order_missing(UpdateOrderRequest::new(2, OrderAction::SetOrder), 400)]
fn given_rejected_request_when_update_order_then_status_and_no_tree(
    shop: Harness,
    #[case] request: UpdateOrderRequest,
    #[case] status: u16,
) {
    let response = shop.api().update_order(&request);

    assert_eq!(response.status, status);
    assert!(!response.success);
    assert!(response.categories.is_none());
    assert!(response.message.is_some());
}

#[rstest]
fn given_set_parent_without_target_when_update_order_then_moved_to_root(shop: Harness) {
    let request = UpdateOrderRequest::new(6, OrderAction::SetParent);

    let response = shop.api().update_order(&request);

    assert!(response.success);
    assert_eq!(shop.store.get_term(6).unwrap().unwrap().parent, ROOT);
}

#[rstest]
fn given_set_position_without_value_when_update_order_then_cleared(shop: Harness) {
    // Arrange
    shop.store.set_position(5, Some(Position::Left)).unwrap();

    // Act
    let response = shop
        .api()
        .update_order(&UpdateOrderRequest::new(5, OrderAction::SetPosition));

    // Assert
    assert!(response.success);
    assert_eq!(shop.store.get_position(5).unwrap(), None);
}

#[rstest]
fn given_store_failure_when_update_order_then_500(shop: Harness) {
    shop.store.simulate_write_error(true);

    let response = shop
        .api()
        .update_order(&UpdateOrderRequest::new(2, OrderAction::MoveDown));

    assert_eq!(response.status, 500);
    assert!(!response.success);
    assert!(response.message.unwrap().starts_with("Failed to update"));
}

#[rstest]
fn given_json_body_when_update_order_json_then_parsed_and_applied(shop: Harness) {
    // Arrange
    let body = json!({"category_id": 5, "action": "set_order", "new_order": -1}).to_string();

    // Act
    let response = shop.api().update_order_json(&body);

    // Assert
    assert_eq!(response.status, 200);
    let payload = serde_json::to_value(&response).unwrap();
    assert_eq!(payload["success"], true);
    assert_eq!(payload["categories"][0]["id"], 5);
    assert_eq!(payload["categories"][0]["order"], -1);
    assert!(payload.get("status").is_none());
    assert!(payload.get("message").is_none());
}

#[rstest]
#[case("not json")]
#[case(r#"{"action": "move_up"}"#)]
fn given_malformed_body_when_update_order_json_then_400(shop: Harness, #[case] body: &str) {
    let response = shop.api().update_order_json(body);
    assert_eq!(response.status, 400);
}

#[rstest]
#[case(false, vec![1, 2, 5])]
#[case(true, vec![1, 2, 5])]
fn given_store_when_get_categories_then_full_or_root_only(
    shop: Harness,
    #[case] parent_only: bool,
    #[case] expected: Vec<u64>,
) {
    // Act
    let response = shop.api().get_categories(parent_only);

    // Assert
    assert_eq!(response.status, 200);
    let nodes = response.categories.unwrap();
    assert_eq!(nodes.iter().map(|n| n.id).collect::<Vec<_>>(), expected);
    assert_eq!(nodes[0].has_children, !parent_only);
    assert!(!nodes[0].is_childless);
}

#[rstest]
fn given_partly_invalid_batch_when_bulk_reorder_then_still_success(shop: Harness) {
    // Arrange
    let items = vec![
        ReorderItem::new(404, None, 0),
        ReorderItem::new(5, None, -1),
        ReorderItem::default(),
    ];

    // Act
    let response = shop.api().bulk_reorder(&items);

    // Assert
    assert_eq!(response.status, 200);
    assert!(response.success);
    assert_eq!(response.categories.unwrap()[0].id, 5);
}

#[test]
fn given_bulk_payload_when_deserializing_then_missing_fields_are_none() {
    let items: Vec<ReorderItem> =
        serde_json::from_str(r#"[{"id": 3, "parent": 1, "order": 2}, {"order": 4}, {"id": 7}]"#)
            .unwrap();

    assert_eq!(items[0], ReorderItem::new(3, Some(1), 2));
    assert_eq!(items[1].id, None);
    assert_eq!(items[2].order, None);
}
