//! Tests for JsonFileTermStore
//!
//! The file is the only state: every call re-reads it, every write replaces it.

use std::path::PathBuf;
use std::sync::Arc;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use catorder::application::api::{OrderAction, UpdateOrderRequest};
use catorder::config::Settings;
use catorder::domain::{Position, Term, ROOT};
use catorder::infrastructure::di::ServiceContainer;
use catorder::infrastructure::{
    JsonFileTermStore, MetaKeys, RealFileSystem, StoreError, TermFilter, TermStore,
};
use catorder::util::testing::{init_test_setup, shop_terms};

struct Fixture {
    _temp: TempDir,
    path: PathBuf,
    store: JsonFileTermStore,
}

#[fixture]
fn file_store() -> Fixture {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data").join("terms.json");
    let store = JsonFileTermStore::new(&path, Arc::new(RealFileSystem));
    store.import(&shop_terms()).unwrap();
    Fixture {
        _temp: temp,
        path,
        store,
    }
}

#[rstest]
fn given_imported_terms_when_listing_then_ranked_and_complete(file_store: Fixture) {
    // Act
    let all = file_store.store.list_terms(&TermFilter::all()).unwrap();
    let roots = file_store
        .store
        .list_terms(&TermFilter::children_of(ROOT))
        .unwrap();

    // Assert
    assert_eq!(all.len(), 6);
    assert_eq!(roots.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 5]);
    assert_eq!(roots[0].count, 12);
}

#[rstest]
fn given_write_when_reopening_then_persisted(file_store: Fixture) {
    // Arrange
    file_store.store.set_order(5, -2).unwrap();
    file_store.store.set_parent(6, ROOT).unwrap();
    file_store
        .store
        .set_position(2, Some(Position::Left))
        .unwrap();

    // Act
    let reopened = JsonFileTermStore::new(&file_store.path, Arc::new(RealFileSystem));

    // Assert
    assert_eq!(reopened.get_order(5).unwrap(), -2);
    assert_eq!(reopened.get_term(6).unwrap().unwrap().parent, ROOT);
    assert_eq!(reopened.get_position(2).unwrap(), Some(Position::Left));
}

#[rstest]
fn given_stored_file_when_reading_raw_then_meta_holds_rank_and_position(file_store: Fixture) {
    // Arrange
    file_store
        .store
        .set_position(3, Some(Position::Right))
        .unwrap();

    // Act
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&file_store.path).unwrap()).unwrap();

    // Assert
    let shirts = raw["terms"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == 3)
        .unwrap();
    assert_eq!(shirts["meta"]["order"], "0");
    assert_eq!(shirts["meta"]["merida_mega_menu_column_position"], "right");
}

#[rstest]
fn given_swap_when_applied_then_both_ranks_exchanged(file_store: Fixture) {
    file_store.store.swap_orders(1, 5).unwrap();

    assert_eq!(file_store.store.get_order(1).unwrap(), 2);
    assert_eq!(file_store.store.get_order(5).unwrap(), 0);
}

#[rstest]
fn given_cleared_position_when_reading_then_attribute_removed(file_store: Fixture) {
    file_store
        .store
        .set_position(2, Some(Position::Left))
        .unwrap();

    file_store.store.set_position(2, None).unwrap();

    let content = std::fs::read_to_string(&file_store.path).unwrap();
    assert!(!content.contains("merida_mega_menu_column_position"));
}

#[test]
fn given_unset_or_garbage_order_when_reading_then_zero() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("terms.json");
    std::fs::write(
        &path,
        r#"{"terms": [
            {"id": 1, "name": "a", "parent": 0},
            {"id": 2, "name": "b", "parent": 0, "meta": {"order": "x"}},
            {"id": 3, "name": "c", "parent": 0, "meta": {"order": " 4 ", "merida_mega_menu_column_position": "middle"}}
        ]}"#,
    )
    .unwrap();
    let store = JsonFileTermStore::new(&path, Arc::new(RealFileSystem));

    // Act & Assert
    assert_eq!(store.get_order(1).unwrap(), 0);
    assert_eq!(store.get_order(2).unwrap(), 0);
    assert_eq!(store.get_order(3).unwrap(), 4);
    assert_eq!(store.get_position(3).unwrap(), None);
}

#[test]
fn given_corrupt_file_when_listing_then_serialization_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("terms.json");
    std::fs::write(&path, "{ not json").unwrap();
    let store = JsonFileTermStore::new(&path, Arc::new(RealFileSystem));

    let result = store.list_terms(&TermFilter::all());

    assert!(matches!(result, Err(StoreError::Serialization { .. })));
}

#[test]
fn given_custom_meta_keys_when_writing_then_uses_configured_keys() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("terms.json");
    let keys = MetaKeys {
        order: "menu_rank".into(),
        position: "column".into(),
    };
    let store = JsonFileTermStore::new(&path, Arc::new(RealFileSystem)).with_meta_keys(keys);
    store.import(&[Term::new(1, "a", ROOT).with_order(3)]).unwrap();

    // Act
    store.set_position(1, Some(Position::Left)).unwrap();

    // Assert
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"menu_rank\": \"3\""));
    assert!(content.contains("\"column\": \"left\""));
}

#[test]
fn given_container_over_file_when_moving_then_file_reflects_move() {
    // Arrange
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let settings = Settings {
        store_path: temp.path().join("terms.json"),
        ..Settings::default()
    };
    let container = ServiceContainer::new(settings);
    JsonFileTermStore::new(temp.path().join("terms.json"), container.fs.clone())
        .import(&shop_terms())
        .unwrap();

    // Act
    let response = container
        .api()
        .update_order(&UpdateOrderRequest::new(4, OrderAction::MoveLeft));

    // Assert
    assert!(response.success);
    let reopened = JsonFileTermStore::new(temp.path().join("terms.json"), container.fs.clone());
    let moved = reopened.get_term(4).unwrap().unwrap();
    assert_eq!(moved.parent, ROOT);
    assert_eq!(moved.order, 3);
}
