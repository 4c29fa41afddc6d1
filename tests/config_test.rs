//! Integration tests for Settings config loading.
//!
//! These tests run without a global config (temp directories only), so they
//! exercise local config merging on top of the compiled defaults.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use catorder::config::{local_config_path, Settings};

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    // Arrange
    let store_dir = TempDir::new().unwrap();
    fs::write(
        store_dir.path().join(".catorder.toml"),
        r#"
order_meta_key = "menu_rank"
max_depth = 64
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(store_dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.order_meta_key, "menu_rank");
    assert_eq!(settings.max_depth, 64);
    assert_eq!(settings.position_meta_key, "merida_mega_menu_column_position");
    assert_eq!(settings.meta_keys().order, "menu_rank");
}

#[test]
fn given_local_config_with_store_path_when_load_then_tilde_expanded() {
    // Arrange
    let store_dir = TempDir::new().unwrap();
    fs::write(
        store_dir.path().join(".catorder.toml"),
        "store_path = \"~/shop/terms.json\"\n",
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(store_dir.path())).expect("load settings");

    // Assert
    let home = std::env::var("HOME").expect("HOME should be set");
    assert_eq!(
        settings.store_path,
        PathBuf::from(home).join("shop/terms.json")
    );
}

#[test]
fn given_invalid_local_config_when_load_then_config_error() {
    // Arrange
    let store_dir = TempDir::new().unwrap();
    fs::write(store_dir.path().join(".catorder.toml"), "max_depth = 0\n").unwrap();

    // Act
    let result = Settings::load(Some(store_dir.path()));

    // Assert
    let err = result.expect_err("max_depth 0 must be refused");
    assert!(err.to_string().contains("max_depth"));
}

#[test]
fn given_unparseable_local_config_when_load_then_names_file() {
    let store_dir = TempDir::new().unwrap();
    let path = local_config_path(store_dir.path());
    fs::write(&path, "max_depth = \"many\"\n").unwrap();

    let err = Settings::load(Some(store_dir.path())).unwrap_err();

    assert!(err.to_string().contains(".catorder.toml"));
}

#[test]
fn given_no_local_config_when_load_then_defaults() {
    let store_dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(store_dir.path())).expect("load defaults");

    assert_eq!(settings.order_meta_key, "order");
    assert_eq!(settings.max_depth, 1000);
}

#[test]
fn given_template_when_parsed_then_valid_toml_with_defaults() {
    // Template has everything commented out
    let parsed: toml::Value = toml::from_str(&Settings::template()).expect("valid toml");
    assert!(parsed.as_table().unwrap().is_empty());
}
