//! TOML initializer files driving boot and reload.

use std::fs;

use admin_config::config::{FileInitializer, HiddenFieldContext, SearchOperator};
use admin_config::hooks::OptionsAdapter;
use admin_config::ConfigError;
use serde_json::Value;

mod common;

use common::{host_config, keys, request_bindings, RoleAuthorization};

const INITIALIZER: &str = r#"
default_items_per_page = 25
default_search_operator = "like"
included_models = ["Team", "Player", "Blog::Post"]
excluded_models = ["Player"]
label_methods = ["title", "name"]

[default_hidden_fields]
base = ["_type", "lock_version"]

[hooks]
authorize_with = { adapter = "roles", args = ["Team", "Blog::Post"] }

[configure.export]
encoding = "utf-8"

[models."Blog::Post"]
weight = -2
label = "Article"
navigation_label = "Content"

[models.Team]
label_plural = "Squads"
"#;

fn write_initializer(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("admin.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_file_initializer_boots_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_initializer(&dir, INITIALIZER);

    let mut config = host_config();
    config
        .adapters_mut()
        .register_authorization("roles", RoleAuthorization::new);
    config
        .adapters_mut()
        .register_configuration("export", OptionsAdapter::default);
    config.set_initializer(FileInitializer::new(&path));
    config.reload().unwrap();

    let settings = config.settings();
    assert_eq!(settings.default_items_per_page, 25);
    assert_eq!(settings.default_search_operator, SearchOperator::Like);
    assert_eq!(
        settings.default_hidden_fields[&HiddenFieldContext::Base],
        vec!["_type", "lock_version"]
    );
    assert_eq!(
        config.extension("export").and_then(|e| e.option("encoding")),
        Some(&Value::from("utf-8"))
    );

    assert_eq!(config.models_pool().unwrap(), vec!["Blog::Post", "Team"]);
    let post = config.model("Blog::Post");
    assert_eq!(post.label(), "Article");
    assert_eq!(post.navigation_label().as_deref(), Some("Content"));
    assert_eq!(config.model("Team").label_plural(), "Squads");

    let bindings = request_bindings(&config);
    assert_eq!(keys(&config.visible_models(&bindings).unwrap()), vec!["Blog::Post", "Team"]);
}

#[test]
fn test_reload_picks_up_edited_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_initializer(&dir, "default_items_per_page = 10\n");

    let mut config = host_config();
    config.set_initializer(FileInitializer::new(&path));
    config.reload().unwrap();
    assert_eq!(config.settings().default_items_per_page, 10);

    fs::write(&path, "default_items_per_page = 60\ncompact_show_view = false\n").unwrap();
    config.reload().unwrap();
    assert_eq!(config.settings().default_items_per_page, 60);
    assert!(!config.settings().compact_show_view);
}

#[test]
fn test_invalid_file_reports_every_problem() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_initializer(
        &dir,
        "default_items_per_page = 0\ndefault_associated_collection_limit = 0\nincluded_models = [\"\"]\n",
    );

    let mut config = host_config();
    config.set_initializer(FileInitializer::new(&path));
    match config.reload() {
        Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 3),
        other => panic!("expected validation errors, got {other:?}"),
    }
    assert!(config.is_initialized());
    assert_eq!(config.settings().default_items_per_page, 20);
}

#[test]
fn test_unregistered_adapter_in_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_initializer(&dir, "[hooks]\naudit_with = { adapter = \"paper_trail\" }\n");

    let mut config = host_config();
    config.set_initializer(FileInitializer::new(&path));
    let err = config.reload().unwrap_err();
    assert_eq!(err.to_string(), "unknown auditing adapter 'paper_trail'");
}

#[test]
fn test_malformed_toml_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_initializer(&dir, "default_items_per_page = \n");

    let mut config = host_config();
    config.set_initializer(FileInitializer::new(&path));
    assert!(matches!(config.reload(), Err(ConfigError::Parse(_))));
}
