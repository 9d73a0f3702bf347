//! Boot, reset and reload behavior of the admin configuration.

use std::sync::Arc;

use admin_config::config::{HookSlotName, InitState, SearchOperator};
use admin_config::hooks::HookOrigin;
use admin_config::{ConfigError, GlobalConfig, ModelRef, Result};
use parking_lot::Mutex;
use serde_json::Value;

mod common;

use common::{host_config, BlogPost, RoleAuthorization, Team};

#[test]
fn test_every_reference_form_reaches_one_config() {
    let config = host_config();
    let blog = config.catalog().lookup("Blog::Post").unwrap();

    let forms = [
        config.model(ModelRef::of_type::<BlogPost>()),
        config.model(ModelRef::instance(&BlogPost)),
        config.model(&blog),
        config.model("Blog::Post"),
        config.model("::Blog::Post"),
    ];
    for form in &forms[1..] {
        assert!(Arc::ptr_eq(&forms[0], form));
    }
    assert_eq!(config.registry().len(), 1);
}

#[test]
fn test_unmapped_value_degrades_to_type_name() {
    let config = host_config();
    let number = 42u32;
    let model = config.model(ModelRef::of_value(&number));
    assert_eq!(model.key().as_str(), "u32");
    assert!(model.abstract_model().is_none());
}

#[test]
fn test_initializer_closure_builds_config() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let seen = order.clone();

    let mut config = host_config();
    config
        .adapters_mut()
        .register_authorization("roles", RoleAuthorization::new);
    config.set_initializer(move |config: &mut GlobalConfig| -> Result<()> {
        config.set_default_search_operator("ends_with")?;
        config.authorize_with_adapter("roles", vec![Value::from("Team")])?;
        let first = seen.clone();
        config.apply(move |config| {
            first.lock().push("weights");
            config.model_with(ModelRef::of_type::<Team>(), |m| m.set_weight(-5));
        });
        let second = seen.clone();
        config.apply(move |_| second.lock().push("labels"));
        Ok(())
    });

    assert_eq!(config.init_state(), InitState::Uninitialized);
    config.reload().unwrap();

    assert_eq!(config.init_state(), InitState::Initialized);
    assert_eq!(*order.lock(), vec!["weights", "labels"]);
    assert_eq!(config.settings().default_search_operator, SearchOperator::EndsWith);
    assert_eq!(config.model("Team").weight(), -5);
    assert_eq!(
        config.hook_origin(HookSlotName::Authorize),
        &HookOrigin::Adapter("roles".into())
    );
}

#[test]
fn test_reload_discards_runtime_changes() {
    let mut config = host_config();
    config.set_initializer(|config: &mut GlobalConfig| -> Result<()> {
        config.settings_mut().default_items_per_page = 40;
        Ok(())
    });
    config.reload().unwrap();

    config.settings_mut().default_items_per_page = 7;
    config.settings_mut().excluded_models.push("Team".into());
    let before = config.model("Team");

    config.reload().unwrap();
    assert_eq!(config.settings().default_items_per_page, 40);
    assert!(config.settings().excluded_models.is_empty());
    assert!(!Arc::ptr_eq(&before, &config.model("Team")));
}

#[test]
fn test_reload_without_initializer_restores_defaults() {
    let mut config = host_config();
    config.set_default_search_operator("is").unwrap();
    config.reload().unwrap();
    assert!(config.is_initialized());
    assert_eq!(config.settings().default_search_operator, SearchOperator::Default);
    assert!(config.settings().included_models.is_empty());
    assert!(!config.catalog().is_empty());
}

#[test]
fn test_post_init_apply_runs_immediately() {
    let mut config = host_config();
    config.initialize();
    config.apply(|config| config.settings_mut().browser_validations = false);
    assert!(!config.settings().browser_validations);
    assert_eq!(config.pending_blocks(), 0);
}

#[test]
fn test_failed_reload_still_initialized() {
    let mut config = host_config();
    config.set_initializer(|config: &mut GlobalConfig| -> Result<()> {
        config.apply(|config| config.settings_mut().total_columns_width = 900);
        config.set_default_search_operator("fuzzy")
    });

    let err = config.reload().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidOption { .. }));
    assert!(config.is_initialized());
    assert_eq!(config.pending_blocks(), 0);
    assert_eq!(config.settings().total_columns_width, 900);
}

#[test]
fn test_global_handle_queues_until_initialized() {
    let global = admin_config::global();
    admin_config::configure(|config| config.settings_mut().navigation_static_label = Some("Links".into()));
    assert!(global.read().settings().navigation_static_label.is_none());
    assert_eq!(global.read().pending_blocks(), 1);

    global.write().initialize();
    assert_eq!(
        global.read().settings().navigation_static_label.as_deref(),
        Some("Links")
    );
}
