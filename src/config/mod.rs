//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! initializer (closure or TOML file)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → settings and hooks set on GlobalConfig
//!     → model blocks queued in deferred.rs
//!     → initialize() drains the queue
//!
//! On reload:
//!     watcher.rs detects change
//!     → reset() restores defaults
//!     → initializer runs again
//!     → initialize()
//! ```
//!
//! # Design Decisions
//! - One aggregate owns settings, the model registry, hooks and the deferred
//!   queue; reset replaces them wholesale
//! - The host description (model catalog, model sources, adapter registries,
//!   installed initializer) survives reset
//! - Process-wide access goes through a `RwLock`: one writer during boot,
//!   concurrent readers afterwards
//! - Invalid option values are rejected before any state changes

pub mod deferred;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use serde_json::Value;

use crate::config::deferred::DeferredInitializer;
use crate::error::Result;
use crate::hooks::adapters::{AdapterRegistries, ConfigurationAdapter};
use crate::hooks::context::{Bindings, RequestContext};
use crate::hooks::{self, CurrentUserHook, Hook, HookOrigin, Hooks};
use crate::model::abstract_model::{AbstractModel, ModelCatalog};
use crate::model::config::{BoundModel, ModelConfig};
use crate::model::discovery::{ModelDiscovery, ModelSource};
use crate::model::key::{resolve, ModelKey, ModelRef};
use crate::model::registry::ModelConfigRegistry;
use crate::navigation;
use crate::observability::metrics;

pub use deferred::{DeferredBlock, InitState};
pub use loader::{load_initializer, FileInitializer, Initializer};
pub use schema::{HiddenFieldContext, InitializerFile, NavigationLink, SearchOperator, Settings};
pub use validation::ValidationError;
pub use watcher::InitializerWatcher;

/// The admin configuration of one process.
pub struct GlobalConfig {
    settings: Settings,
    registry: ModelConfigRegistry,
    hooks: Hooks,
    extensions: BTreeMap<String, Box<dyn ConfigurationAdapter>>,
    deferred: DeferredInitializer<GlobalConfig>,
    catalog: ModelCatalog,
    discovery: ModelDiscovery,
    adapters: AdapterRegistries,
    initializer: Option<Arc<dyn Initializer>>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            registry: ModelConfigRegistry::new(),
            hooks: Hooks::default(),
            extensions: BTreeMap::new(),
            deferred: DeferredInitializer::new(),
            catalog: ModelCatalog::new(),
            discovery: ModelDiscovery::default(),
            adapters: AdapterRegistries::default(),
            initializer: None,
        }
    }
}

impl GlobalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Set the default search operator from its textual form.
    ///
    /// Unsupported values are rejected and the current value is kept.
    pub fn set_default_search_operator(&mut self, value: &str) -> Result<()> {
        let op: SearchOperator = value.parse()?;
        self.settings.default_search_operator = op;
        Ok(())
    }

    // --- deferred configuration ---

    /// Queue `block` until [`initialize`](Self::initialize), or run it now if
    /// already initialized.
    pub fn apply<F>(&mut self, block: F)
    where
        F: FnOnce(&mut GlobalConfig) + Send + 'static,
    {
        if let Some(block) = self.deferred.defer(Box::new(block)) {
            block(self);
        }
    }

    /// Run queued blocks in registration order, then mark initialized.
    ///
    /// Blocks queued by a running block are drained in the same pass.
    pub fn initialize(&mut self) {
        if self.deferred.is_initialized() {
            return;
        }
        let mut drained = 0usize;
        while let Some(block) = self.deferred.pop() {
            block(self);
            drained += 1;
        }
        self.deferred.mark_initialized();
        tracing::info!(blocks = drained, "Admin configuration initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.deferred.is_initialized()
    }

    pub fn init_state(&self) -> InitState {
        self.deferred.state()
    }

    pub fn pending_blocks(&self) -> usize {
        self.deferred.pending()
    }

    // --- lifecycle ---

    /// Restore settings, the model registry, hooks and extensions to their
    /// defaults. The initialized flag is left alone.
    pub fn reset(&mut self) {
        self.settings = Settings::default();
        self.registry.reset_all();
        self.hooks = Hooks::default();
        self.extensions.clear();
        self.discovery.invalidate();
        tracing::debug!("Admin configuration reset to defaults");
    }

    /// Reset, re-run the installed initializer, and initialize again.
    ///
    /// The config ends up initialized even when the initializer fails; the
    /// failure is still returned.
    pub fn reload(&mut self) -> Result<()> {
        tracing::info!(initializer = self.initializer.is_some(), "Reloading admin configuration");
        self.reset();
        self.deferred.rewind();

        let outcome = match self.initializer.clone() {
            Some(initializer) => initializer.run(self),
            None => Ok(()),
        };
        self.initialize();

        match &outcome {
            Ok(()) => metrics::record_reload("ok"),
            Err(e) => {
                tracing::error!(error = %e, "Initializer failed during reload");
                metrics::record_reload("error");
            }
        }
        outcome
    }

    /// Install the initializer `reload` re-runs.
    pub fn set_initializer(&mut self, initializer: impl Initializer + 'static) {
        self.initializer = Some(Arc::new(initializer));
    }

    // --- models ---

    /// The configuration for `entity`, created on first reference.
    pub fn model<'a>(&self, entity: impl Into<ModelRef<'a>>) -> Arc<ModelConfig> {
        let entity = entity.into();
        let (key, abstract_model) = self.locate(&entity);
        self.registry.fetch_or_create(key, abstract_model)
    }

    /// Like [`model`](Self::model), then customize the entry when it is bound
    /// to a known model.
    pub fn model_with<'a, F>(&self, entity: impl Into<ModelRef<'a>>, customize: F) -> Arc<ModelConfig>
    where
        F: FnOnce(&ModelConfig),
    {
        let entity = entity.into();
        let (key, abstract_model) = self.locate(&entity);
        self.registry.fetch_or_create_with(key, abstract_model, customize)
    }

    fn locate(&self, entity: &ModelRef<'_>) -> (ModelKey, Option<Arc<AbstractModel>>) {
        let key = resolve(entity);
        let abstract_model = self
            .catalog
            .get(&key)
            .or_else(|| entity.descriptor().map(|model| Arc::new(model.clone())));
        (key, abstract_model)
    }

    /// Drop the configuration of one model.
    pub fn reset_model<'a>(&self, entity: impl Into<ModelRef<'a>>) -> Option<Arc<ModelConfig>> {
        let key = resolve(&entity.into());
        self.registry.reset(&key)
    }

    pub fn registry(&self) -> &ModelConfigRegistry {
        &self.registry
    }

    /// Allowlist (or discovered names) minus exclusions, ascending.
    pub fn models_pool(&self) -> Result<Vec<String>> {
        let pool = self
            .discovery
            .effective_pool(&self.settings.included_models, &self.settings.excluded_models)?;
        Ok(pool)
    }

    /// A configuration for every model of the live pool.
    pub fn models(&self) -> Result<Vec<Arc<ModelConfig>>> {
        let pool = self.models_pool()?;
        Ok(self.registry.all(&pool, &self.catalog))
    }

    /// Navigation list for one request.
    pub fn visible_models(&self, bindings: &Bindings) -> Result<Vec<BoundModel>> {
        let models = self.models()?;
        Ok(navigation::visible_models(&models, bindings))
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut ModelCatalog {
        &mut self.catalog
    }

    pub fn discovery(&self) -> &ModelDiscovery {
        &self.discovery
    }

    pub fn add_model_source(&mut self, source: ModelSource) {
        self.discovery.add_source(source);
    }

    pub fn set_discovery(&mut self, discovery: ModelDiscovery) {
        self.discovery = discovery;
    }

    // --- hooks ---

    pub fn adapters(&self) -> &AdapterRegistries {
        &self.adapters
    }

    pub fn adapters_mut(&mut self) -> &mut AdapterRegistries {
        &mut self.adapters
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn authenticate_with<F>(&mut self, hook: F)
    where
        F: Fn(&mut RequestContext) + Send + Sync + 'static,
    {
        self.hooks.authenticate.set(Arc::new(hook));
    }

    pub fn authenticate(&self) -> Hook {
        self.hooks.authenticate()
    }

    pub fn authorize_with<F>(&mut self, hook: F)
    where
        F: Fn(&mut RequestContext) + Send + Sync + 'static,
    {
        self.hooks.authorize.set(Arc::new(hook));
    }

    /// Back the authorize hook with the named authorization adapter.
    ///
    /// Fails immediately with `UnknownAdapter` if the name is not registered.
    pub fn authorize_with_adapter(&mut self, name: &str, args: Vec<Value>) -> Result<()> {
        let factory = self.adapters.authorization.resolve(name)?;
        self.hooks
            .authorize
            .set_adapter(name, hooks::authorization_hook(factory, args));
        tracing::debug!(adapter = %name, "Authorization adapter installed");
        Ok(())
    }

    pub fn authorize(&self) -> Hook {
        self.hooks.authorize()
    }

    pub fn audit_with<F>(&mut self, hook: F)
    where
        F: Fn(&mut RequestContext) + Send + Sync + 'static,
    {
        self.hooks.audit.set(Arc::new(hook));
    }

    /// Back the audit hook with the named auditing adapter.
    pub fn audit_with_adapter(&mut self, name: &str, args: Vec<Value>) -> Result<()> {
        let factory = self.adapters.auditing.resolve(name)?;
        self.hooks
            .audit
            .set_adapter(name, hooks::auditing_hook(factory, args));
        tracing::debug!(adapter = %name, "Auditing adapter installed");
        Ok(())
    }

    pub fn audit(&self) -> Hook {
        self.hooks.audit()
    }

    pub fn set_current_user_method<F>(&mut self, method: F)
    where
        F: Fn(&RequestContext) -> Option<Value> + Send + Sync + 'static,
    {
        self.hooks.current_user.set(Arc::new(method));
    }

    pub fn current_user_method(&self) -> CurrentUserHook {
        self.hooks.current_user()
    }

    pub fn hook_origin(&self, slot: HookSlotName) -> &HookOrigin {
        match slot {
            HookSlotName::Authenticate => self.hooks.authenticate.origin(),
            HookSlotName::Authorize => self.hooks.authorize.origin(),
            HookSlotName::Audit => self.hooks.audit.origin(),
            HookSlotName::CurrentUser => self.hooks.current_user.origin(),
        }
    }

    /// Yield the named configuration adapter to `block`.
    ///
    /// The adapter is built on first use and kept, so later calls see the
    /// options earlier ones set.
    pub fn configure_with<F>(&mut self, name: &str, block: F) -> Result<()>
    where
        F: FnOnce(&mut dyn ConfigurationAdapter) -> Result<()>,
    {
        let factory = self.adapters.configuration.resolve(name)?;
        let extension = self
            .extensions
            .entry(name.to_string())
            .or_insert_with(|| factory());
        block(&mut **extension)
    }

    pub fn extension(&self, name: &str) -> Option<&dyn ConfigurationAdapter> {
        self.extensions.get(name).map(|extension| &**extension)
    }

    /// Run the request hooks against `ctx`.
    pub fn run_request_hooks(&self, ctx: &mut RequestContext) {
        self.hooks.run(ctx);
    }
}

/// Names of the hook slots, for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookSlotName {
    Authenticate,
    Authorize,
    Audit,
    CurrentUser,
}

impl fmt::Debug for GlobalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalConfig")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("hooks", &self.hooks)
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .field("deferred", &self.deferred)
            .field("catalog", &self.catalog)
            .field("discovery", &self.discovery)
            .field("adapters", &self.adapters)
            .field("initializer", &self.initializer.is_some())
            .finish()
    }
}

static GLOBAL: LazyLock<RwLock<GlobalConfig>> = LazyLock::new(|| RwLock::new(GlobalConfig::new()));

/// The process-wide configuration.
pub fn global() -> &'static RwLock<GlobalConfig> {
    &GLOBAL
}

/// `apply` against the process-wide configuration.
pub fn configure<F>(block: F)
where
    F: FnOnce(&mut GlobalConfig) + Send + 'static,
{
    global().write().apply(block);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use crate::error::ConfigError;
    use crate::hooks::adapters::{AuthorizationAdapter, OptionsAdapter};
    use crate::model::key::Model;

    struct Team;

    impl Model for Team {
        const NAME: &'static str = "Team";
    }

    struct Allow;

    impl AuthorizationAdapter for Allow {
        fn authorized(&self, _action: &str, _bindings: &Bindings) -> Option<bool> {
            Some(true)
        }
    }

    #[test]
    fn test_same_key_same_instance() {
        let mut config = GlobalConfig::new();
        config.catalog_mut().register_type::<Team>();

        let by_type = config.model(ModelRef::of_type::<Team>());
        let by_name = config.model("Team");
        let by_instance = config.model(ModelRef::instance(&Team));
        assert!(Arc::ptr_eq(&by_type, &by_name));
        assert!(Arc::ptr_eq(&by_type, &by_instance));
        assert_eq!(config.registry().len(), 1);
    }

    #[test]
    fn test_customization_accumulates() {
        let mut config = GlobalConfig::new();
        config.catalog_mut().register_type::<Team>();
        config.model_with("Team", |m| m.set_weight(2));
        let team = config.model_with("Team", |m| m.set_label("Squad"));
        assert_eq!(team.weight(), 2);
        assert_eq!(team.label(), "Squad");
    }

    #[test]
    fn test_unknown_model_is_not_customized() {
        let config = GlobalConfig::new();
        let ghost = config.model_with("Ghost", |m| m.set_weight(9));
        assert!(ghost.abstract_model().is_none());
        assert_eq!(ghost.weight(), 0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut config = GlobalConfig::new();
        config.settings_mut().excluded_models = vec!["Secret".into()];
        config.set_default_search_operator("like").unwrap();
        config.model("Team");
        config.initialize();

        config.reset();
        assert!(config.settings().excluded_models.is_empty());
        assert_eq!(config.settings().default_search_operator, SearchOperator::Default);
        assert!(config.registry().is_empty());
        assert!(config.is_initialized());
    }

    #[test]
    fn test_invalid_search_operator_keeps_previous() {
        let mut config = GlobalConfig::new();
        config.set_default_search_operator("starts_with").unwrap();
        let err = config.set_default_search_operator("bogus").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOption { .. }));
        assert_eq!(config.settings().default_search_operator, SearchOperator::StartsWith);
    }

    #[test]
    fn test_deferred_blocks_run_in_order_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut config = GlobalConfig::new();
        for i in 0..3 {
            let log = log.clone();
            config.apply(move |_| log.lock().push(i));
        }
        assert!(log.lock().is_empty());

        config.initialize();
        config.initialize();
        assert_eq!(*log.lock(), vec![0, 1, 2]);

        let late = log.clone();
        config.apply(move |_| late.lock().push(3));
        assert_eq!(*log.lock(), vec![0, 1, 2, 3]);
        assert_eq!(config.pending_blocks(), 0);
    }

    #[test]
    fn test_block_queued_during_drain_runs_in_same_pass() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let outer = log.clone();
        let mut config = GlobalConfig::new();
        config.apply(move |config| {
            outer.lock().push("outer");
            let inner = outer.clone();
            config.apply(move |_| inner.lock().push("inner"));
        });
        config.initialize();
        assert_eq!(*log.lock(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_reload_reruns_initializer() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();

        let mut config = GlobalConfig::new();
        config.set_initializer(move |config: &mut GlobalConfig| -> Result<()> {
            counter.fetch_add(1, Ordering::SeqCst);
            config.settings_mut().default_items_per_page = 50;
            config.apply(|config| config.settings_mut().compact_show_view = false);
            Ok(())
        });

        config.settings_mut().default_items_per_page = 5;
        config.reload().unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(config.settings().default_items_per_page, 50);
        assert!(!config.settings().compact_show_view);
        assert!(config.is_initialized());
        assert_eq!(config.pending_blocks(), 0);
    }

    #[test]
    fn test_reload_initializes_even_when_initializer_fails() {
        let mut config = GlobalConfig::new();
        config.set_initializer(|config: &mut GlobalConfig| config.authorize_with_adapter("missing", Vec::new()));
        assert!(config.reload().is_err());
        assert!(config.is_initialized());
        assert_eq!(config.pending_blocks(), 0);
    }

    #[test]
    fn test_unknown_adapter_fails_at_set_time() {
        let mut config = GlobalConfig::new();
        let err = config.audit_with_adapter("paper_trail", Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAdapter { .. }));
        assert_eq!(config.hook_origin(HookSlotName::Audit), &HookOrigin::Unset);
    }

    #[test]
    fn test_adapter_backed_authorize_hook() {
        let mut config = GlobalConfig::new();
        config
            .adapters_mut()
            .register_authorization("allow", |_ctx, _args| Allow);
        config.authorize_with_adapter("allow", vec![Value::Null]).unwrap();
        assert_eq!(
            config.hook_origin(HookSlotName::Authorize),
            &HookOrigin::Adapter("allow".into())
        );

        let mut ctx = RequestContext::new();
        config.run_request_hooks(&mut ctx);
        assert!(ctx.authorization_adapter().is_some());
    }

    #[test]
    fn test_configure_with_keeps_extension() {
        let mut config = GlobalConfig::new();
        config
            .adapters_mut()
            .register_configuration("export", OptionsAdapter::default);
        config
            .configure_with("export", |e| e.set_option("encoding", Value::from("utf-8")))
            .unwrap();
        config
            .configure_with("export", |e| e.set_option("sep", Value::from(";")))
            .unwrap();

        let export = config.extension("export").unwrap();
        assert_eq!(export.option("encoding"), Some(&Value::from("utf-8")));
        assert_eq!(export.option("sep"), Some(&Value::from(";")));

        config.reset();
        assert!(config.extension("export").is_none());
        assert!(config.adapters().configuration.contains("export"));
    }

    #[test]
    fn test_reset_model() {
        let mut config = GlobalConfig::new();
        config.catalog_mut().register_type::<Team>();
        let first = config.model("Team");
        assert!(config.reset_model(ModelRef::of_type::<Team>()).is_some());
        let second = config.model("Team");
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
