//! Adapter contracts and name-based adapter registries.
//!
//! Each adapter module registers its factory under a name at startup; the
//! `*_with_adapter` configuration calls look factories up here. A missing
//! name is a `ConfigError::UnknownAdapter` at the time of the call.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Once};

use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::hooks::context::{Bindings, RequestContext};
use crate::model::key::ModelKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    Authorization,
    Auditing,
    Configuration,
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdapterKind::Authorization => "authorization",
            AdapterKind::Auditing => "auditing",
            AdapterKind::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

/// Decides whether the current request may perform an action.
pub trait AuthorizationAdapter: Send + Sync {
    /// `Some(decision)`, or `None` when the adapter has no opinion.
    fn authorized(&self, action: &str, bindings: &Bindings) -> Option<bool>;
}

/// One auditable change made through the admin interface.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub action: String,
    pub model: Option<ModelKey>,
    pub object: Option<Value>,
    pub user: Option<Value>,
}

pub trait AuditingAdapter: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Options object handed to `configure_with` blocks.
pub trait ConfigurationAdapter: Send + Sync {
    fn set_option(&mut self, name: &str, value: Value) -> Result<()>;
    fn option(&self, name: &str) -> Option<&Value>;
}

pub type SetupFn = Arc<dyn Fn() + Send + Sync>;
pub type AuthorizationFactory =
    Arc<dyn Fn(&RequestContext, &[Value]) -> Arc<dyn AuthorizationAdapter> + Send + Sync>;
pub type AuditingFactory =
    Arc<dyn Fn(&RequestContext, &[Value]) -> Arc<dyn AuditingAdapter> + Send + Sync>;
pub type ConfigurationFactory = Arc<dyn Fn() -> Box<dyn ConfigurationAdapter> + Send + Sync>;

struct Registration<F> {
    build: F,
    setup: Option<SetupFn>,
    setup_once: Arc<Once>,
}

/// Adapter factories of one kind, by name.
pub struct AdapterRegistry<F> {
    kind: AdapterKind,
    entries: HashMap<String, Registration<F>>,
}

impl<F: Clone> AdapterRegistry<F> {
    pub fn new(kind: AdapterKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    /// Register (or replace) the factory for `name`.
    pub fn register(&mut self, name: impl Into<String>, build: F) -> &mut Self {
        let name = name.into();
        tracing::debug!(kind = %self.kind, adapter = %name, "Registering adapter");
        self.entries.insert(
            name,
            Registration {
                build,
                setup: None,
                setup_once: Arc::new(Once::new()),
            },
        );
        self
    }

    /// Attach a setup routine run the first time `name` is resolved.
    pub fn on_setup<S>(&mut self, name: &str, setup: S) -> &mut Self
    where
        S: Fn() + Send + Sync + 'static,
    {
        match self.entries.get_mut(name) {
            Some(registration) => registration.setup = Some(Arc::new(setup)),
            None => tracing::warn!(kind = %self.kind, adapter = %name, "Setup given for unregistered adapter"),
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, ascending.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// `UnknownAdapter` unless `name` is registered. Runs no setup.
    pub fn ensure_registered(&self, name: &str) -> Result<()> {
        self.registration(name).map(|_| ())
    }

    /// Look up the factory for `name`, running its setup routine once per process.
    pub fn resolve(&self, name: &str) -> Result<F> {
        let registration = self.registration(name)?;
        if let Some(setup) = &registration.setup {
            registration.setup_once.call_once(|| {
                tracing::info!(kind = %self.kind, adapter = %name, "Running adapter setup");
                setup();
            });
        }
        Ok(registration.build.clone())
    }

    fn registration(&self, name: &str) -> Result<&Registration<F>> {
        self.entries.get(name).ok_or_else(|| ConfigError::UnknownAdapter {
            kind: self.kind,
            name: name.to_string(),
        })
    }
}

impl<F> fmt::Debug for AdapterRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("AdapterRegistry")
            .field("kind", &self.kind)
            .field("adapters", &names)
            .finish()
    }
}

/// One registry per adapter kind.
#[derive(Debug)]
pub struct AdapterRegistries {
    pub authorization: AdapterRegistry<AuthorizationFactory>,
    pub auditing: AdapterRegistry<AuditingFactory>,
    pub configuration: AdapterRegistry<ConfigurationFactory>,
}

impl Default for AdapterRegistries {
    fn default() -> Self {
        Self {
            authorization: AdapterRegistry::new(AdapterKind::Authorization),
            auditing: AdapterRegistry::new(AdapterKind::Auditing),
            configuration: AdapterRegistry::new(AdapterKind::Configuration),
        }
    }
}

impl AdapterRegistries {
    pub fn register_authorization<B, A>(&mut self, name: impl Into<String>, build: B) -> &mut AdapterRegistry<AuthorizationFactory>
    where
        B: Fn(&RequestContext, &[Value]) -> A + Send + Sync + 'static,
        A: AuthorizationAdapter + 'static,
    {
        let factory: AuthorizationFactory = Arc::new(
            move |ctx: &RequestContext, args: &[Value]| -> Arc<dyn AuthorizationAdapter> {
                Arc::new(build(ctx, args))
            },
        );
        self.authorization.register(name, factory)
    }

    pub fn register_auditing<B, A>(&mut self, name: impl Into<String>, build: B) -> &mut AdapterRegistry<AuditingFactory>
    where
        B: Fn(&RequestContext, &[Value]) -> A + Send + Sync + 'static,
        A: AuditingAdapter + 'static,
    {
        let factory: AuditingFactory = Arc::new(
            move |ctx: &RequestContext, args: &[Value]| -> Arc<dyn AuditingAdapter> {
                Arc::new(build(ctx, args))
            },
        );
        self.auditing.register(name, factory)
    }

    pub fn register_configuration<B, A>(&mut self, name: impl Into<String>, build: B) -> &mut AdapterRegistry<ConfigurationFactory>
    where
        B: Fn() -> A + Send + Sync + 'static,
        A: ConfigurationAdapter + 'static,
    {
        let factory: ConfigurationFactory =
            Arc::new(move || -> Box<dyn ConfigurationAdapter> { Box::new(build()) });
        self.configuration.register(name, factory)
    }
}

/// A configuration adapter that simply stores the options it is given.
#[derive(Debug, Clone, Default)]
pub struct OptionsAdapter {
    options: serde_json::Map<String, Value>,
}

impl ConfigurationAdapter for OptionsAdapter {
    fn set_option(&mut self, name: &str, value: Value) -> Result<()> {
        self.options.insert(name.to_string(), value);
        Ok(())
    }

    fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }
}
