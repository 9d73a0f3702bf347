//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use admin_config::hooks::{AuditEvent, AuditingAdapter, AuthorizationAdapter};
use admin_config::model::AbstractModel;
use admin_config::{Bindings, GlobalConfig, Model, RequestContext};
use parking_lot::Mutex;
use serde_json::Value;

pub struct Team;

impl Model for Team {
    const NAME: &'static str = "Team";
}

pub struct Player;

impl Model for Player {
    const NAME: &'static str = "Player";
}

pub struct BlogPost;

impl Model for BlogPost {
    const NAME: &'static str = "Blog::Post";
}

/// A config whose catalog knows the host models above plus two embedded ones.
pub fn host_config() -> GlobalConfig {
    let mut config = GlobalConfig::new();
    let catalog = config.catalog_mut();
    catalog.register_type::<Team>();
    catalog.register_type::<Player>();
    catalog.register_type::<BlogPost>();
    catalog.register(AbstractModel::new("FieldTest").embedded(true));
    catalog.register(AbstractModel::new("Comment").embedded(true).cyclic(true));
    let names = config.catalog().names();
    config.settings_mut().included_models = names;
    config
}

/// Authorizes every action.
pub struct AllowAll;

impl AuthorizationAdapter for AllowAll {
    fn authorized(&self, _action: &str, _bindings: &Bindings) -> Option<bool> {
        Some(true)
    }
}

/// Grants `index` only on the models named in its constructor args.
pub struct RoleAuthorization {
    allowed: Vec<String>,
}

impl RoleAuthorization {
    pub fn new(_ctx: &RequestContext, args: &[Value]) -> Self {
        Self {
            allowed: args
                .iter()
                .filter_map(|arg| arg.as_str().map(ToString::to_string))
                .collect(),
        }
    }
}

impl AuthorizationAdapter for RoleAuthorization {
    fn authorized(&self, _action: &str, bindings: &Bindings) -> Option<bool> {
        let model = bindings.abstract_model()?;
        Some(self.allowed.iter().any(|name| name == model.key().as_str()))
    }
}

/// Keeps every recorded audit event.
#[derive(Default, Clone)]
pub struct MemoryAudit {
    pub events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl AuditingAdapter for MemoryAudit {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Bindings after running the config's request hooks on a fresh context.
pub fn request_bindings(config: &GlobalConfig) -> Bindings {
    let mut ctx = RequestContext::new();
    config.run_request_hooks(&mut ctx);
    Bindings::new(Arc::new(ctx))
}

pub fn keys(models: &[admin_config::BoundModel]) -> Vec<String> {
    models.iter().map(|m| m.key().to_string()).collect()
}

/// Create `relative` under `root`, with parent directories.
pub fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "").unwrap();
}
