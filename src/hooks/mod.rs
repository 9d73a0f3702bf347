//! Pluggable request hooks.
//!
//! # Slots
//! - `authenticate`: closure only
//! - `authorize`, `audit`: closure, or named adapter + constructor args
//! - `current_user`: closure resolving the acting principal
//!
//! An empty slot reads as a fixed no-op. Adapter-backed slots store a closure
//! that builds the adapter inside the request context and leaves it there.

pub mod adapters;
pub mod context;

use std::fmt;
use std::sync::{Arc, LazyLock};

use serde_json::Value;

use crate::hooks::adapters::{AuditingFactory, AuthorizationFactory};
use crate::hooks::context::RequestContext;

pub use adapters::{
    AdapterKind, AdapterRegistries, AdapterRegistry, AuditEvent, AuditingAdapter,
    AuthorizationAdapter, ConfigurationAdapter, OptionsAdapter,
};
pub use context::Bindings;

pub type Hook = Arc<dyn Fn(&mut RequestContext) + Send + Sync>;
pub type CurrentUserHook = Arc<dyn Fn(&RequestContext) -> Option<Value> + Send + Sync>;

static NOOP_HOOK: LazyLock<Hook> = LazyLock::new(|| -> Hook { Arc::new(|_ctx: &mut RequestContext| {}) });
static NOOP_CURRENT_USER: LazyLock<CurrentUserHook> =
    LazyLock::new(|| -> CurrentUserHook { Arc::new(|_ctx: &RequestContext| None) });

/// Where a slot's behavior came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HookOrigin {
    #[default]
    Unset,
    Closure,
    Adapter(String),
}

/// Holds at most one behavior.
#[derive(Clone)]
pub struct HookSlot<H> {
    hook: Option<H>,
    origin: HookOrigin,
}

impl<H> Default for HookSlot<H> {
    fn default() -> Self {
        Self {
            hook: None,
            origin: HookOrigin::Unset,
        }
    }
}

impl<H: Clone> HookSlot<H> {
    pub fn set(&mut self, hook: H) {
        self.hook = Some(hook);
        self.origin = HookOrigin::Closure;
    }

    pub fn set_adapter(&mut self, adapter: impl Into<String>, hook: H) {
        self.hook = Some(hook);
        self.origin = HookOrigin::Adapter(adapter.into());
    }

    /// The stored behavior, or `fallback` when empty.
    pub fn get_or(&self, fallback: &H) -> H {
        self.hook.clone().unwrap_or_else(|| fallback.clone())
    }

    pub fn origin(&self) -> &HookOrigin {
        &self.origin
    }
}

impl<H> fmt::Debug for HookSlot<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSlot").field("origin", &self.origin).finish()
    }
}

/// The four hook slots.
#[derive(Debug, Clone, Default)]
pub struct Hooks {
    pub authenticate: HookSlot<Hook>,
    pub authorize: HookSlot<Hook>,
    pub audit: HookSlot<Hook>,
    pub current_user: HookSlot<CurrentUserHook>,
}

impl Hooks {
    pub fn authenticate(&self) -> Hook {
        self.authenticate.get_or(&NOOP_HOOK)
    }

    pub fn authorize(&self) -> Hook {
        self.authorize.get_or(&NOOP_HOOK)
    }

    pub fn audit(&self) -> Hook {
        self.audit.get_or(&NOOP_HOOK)
    }

    pub fn current_user(&self) -> CurrentUserHook {
        self.current_user.get_or(&NOOP_CURRENT_USER)
    }

    /// Run the hooks the way request middleware does: authenticate, resolve
    /// the current user, authorize, audit.
    pub fn run(&self, ctx: &mut RequestContext) {
        (self.authenticate())(&mut *ctx);
        let user = (self.current_user())(&*ctx);
        ctx.set_current_user(user);
        (self.authorize())(&mut *ctx);
        (self.audit())(&mut *ctx);
    }
}

/// The shared no-op hook.
pub fn noop_hook() -> Hook {
    NOOP_HOOK.clone()
}

/// Null positions are dropped from adapter constructor args.
fn compact_args(args: Vec<Value>) -> Vec<Value> {
    args.into_iter().filter(|arg| !arg.is_null()).collect()
}

pub(crate) fn authorization_hook(factory: AuthorizationFactory, args: Vec<Value>) -> Hook {
    let args = compact_args(args);
    Arc::new(move |ctx: &mut RequestContext| {
        let adapter = factory(&*ctx, args.as_slice());
        ctx.set_authorization_adapter(adapter);
    })
}

pub(crate) fn auditing_hook(factory: AuditingFactory, args: Vec<Value>) -> Hook {
    let args = compact_args(args);
    Arc::new(move |ctx: &mut RequestContext| {
        let adapter = factory(&*ctx, args.as_slice());
        ctx.set_auditing_adapter(adapter);
    })
}
