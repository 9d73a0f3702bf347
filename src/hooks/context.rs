//! Request-scoped context for hooks and visibility checks.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::hooks::adapters::{AuditingAdapter, AuthorizationAdapter};
use crate::model::abstract_model::AbstractModel;

/// The execution context hooks run in (one per request).
///
/// Adapter-backed hooks leave the adapter instance they build here so later
/// checks in the same request can use it.
#[derive(Clone, Default)]
pub struct RequestContext {
    attributes: Map<String, Value>,
    current_user: Option<Value>,
    authorization_adapter: Option<Arc<dyn AuthorizationAdapter>>,
    auditing_adapter: Option<Arc<dyn AuditingAdapter>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn current_user(&self) -> Option<&Value> {
        self.current_user.as_ref()
    }

    pub fn set_current_user(&mut self, user: Option<Value>) {
        self.current_user = user;
    }

    pub fn authorization_adapter(&self) -> Option<&Arc<dyn AuthorizationAdapter>> {
        self.authorization_adapter.as_ref()
    }

    pub fn set_authorization_adapter(&mut self, adapter: Arc<dyn AuthorizationAdapter>) {
        self.authorization_adapter = Some(adapter);
    }

    pub fn auditing_adapter(&self) -> Option<&Arc<dyn AuditingAdapter>> {
        self.auditing_adapter.as_ref()
    }

    pub fn set_auditing_adapter(&mut self, adapter: Arc<dyn AuditingAdapter>) {
        self.auditing_adapter = Some(adapter);
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("attributes", &self.attributes)
            .field("current_user", &self.current_user)
            .field("authorization_adapter", &self.authorization_adapter.is_some())
            .field("auditing_adapter", &self.auditing_adapter.is_some())
            .finish()
    }
}

/// Per-request values merged into visibility and authorization evaluation.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    controller: Option<Arc<RequestContext>>,
    abstract_model: Option<Arc<AbstractModel>>,
    object: Option<Value>,
    values: Map<String, Value>,
}

impl Bindings {
    pub fn new(controller: Arc<RequestContext>) -> Self {
        Self {
            controller: Some(controller),
            ..Self::default()
        }
    }

    pub fn controller(&self) -> Option<&Arc<RequestContext>> {
        self.controller.as_ref()
    }

    pub fn abstract_model(&self) -> Option<&Arc<AbstractModel>> {
        self.abstract_model.as_ref()
    }

    pub fn object(&self) -> Option<&Value> {
        self.object.as_ref()
    }

    pub fn with_object(mut self, object: impl Into<Value>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// A copy of these bindings scoped to one model.
    pub fn merge_abstract_model(&self, model: Arc<AbstractModel>) -> Self {
        Self {
            abstract_model: Some(model),
            ..self.clone()
        }
    }

    /// Ask the request's authorization adapter about `action`.
    ///
    /// `None` when no adapter is wired or the adapter has no opinion.
    pub fn authorized(&self, action: &str) -> Option<bool> {
        self.controller
            .as_ref()
            .and_then(|controller| controller.authorization_adapter())
            .and_then(|adapter| adapter.authorized(action, self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnlyIndex;

    impl AuthorizationAdapter for OnlyIndex {
        fn authorized(&self, action: &str, _bindings: &Bindings) -> Option<bool> {
            match action {
                "index" => Some(true),
                "destroy" => Some(false),
                _ => None,
            }
        }
    }

    #[test]
    fn test_authorized_without_adapter_is_undecided() {
        let bindings = Bindings::new(Arc::new(RequestContext::new()));
        assert_eq!(bindings.authorized("index"), None);
        assert_eq!(Bindings::default().authorized("index"), None);
    }

    #[test]
    fn test_authorized_consults_adapter() {
        let mut ctx = RequestContext::new();
        ctx.set_authorization_adapter(Arc::new(OnlyIndex));
        let bindings = Bindings::new(Arc::new(ctx));
        assert_eq!(bindings.authorized("index"), Some(true));
        assert_eq!(bindings.authorized("destroy"), Some(false));
        assert_eq!(bindings.authorized("export"), None);
    }

    #[test]
    fn test_merge_abstract_model_keeps_other_values() {
        let bindings = Bindings::default().with_value("role", "admin").with_object(7);
        let merged = bindings.merge_abstract_model(Arc::new(AbstractModel::new("Team")));
        assert_eq!(merged.value("role"), Some(&Value::from("admin")));
        assert_eq!(merged.object(), Some(&Value::from(7)));
        assert_eq!(merged.abstract_model().map(|m| m.key().as_str()), Some("Team"));
        assert!(bindings.abstract_model().is_none());
    }
}
