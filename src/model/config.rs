//! Per-model configuration.
//!
//! A `ModelConfig` is shared (`Arc`) between every caller that references
//! the same model key and is customized in place, so its options sit behind
//! a lock. The nested field/action tree is owned by the renderer side and is
//! not modelled here.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use heck::ToSnakeCase;
use parking_lot::RwLock;

use crate::hooks::context::Bindings;
use crate::model::abstract_model::AbstractModel;
use crate::model::key::ModelKey;

/// Label method used when none of the configured label methods apply.
pub const DEFAULT_OBJECT_LABEL_METHOD: &str = "admin_default_label";

pub type VisibilityFn = Arc<dyn Fn(&BoundModel) -> bool + Send + Sync>;

/// Whether a model shows up in navigation.
#[derive(Clone)]
pub enum Visibility {
    Static(bool),
    /// Evaluated against the request bindings.
    Dynamic(VisibilityFn),
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Static(true)
    }
}

impl fmt::Debug for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Static(v) => f.debug_tuple("Static").field(v).finish(),
            Visibility::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ModelOptions {
    weight: i32,
    label: Option<String>,
    label_plural: Option<String>,
    navigation_label: Option<String>,
    navigation_icon: Option<String>,
    object_label_method: Option<String>,
    parent: Option<ModelKey>,
    visible: Visibility,
}

/// Configuration for exactly one model, identified by its canonical key.
#[derive(Debug)]
pub struct ModelConfig {
    key: ModelKey,
    abstract_model: Option<Arc<AbstractModel>>,
    options: RwLock<ModelOptions>,
}

impl ModelConfig {
    pub fn new(key: ModelKey, abstract_model: Option<Arc<AbstractModel>>) -> Self {
        Self {
            key,
            abstract_model,
            options: RwLock::new(ModelOptions::default()),
        }
    }

    pub fn key(&self) -> &ModelKey {
        &self.key
    }

    pub fn abstract_model(&self) -> Option<&Arc<AbstractModel>> {
        self.abstract_model.as_ref()
    }

    /// Navigation ordering key; lower sorts first.
    pub fn weight(&self) -> i32 {
        self.options.read().weight
    }

    pub fn set_weight(&self, weight: i32) {
        self.options.write().weight = weight;
    }

    /// Display label, defaulting to the humanized model name.
    pub fn label(&self) -> String {
        self.options
            .read()
            .label
            .clone()
            .unwrap_or_else(|| humanize(self.key.demodulized()))
    }

    pub fn set_label(&self, label: impl Into<String>) {
        self.options.write().label = Some(label.into());
    }

    pub fn label_plural(&self) -> String {
        let plural = self.options.read().label_plural.clone();
        plural.unwrap_or_else(|| pluralize(&self.label()))
    }

    pub fn set_label_plural(&self, label: impl Into<String>) {
        self.options.write().label_plural = Some(label.into());
    }

    /// Navigation group heading; `None` means the default group.
    pub fn navigation_label(&self) -> Option<String> {
        self.options.read().navigation_label.clone()
    }

    pub fn set_navigation_label(&self, label: impl Into<String>) {
        self.options.write().navigation_label = Some(label.into());
    }

    pub fn navigation_icon(&self) -> Option<String> {
        self.options.read().navigation_icon.clone()
    }

    pub fn set_navigation_icon(&self, icon: impl Into<String>) {
        self.options.write().navigation_icon = Some(icon.into());
    }

    pub fn parent(&self) -> Option<ModelKey> {
        self.options.read().parent.clone()
    }

    pub fn set_parent(&self, parent: impl Into<ModelKey>) {
        self.options.write().parent = Some(parent.into());
    }

    /// Attribute used to label records of this model.
    ///
    /// An explicit choice wins; otherwise the first of `label_methods` the
    /// model has an attribute for, otherwise [`DEFAULT_OBJECT_LABEL_METHOD`].
    pub fn object_label_method(&self, label_methods: &[String]) -> String {
        if let Some(method) = self.options.read().object_label_method.clone() {
            return method;
        }
        self.abstract_model
            .as_ref()
            .and_then(|model| label_methods.iter().find(|m| model.responds_to(m)))
            .cloned()
            .unwrap_or_else(|| DEFAULT_OBJECT_LABEL_METHOD.to_string())
    }

    pub fn set_object_label_method(&self, method: impl Into<String>) {
        self.options.write().object_label_method = Some(method.into());
    }

    pub fn set_visible(&self, visible: bool) {
        self.options.write().visible = Visibility::Static(visible);
    }

    /// Make visibility depend on the request bindings.
    pub fn visible_if<F>(&self, predicate: F)
    where
        F: Fn(&BoundModel) -> bool + Send + Sync + 'static,
    {
        self.options.write().visible = Visibility::Dynamic(Arc::new(predicate));
    }

    pub fn visibility(&self) -> Visibility {
        self.options.read().visible.clone()
    }

    /// Bind this configuration to request-scoped context.
    pub fn with(self: &Arc<Self>, bindings: Bindings) -> BoundModel {
        BoundModel {
            config: Arc::clone(self),
            bindings,
        }
    }
}

/// A model configuration viewed under one request's bindings.
#[derive(Clone)]
pub struct BoundModel {
    config: Arc<ModelConfig>,
    bindings: Bindings,
}

impl BoundModel {
    pub fn config(&self) -> &Arc<ModelConfig> {
        &self.config
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn is_visible(&self) -> bool {
        // Clone out so the predicate may read the config without holding the lock.
        match self.config.visibility() {
            Visibility::Static(visible) => visible,
            Visibility::Dynamic(predicate) => predicate(self),
        }
    }
}

impl Deref for BoundModel {
    type Target = ModelConfig;

    fn deref(&self) -> &ModelConfig {
        &self.config
    }
}

impl fmt::Debug for BoundModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundModel")
            .field("key", self.config.key())
            .finish_non_exhaustive()
    }
}

/// `BlogPost` → `Blog post`, `HTMLParser` → `Html parser`.
pub(crate) fn humanize(name: &str) -> String {
    let words = name.to_snake_case().replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn pluralize(label: &str) -> String {
    let lower = label.to_lowercase();
    if lower.ends_with('s') || lower.ends_with('x') || lower.ends_with("ch") || lower.ends_with("sh") {
        format!("{label}es")
    } else if lower.ends_with('y')
        && !matches!(lower.chars().rev().nth(1), Some('a' | 'e' | 'i' | 'o' | 'u'))
    {
        format!("{}ies", &label[..label.len() - 1])
    } else {
        format!("{label}s")
    }
}
