//! Host model descriptors.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::key::{Model, ModelKey};

/// Describes one host model type as seen by the admin interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractModel {
    key: ModelKey,
    embedded: bool,
    cyclic: bool,
    attributes: Vec<String>,
}

impl AbstractModel {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            key: ModelKey::new(name),
            embedded: false,
            cyclic: false,
            attributes: Vec::new(),
        }
    }

    pub fn of<T: Model>() -> Self {
        Self::new(T::NAME)
    }

    /// Mark the model as living nested inside another model's data.
    pub fn embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }

    /// Mark an embedded model as taking part in a reference cycle.
    pub fn cyclic(mut self, cyclic: bool) -> Self {
        self.cyclic = cyclic;
        self
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn key(&self) -> &ModelKey {
        &self.key
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn responds_to(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}

/// The set of model types the host application actually defines.
///
/// Discovery only yields names; a name becomes a configurable model only
/// when the catalog knows it.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: BTreeMap<ModelKey, Arc<AbstractModel>>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous one with the same key.
    pub fn register(&mut self, model: AbstractModel) -> Arc<AbstractModel> {
        let model = Arc::new(model);
        self.models.insert(model.key().clone(), model.clone());
        model
    }

    pub fn register_type<T: Model>(&mut self) -> Arc<AbstractModel> {
        self.register(AbstractModel::of::<T>())
    }

    pub fn get(&self, key: &ModelKey) -> Option<Arc<AbstractModel>> {
        self.models.get(key).cloned()
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<AbstractModel>> {
        self.get(&ModelKey::new(name))
    }

    /// Registered model names, ascending.
    pub fn names(&self) -> Vec<String> {
        self.models.keys().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
