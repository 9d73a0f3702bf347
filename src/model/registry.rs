//! Lazily populated cache of model configurations.
//!
//! # Responsibilities
//! - Hand out exactly one `ModelConfig` per canonical key
//! - Apply customization blocks to existing entries, repeatedly
//! - Enumerate configurations for the whole live model pool
//!
//! # Design Decisions
//! - Entries are `Arc`s so callers share identity with the registry
//! - The map shard lock is released before a customization block runs;
//!   blocks may look up other models (or the same one) re-entrantly

use std::sync::Arc;

use dashmap::DashMap;

use crate::model::abstract_model::{AbstractModel, ModelCatalog};
use crate::model::config::ModelConfig;
use crate::model::key::ModelKey;
use crate::observability::metrics;

#[derive(Debug, Default)]
pub struct ModelConfigRegistry {
    entries: DashMap<ModelKey, Arc<ModelConfig>>,
}

impl ModelConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry for `key`, creating it bound to `abstract_model` if absent.
    pub fn fetch_or_create(
        &self,
        key: ModelKey,
        abstract_model: Option<Arc<AbstractModel>>,
    ) -> Arc<ModelConfig> {
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| {
                tracing::debug!(model = %key, resolved = abstract_model.is_some(), "Creating model configuration");
                Arc::new(ModelConfig::new(key, abstract_model))
            })
            .value()
            .clone();
        metrics::record_registry_size(self.entries.len());
        entry
    }

    /// Like [`fetch_or_create`](Self::fetch_or_create), then customize the entry.
    ///
    /// The block only runs when the entry is bound to a real model.
    pub fn fetch_or_create_with<F>(
        &self,
        key: ModelKey,
        abstract_model: Option<Arc<AbstractModel>>,
        customize: F,
    ) -> Arc<ModelConfig>
    where
        F: FnOnce(&ModelConfig),
    {
        let entry = self.fetch_or_create(key, abstract_model);
        if entry.abstract_model().is_some() {
            customize(&entry);
        } else {
            tracing::debug!(model = %entry.key(), "Skipping customization of unresolved model");
        }
        entry
    }

    pub fn get(&self, key: &ModelKey) -> Option<Arc<ModelConfig>> {
        self.entries.get(key).map(|r| r.value().clone())
    }

    /// Drop the entry for one key.
    pub fn reset(&self, key: &ModelKey) -> Option<Arc<ModelConfig>> {
        let removed = self.entries.remove(key).map(|(_, config)| config);
        metrics::record_registry_size(self.entries.len());
        removed
    }

    pub fn reset_all(&self) {
        self.entries.clear();
        metrics::record_registry_size(0);
    }

    /// Configurations for every model in `pool` that the catalog knows.
    ///
    /// Creates entries on demand, so the result covers the live pool and
    /// not only previously touched keys. Order follows `pool`.
    pub fn all(&self, pool: &[String], catalog: &ModelCatalog) -> Vec<Arc<ModelConfig>> {
        pool.iter()
            .filter_map(|name| {
                let key = ModelKey::new(name);
                match catalog.get(&key) {
                    Some(model) => Some(self.fetch_or_create(key, Some(model))),
                    None => {
                        tracing::debug!(model = %name, "Discovered name is not a known model, skipping");
                        None
                    }
                }
            })
            .collect()
    }

    /// Currently registered keys, ascending.
    pub fn keys(&self) -> Vec<ModelKey> {
        let mut keys: Vec<ModelKey> = self.entries.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
