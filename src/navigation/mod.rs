//! Navigation list resolution.
//!
//! # Responsibilities
//! - Bind every model configuration of the live pool to the request bindings
//! - Keep models that are visible, authorized for `index`, and listable
//! - Order by weight, then label ignoring case
//!
//! # Design Decisions
//! - Fail closed: a missing authorization outcome means not authorized
//! - Embedded models are hidden unless they are cyclic
//! - Results depend on request bindings and are never cached

use std::cmp::Ordering;
use std::sync::Arc;

use crate::hooks::context::Bindings;
use crate::model::config::{BoundModel, ModelConfig};
use crate::observability::metrics;

/// Action checked before a model is listed in navigation.
pub const INDEX_ACTION: &str = "index";

/// Filter `models` down to the navigation list for one request, sorted.
pub fn visible_models(models: &[Arc<ModelConfig>], bindings: &Bindings) -> Vec<BoundModel> {
    let mut visible: Vec<BoundModel> = models
        .iter()
        .map(|model| model.with(bindings.clone()))
        .filter(is_listed)
        .collect();
    visible.sort_by(navigation_order);
    metrics::record_visible_models(visible.len());
    visible
}

fn is_listed(model: &BoundModel) -> bool {
    let Some(abstract_model) = model.abstract_model() else {
        return false;
    };
    if !model.is_visible() {
        return false;
    }
    let scoped = model.bindings().merge_abstract_model(Arc::clone(abstract_model));
    if scoped.authorized(INDEX_ACTION) != Some(true) {
        tracing::trace!(model = %model.key(), "Not authorized for index, hiding from navigation");
        return false;
    }
    !abstract_model.is_embedded() || abstract_model.is_cyclic()
}

/// Ascending weight, then label compared ignoring ASCII case.
pub fn navigation_order(a: &BoundModel, b: &BoundModel) -> Ordering {
    a.weight()
        .cmp(&b.weight())
        .then_with(|| cmp_ignore_case(&a.label(), &b.label()))
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}
