//! Metrics collection.
//!
//! # Metrics
//! - `admin_config_reloads_total` (counter): reloads by outcome (`ok`, `error`)
//! - `admin_config_registry_models` (gauge): model configurations in the registry
//! - `admin_config_discovered_models` (gauge): names found by the last source scan
//! - `admin_config_visible_models` (gauge): size of the last navigation list

pub fn record_reload(outcome: &'static str) {
    ::metrics::counter!("admin_config_reloads_total", "outcome" => outcome).increment(1);
}

pub fn record_registry_size(size: usize) {
    ::metrics::gauge!("admin_config_registry_models").set(size as f64);
}

pub fn record_discovered_models(count: usize) {
    ::metrics::gauge!("admin_config_discovered_models").set(count as f64);
}

pub fn record_visible_models(count: usize) {
    ::metrics::gauge!("admin_config_visible_models").set(count as f64);
}
