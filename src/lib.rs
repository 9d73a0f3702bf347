//! Admin Interface Configuration Core
//!
//! Process-wide configuration for an admin interface: scalar settings,
//! one configuration object per host model, model discovery, pluggable
//! request hooks, and the navigation list a request may see.

pub mod config;
pub mod error;
pub mod hooks;
pub mod model;
pub mod navigation;
pub mod observability;

pub use config::{configure, global, GlobalConfig, Settings};
pub use error::{ConfigError, Result};
pub use hooks::context::{Bindings, RequestContext};
pub use model::{AbstractModel, BoundModel, Model, ModelConfig, ModelKey, ModelRef};
