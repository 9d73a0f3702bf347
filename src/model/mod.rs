//! Model subsystem.
//!
//! # Data Flow
//! ```text
//! discovery.rs (candidate names: allowlist or source scan)
//!     → abstract_model.rs (catalog: which names are real models)
//!     → key.rs (canonical key for any reference form)
//!     → registry.rs (one shared ModelConfig per key, created on demand)
//! ```

pub mod abstract_model;
pub mod config;
pub mod discovery;
pub mod key;
pub mod registry;

pub use abstract_model::{AbstractModel, ModelCatalog};
pub use config::{BoundModel, ModelConfig, Visibility};
pub use discovery::{DiscoveryError, ModelDiscovery, ModelSource};
pub use key::{resolve, Entity, Model, ModelKey, ModelRef, TypeHandle};
pub use registry::ModelConfigRegistry;
