//! Error types for the configuration core.

use thiserror::Error;

use crate::config::validation::ValidationError;
use crate::hooks::adapters::AdapterKind;
use crate::model::discovery::DiscoveryError;

/// Errors raised while configuring or booting the admin configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An option was assigned a value outside its allowed set.
    #[error("invalid value '{value}' for option '{option}': {reason}")]
    InvalidOption {
        option: &'static str,
        value: String,
        reason: String,
    },

    /// No adapter with the given name is registered for this hook kind.
    #[error("unknown {kind} adapter '{name}'")]
    UnknownAdapter { kind: AdapterKind, name: String },

    /// Scanning the model sources failed.
    #[error("model discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Reading the initializer file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The initializer file is not valid TOML for the expected schema.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The initializer file parsed but failed semantic checks.
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
