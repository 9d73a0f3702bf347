//! Initializer loading from disk.
//!
//! An [`Initializer`] is whatever rebuilds the configuration on boot and on
//! `reload`: a Rust closure, a parsed [`InitializerFile`], or a
//! [`FileInitializer`] that re-reads its TOML file every run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{InitializerFile, ModelSection, SearchOperator};
use crate::config::validation::validate_initializer;
use crate::config::GlobalConfig;
use crate::error::{ConfigError, Result};
use crate::hooks::adapters::AdapterRegistries;
use crate::model::config::ModelConfig;

/// External source of configuration, re-run on every reload.
pub trait Initializer: Send + Sync {
    fn run(&self, config: &mut GlobalConfig) -> Result<()>;
}

impl<F> Initializer for F
where
    F: Fn(&mut GlobalConfig) -> Result<()> + Send + Sync,
{
    fn run(&self, config: &mut GlobalConfig) -> Result<()> {
        self(config)
    }
}

/// Load and validate an initializer from a TOML file.
pub fn load_initializer(path: &Path) -> Result<InitializerFile> {
    let content = fs::read_to_string(path)?;
    let file: InitializerFile = toml::from_str(&content)?;

    validate_initializer(&file).map_err(ConfigError::Validation)?;

    Ok(file)
}

impl Initializer for InitializerFile {
    /// Settings and hooks apply now; model sections go through `apply`.
    ///
    /// The search operator and every adapter name are checked before
    /// anything is written, so a failing file leaves the settings untouched.
    fn run(&self, config: &mut GlobalConfig) -> Result<()> {
        let search_operator = self
            .default_search_operator
            .as_deref()
            .map(str::parse::<SearchOperator>)
            .transpose()?;
        self.check_adapters(config.adapters())?;

        let settings = config.settings_mut();
        if let Some(op) = search_operator {
            settings.default_search_operator = op;
        }
        if let Some(v) = &self.label_methods {
            settings.label_methods = v.clone();
        }
        if let Some(v) = self.default_items_per_page {
            settings.default_items_per_page = v;
        }
        if let Some(v) = self.default_associated_collection_limit {
            settings.default_associated_collection_limit = v;
        }
        if let Some(v) = &self.default_hidden_fields {
            settings.default_hidden_fields = v.clone();
        }
        if let Some(v) = &self.excluded_models {
            settings.excluded_models = v.clone();
        }
        if let Some(v) = &self.included_models {
            settings.included_models = v.clone();
        }
        if let Some(v) = &self.navigation_static_links {
            settings.navigation_static_links = v.clone();
        }
        if let Some(v) = &self.navigation_static_label {
            settings.navigation_static_label = Some(v.clone());
        }
        if let Some(v) = self.compact_show_view {
            settings.compact_show_view = v;
        }
        if let Some(v) = self.browser_validations {
            settings.browser_validations = v;
        }
        if let Some(v) = self.yell_for_non_accessible_fields {
            settings.yell_for_non_accessible_fields = v;
        }
        if let Some(v) = self.total_columns_width {
            settings.total_columns_width = v;
        }

        if let Some(spec) = &self.hooks.authorize_with {
            config.authorize_with_adapter(&spec.adapter, spec.args.clone())?;
        }
        if let Some(spec) = &self.hooks.audit_with {
            config.audit_with_adapter(&spec.adapter, spec.args.clone())?;
        }

        for (adapter, options) in &self.configure {
            config.configure_with(adapter, |extension| {
                for (name, value) in options {
                    extension.set_option(name, value.clone())?;
                }
                Ok(())
            })?;
        }

        for (name, section) in &self.models {
            let name = name.clone();
            let section = section.clone();
            config.apply(move |config| {
                config.model_with(name.as_str(), |model| apply_model_section(model, &section));
            });
        }

        tracing::debug!(
            models = self.models.len(),
            extensions = self.configure.len(),
            "Initializer file applied"
        );
        Ok(())
    }
}

impl InitializerFile {
    fn check_adapters(&self, adapters: &AdapterRegistries) -> Result<()> {
        if let Some(spec) = &self.hooks.authorize_with {
            adapters.authorization.ensure_registered(&spec.adapter)?;
        }
        if let Some(spec) = &self.hooks.audit_with {
            adapters.auditing.ensure_registered(&spec.adapter)?;
        }
        for adapter in self.configure.keys() {
            adapters.configuration.ensure_registered(adapter)?;
        }
        Ok(())
    }
}

fn apply_model_section(model: &ModelConfig, section: &ModelSection) {
    if let Some(weight) = section.weight {
        model.set_weight(weight);
    }
    if let Some(label) = &section.label {
        model.set_label(label.clone());
    }
    if let Some(label) = &section.label_plural {
        model.set_label_plural(label.clone());
    }
    if let Some(label) = &section.navigation_label {
        model.set_navigation_label(label.clone());
    }
    if let Some(icon) = &section.navigation_icon {
        model.set_navigation_icon(icon.clone());
    }
    if let Some(method) = &section.object_label_method {
        model.set_object_label_method(method.clone());
    }
    if let Some(visible) = section.visible {
        model.set_visible(visible);
    }
    if let Some(parent) = &section.parent {
        model.set_parent(parent.as_str());
    }
}

/// Initializer backed by a TOML file, read fresh on every run.
#[derive(Debug, Clone)]
pub struct FileInitializer {
    path: PathBuf,
}

impl FileInitializer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Initializer for FileInitializer {
    fn run(&self, config: &mut GlobalConfig) -> Result<()> {
        tracing::info!(path = %self.path.display(), "Running initializer file");
        load_initializer(&self.path)?.run(config)
    }
}
