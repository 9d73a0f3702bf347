//! Configuration schema definitions.
//!
//! `Settings` holds the scalar options of the running configuration.
//! `InitializerFile` is the on-disk TOML form of an initializer; every field
//! is optional so a file only states what it changes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Operator applied to search queries when a field does not choose one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOperator {
    #[default]
    Default,
    Like,
    NotLike,
    StartsWith,
    EndsWith,
    Is,
    #[serde(rename = "=")]
    Equals,
}

impl SearchOperator {
    pub const ALL: [SearchOperator; 7] = [
        SearchOperator::Default,
        SearchOperator::Like,
        SearchOperator::NotLike,
        SearchOperator::StartsWith,
        SearchOperator::EndsWith,
        SearchOperator::Is,
        SearchOperator::Equals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOperator::Default => "default",
            SearchOperator::Like => "like",
            SearchOperator::NotLike => "not_like",
            SearchOperator::StartsWith => "starts_with",
            SearchOperator::EndsWith => "ends_with",
            SearchOperator::Is => "is",
            SearchOperator::Equals => "=",
        }
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchOperator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidOption {
                option: "default_search_operator",
                value: s.to_string(),
                reason: format!("search operator '{s}' not supported"),
            })
    }
}

/// View context a hidden-field list applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenFieldContext {
    Base,
    Edit,
    Show,
}

/// A static link shown in navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationLink {
    pub label: String,
    pub url: String,
}

/// Scalar settings of the admin configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Attribute names tried, in order, for a record's display label.
    pub label_methods: Vec<String>,

    pub default_items_per_page: usize,

    /// Maximum records offered in association selects.
    pub default_associated_collection_limit: usize,

    pub default_search_operator: SearchOperator,

    /// Fields hidden by default, per view context.
    pub default_hidden_fields: BTreeMap<HiddenFieldContext, Vec<String>>,

    pub excluded_models: Vec<String>,

    /// Allowlist; when non-empty it replaces discovery.
    pub included_models: Vec<String>,

    pub navigation_static_links: Vec<NavigationLink>,

    pub navigation_static_label: Option<String>,

    pub compact_show_view: bool,

    pub browser_validations: bool,

    pub yell_for_non_accessible_fields: bool,

    pub total_columns_width: u32,
}

impl Default for Settings {
    fn default() -> Self {
        let timestamps: Vec<String> = [
            "id",
            "_id",
            "created_at",
            "created_on",
            "deleted_at",
            "updated_at",
            "updated_on",
            "deleted_on",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        let mut default_hidden_fields = BTreeMap::new();
        default_hidden_fields.insert(HiddenFieldContext::Base, vec!["_type".to_string()]);
        default_hidden_fields.insert(HiddenFieldContext::Edit, timestamps.clone());
        default_hidden_fields.insert(HiddenFieldContext::Show, timestamps);

        Self {
            label_methods: vec!["name".to_string(), "title".to_string()],
            default_items_per_page: 20,
            default_associated_collection_limit: 100,
            default_search_operator: SearchOperator::Default,
            default_hidden_fields,
            excluded_models: Vec::new(),
            included_models: Vec::new(),
            navigation_static_links: Vec::new(),
            navigation_static_label: None,
            compact_show_view: true,
            browser_validations: true,
            yell_for_non_accessible_fields: true,
            total_columns_width: 697,
        }
    }
}

/// Adapter-backed hook declaration: `{ adapter = "name", args = [...] }`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdapterSpec {
    pub adapter: String,

    #[serde(default)]
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HooksSection {
    pub authorize_with: Option<AdapterSpec>,
    pub audit_with: Option<AdapterSpec>,
}

/// Per-model customization in an initializer file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSection {
    pub weight: Option<i32>,
    pub label: Option<String>,
    pub label_plural: Option<String>,
    pub navigation_label: Option<String>,
    pub navigation_icon: Option<String>,
    pub object_label_method: Option<String>,
    pub visible: Option<bool>,
    pub parent: Option<String>,
}

/// Root of an initializer file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitializerFile {
    pub label_methods: Option<Vec<String>>,
    pub default_items_per_page: Option<usize>,
    pub default_associated_collection_limit: Option<usize>,

    /// Kept as text so validation can report bad values with the rest.
    pub default_search_operator: Option<String>,

    pub default_hidden_fields: Option<BTreeMap<HiddenFieldContext, Vec<String>>>,
    pub excluded_models: Option<Vec<String>>,
    pub included_models: Option<Vec<String>>,
    pub navigation_static_links: Option<Vec<NavigationLink>>,
    pub navigation_static_label: Option<String>,
    pub compact_show_view: Option<bool>,
    pub browser_validations: Option<bool>,
    pub yell_for_non_accessible_fields: Option<bool>,
    pub total_columns_width: Option<u32>,

    pub hooks: HooksSection,

    /// `[configure.<adapter>]` option tables.
    pub configure: BTreeMap<String, serde_json::Map<String, Value>>,

    /// `[models."<Name>"]` tables.
    pub models: BTreeMap<String, ModelSection>,
}
