//! Initializer validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate option values (search operator, page sizes)
//! - Reject blank model and adapter names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: InitializerFile → Result<(), Vec<ValidationError>>
//! - Adapter names are checked against registries when the file is applied,
//!   not here, since registries belong to the running process

use thiserror::Error;

use crate::config::schema::{AdapterSpec, InitializerFile, SearchOperator};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("search operator '{0}' not supported")]
    UnsupportedSearchOperator(String),

    #[error("default_items_per_page must be greater than 0")]
    ZeroItemsPerPage,

    #[error("default_associated_collection_limit must be greater than 0")]
    ZeroAssociatedCollectionLimit,

    #[error("empty model name in {section}")]
    EmptyModelName { section: &'static str },

    #[error("empty label method")]
    EmptyLabelMethod,

    #[error("empty adapter name for {hook}")]
    EmptyAdapterName { hook: &'static str },

    #[error("navigation link '{0}' has an empty url")]
    EmptyLinkUrl(String),
}

pub fn validate_initializer(file: &InitializerFile) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(op) = &file.default_search_operator {
        if op.parse::<SearchOperator>().is_err() {
            errors.push(ValidationError::UnsupportedSearchOperator(op.clone()));
        }
    }

    if file.default_items_per_page == Some(0) {
        errors.push(ValidationError::ZeroItemsPerPage);
    }
    if file.default_associated_collection_limit == Some(0) {
        errors.push(ValidationError::ZeroAssociatedCollectionLimit);
    }

    let name_lists = [
        ("included_models", &file.included_models),
        ("excluded_models", &file.excluded_models),
    ];
    for (section, names) in name_lists {
        if names.iter().flatten().any(|n| n.trim().is_empty()) {
            errors.push(ValidationError::EmptyModelName { section });
        }
    }
    if file.models.keys().any(|n| n.trim().is_empty()) {
        errors.push(ValidationError::EmptyModelName { section: "models" });
    }

    if file.label_methods.iter().flatten().any(|m| m.trim().is_empty()) {
        errors.push(ValidationError::EmptyLabelMethod);
    }

    let adapters: [(&'static str, &Option<AdapterSpec>); 2] = [
        ("authorize_with", &file.hooks.authorize_with),
        ("audit_with", &file.hooks.audit_with),
    ];
    for (hook, spec) in adapters {
        if spec.as_ref().is_some_and(|s| s.adapter.trim().is_empty()) {
            errors.push(ValidationError::EmptyAdapterName { hook });
        }
    }
    if file.configure.keys().any(|n| n.trim().is_empty()) {
        errors.push(ValidationError::EmptyAdapterName { hook: "configure" });
    }

    for link in file.navigation_static_links.iter().flatten() {
        if link.url.trim().is_empty() {
            errors.push(ValidationError::EmptyLinkUrl(link.label.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ModelSection, NavigationLink};

    #[test]
    fn test_empty_file_is_valid() {
        assert!(validate_initializer(&InitializerFile::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut file = InitializerFile {
            default_search_operator: Some("bogus".into()),
            default_items_per_page: Some(0),
            excluded_models: Some(vec![" ".into()]),
            navigation_static_links: Some(vec![NavigationLink {
                label: "Docs".into(),
                url: String::new(),
            }]),
            ..InitializerFile::default()
        };
        file.models.insert(String::new(), ModelSection::default());
        file.hooks.authorize_with = Some(AdapterSpec {
            adapter: String::new(),
            args: Vec::new(),
        });

        let errors = validate_initializer(&file).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::UnsupportedSearchOperator("bogus".into())));
        assert!(errors.contains(&ValidationError::ZeroItemsPerPage));
        assert!(errors.contains(&ValidationError::EmptyModelName { section: "excluded_models" }));
        assert!(errors.contains(&ValidationError::EmptyModelName { section: "models" }));
        assert!(errors.contains(&ValidationError::EmptyAdapterName { hook: "authorize_with" }));
        assert!(errors.contains(&ValidationError::EmptyLinkUrl("Docs".into())));
    }

    #[test]
    fn test_valid_operator_passes() {
        let file = InitializerFile {
            default_search_operator: Some("=".into()),
            ..InitializerFile::default()
        };
        assert!(validate_initializer(&file).is_ok());
    }
}
