//! Model discovery.
//!
//! # Responsibilities
//! - Produce the candidate pool of model names (allowlist or source scan)
//! - Subtract the exclusion list, dedupe and sort
//!
//! # Scan
//! ```text
//! <root>/<load_path>/blog/blog_post.rs
//!     → blog/blog_post        (strip root prefix and extension)
//!     → Blog::BlogPost        (separators → `::`, segments camelized)
//! ```
//! Names under the `Concerns` namespace are discarded.
//!
//! # Design Decisions
//! - The scan result is memoized; the memo is filled at most once until
//!   `invalidate` and is guarded by a mutex so concurrent first calls scan once
//! - A failed scan is returned to the caller and is not memoized

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use heck::ToUpperCamelCase;
use parking_lot::Mutex;
use thiserror::Error;
use walkdir::WalkDir;

use crate::model::key::ModelKey;
use crate::observability::metrics;

/// Namespace whose members are shared mixins, not models.
const RESERVED_NAMESPACE: &str = "Concerns::";

/// Default model directory relative to an application root.
pub const DEFAULT_LOAD_PATH: &str = "src/models";

/// Default extension of model source files.
pub const DEFAULT_EXTENSION: &str = "rs";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to scan {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// One application (host or sub-application) whose model sources are scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
    root: PathBuf,
    load_paths: Vec<PathBuf>,
}

impl ModelSource {
    /// A source rooted at `root` with the default load path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            load_paths: vec![PathBuf::from(DEFAULT_LOAD_PATH)],
        }
    }

    /// Replace the load paths (relative to the root).
    pub fn with_load_paths<I, P>(mut self, load_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.load_paths = load_paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute model directories of this source.
    pub fn directories(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.load_paths.iter().map(|p| self.root.join(p))
    }
}

#[derive(Debug)]
pub struct ModelDiscovery {
    sources: Vec<ModelSource>,
    extension: String,
    scanned: Mutex<Option<Arc<[String]>>>,
}

impl Default for ModelDiscovery {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ModelDiscovery {
    pub fn new(sources: Vec<ModelSource>) -> Self {
        Self {
            sources,
            extension: DEFAULT_EXTENSION.to_string(),
            scanned: Mutex::new(None),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn add_source(&mut self, source: ModelSource) {
        self.sources.push(source);
        self.invalidate();
    }

    pub fn sources(&self) -> &[ModelSource] {
        &self.sources
    }

    /// Forget the memoized scan.
    pub fn invalidate(&self) {
        *self.scanned.lock() = None;
    }

    /// Candidate keys: the allowlist when non-empty, otherwise the scan.
    pub fn candidate_pool(&self, included: &[String]) -> Result<BTreeSet<ModelKey>, DiscoveryError> {
        if !included.is_empty() {
            return Ok(included.iter().map(ModelKey::new).collect());
        }
        Ok(self.scanned()?.iter().map(ModelKey::new).collect())
    }

    /// Candidates minus `excluded`, deduplicated by canonical key, ascending.
    pub fn effective_pool(
        &self,
        included: &[String],
        excluded: &[String],
    ) -> Result<Vec<String>, DiscoveryError> {
        let excluded: BTreeSet<ModelKey> = excluded.iter().map(ModelKey::new).collect();
        Ok(self
            .candidate_pool(included)?
            .difference(&excluded)
            .map(|key| key.as_str().to_string())
            .collect())
    }

    fn scanned(&self) -> Result<Arc<[String]>, DiscoveryError> {
        let mut memo = self.scanned.lock();
        if let Some(names) = memo.as_ref() {
            return Ok(names.clone());
        }
        let names: Arc<[String]> = self.scan()?.into();
        metrics::record_discovered_models(names.len());
        *memo = Some(names.clone());
        Ok(names)
    }

    fn scan(&self) -> Result<Vec<String>, DiscoveryError> {
        let mut names = Vec::new();
        for dir in self.sources.iter().flat_map(ModelSource::directories) {
            if !dir.is_dir() {
                tracing::debug!(path = %dir.display(), "Model directory missing, skipping");
                continue;
            }
            for entry in WalkDir::new(&dir).follow_links(true).sort_by_file_name() {
                let entry = entry.map_err(|source| DiscoveryError::Walk {
                    root: dir.clone(),
                    source,
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&dir) else {
                    continue;
                };
                match model_name_from_path(relative) {
                    Some(name) if !name.starts_with(RESERVED_NAMESPACE) => names.push(name),
                    _ => {}
                }
            }
        }
        tracing::info!(count = names.len(), sources = self.sources.len(), "Model sources scanned");
        Ok(names)
    }
}

/// `blog/blog_post.rs` → `Blog::BlogPost`. `None` for paths with no usable segment.
pub fn model_name_from_path(relative: &Path) -> Option<String> {
    let stem = relative.with_extension("");
    let segments: Vec<String> = stem
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str().map(camelize),
            _ => None,
        })
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("::"))
    }
}

/// `blog_post` → `BlogPost`.
pub fn camelize(segment: &str) -> String {
    segment.to_upper_camel_case()
}
