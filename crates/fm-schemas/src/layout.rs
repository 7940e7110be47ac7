use std::path::{Path, PathBuf};

use crate::{Component, EntityKey};

/// Per-entity disk layout rooted at the data directory.
///
/// ```text
/// <root>/<KEY>/structured/<component>.json
/// <root>/<KEY>/unstructured/data.json
/// <root>/<KEY>/unstructured/raw/*.pdf
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLayout {
    root: PathBuf,
}

impl EntityLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entity_dir(&self, key: &EntityKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    pub fn structured_dir(&self, key: &EntityKey) -> PathBuf {
        self.entity_dir(key).join("structured")
    }

    /// Path of a structured component artifact.
    ///
    /// Callers must only pass structured components; the document component
    /// has its own paths below.
    pub fn structured_artifact(&self, key: &EntityKey, component: Component) -> PathBuf {
        debug_assert!(component.kind().is_structured());
        self.structured_dir(key)
            .join(format!("{}.json", component.as_str()))
    }

    pub fn unstructured_dir(&self, key: &EntityKey) -> PathBuf {
        self.entity_dir(key).join("unstructured")
    }

    pub fn filing_document(&self, key: &EntityKey) -> PathBuf {
        self.unstructured_dir(key).join("data.json")
    }

    pub fn raw_filings_dir(&self, key: &EntityKey) -> PathBuf {
        self.unstructured_dir(key).join("raw")
    }
}
