use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::IndexError;

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    /// Chunk of a filing document.
    Narrative,
    /// Narrated lines of one statement period.
    NarratedNumeric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub ticker: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub data_category: DataCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiscal_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    /// Vector-store partition; always the entity key.
    pub namespace: String,
    pub vector: Vec<f32>,
    pub metadata: EntryMetadata,
}

// ---------------------------------------------------------------------------
// VectorStore trait
// ---------------------------------------------------------------------------

/// Namespaced, id-keyed vector storage with overwrite-on-upsert.
pub trait VectorStore: Send + Sync {
    /// Insert or replace entries by id. Returns the number written.
    fn upsert(&self, namespace: &str, entries: Vec<IndexEntry>) -> Result<usize, IndexError>;

    /// All ids in `namespace`, sorted. Empty for an unknown namespace.
    fn ids(&self, namespace: &str) -> Result<Vec<String>, IndexError>;

    fn count(&self, namespace: &str) -> Result<usize, IndexError> {
        Ok(self.ids(namespace)?.len())
    }
}

fn check_namespace(entries: &[IndexEntry], namespace: &str) -> Result<(), IndexError> {
    match entries.iter().find(|e| e.namespace != namespace) {
        Some(e) => Err(IndexError::Store(format!(
            "entry {} has namespace {} but was upserted into {namespace}",
            e.id, e.namespace
        ))),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    namespaces: Mutex<BTreeMap<String, BTreeMap<String, IndexEntry>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, namespace: &str, id: &str) -> Option<IndexEntry> {
        self.namespaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .and_then(|ns| ns.get(id))
            .cloned()
    }

    /// Every entry in `namespace`, ordered by id.
    pub fn entries(&self, namespace: &str) -> Vec<IndexEntry> {
        self.namespaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .map(|ns| ns.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl VectorStore for InMemoryVectorStore {
    fn upsert(&self, namespace: &str, entries: Vec<IndexEntry>) -> Result<usize, IndexError> {
        check_namespace(&entries, namespace)?;
        let n = entries.len();
        let mut map = self.namespaces.lock().unwrap_or_else(PoisonError::into_inner);
        let ns = map.entry(namespace.to_string()).or_default();
        for e in entries {
            ns.insert(e.id.clone(), e);
        }
        Ok(n)
    }

    fn ids(&self, namespace: &str) -> Result<Vec<String>, IndexError> {
        Ok(self
            .namespaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .map(|ns| ns.keys().cloned().collect())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// One pretty-printed JSON file per namespace: `<root>/<namespace>.json`,
/// an object keyed by entry id.
///
/// Writes are serialized within the process and replace the file atomically.
#[derive(Debug)]
pub struct JsonFileVectorStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileVectorStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.root.join(format!("{namespace}.json"))
    }

    /// Load a namespace; a missing file is an empty namespace.
    pub fn load(&self, namespace: &str) -> Result<BTreeMap<String, IndexEntry>, IndexError> {
        let path = self.path_for(namespace);
        let raw = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(IndexError::Io { path, source: e }),
        };
        serde_json::from_slice(&raw)
            .map_err(|e| IndexError::Store(format!("corrupt index file {}: {e}", path.display())))
    }

    fn save(&self, namespace: &str, map: &BTreeMap<String, IndexEntry>) -> anyhow::Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create index dir failed: {}", self.root.display()))?;
        let path = self.path_for(namespace);
        let tmp = self
            .root
            .join(format!(".{namespace}.json.tmp-{}", std::process::id()));
        let body = serde_json::to_vec_pretty(map).context("serialize index failed")?;
        fs::write(&tmp, body).with_context(|| format!("write failed: {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("rename failed: {}", path.display()))?;
        Ok(())
    }
}

impl VectorStore for JsonFileVectorStore {
    fn upsert(&self, namespace: &str, entries: Vec<IndexEntry>) -> Result<usize, IndexError> {
        check_namespace(&entries, namespace)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut map = self.load(namespace)?;
        let n = entries.len();
        for e in entries {
            map.insert(e.id.clone(), e);
        }
        self.save(namespace, &map)
            .map_err(|e| IndexError::Store(format!("{e:#}")))?;
        Ok(n)
    }

    fn ids(&self, namespace: &str) -> Result<Vec<String>, IndexError> {
        Ok(self.load(namespace)?.into_keys().collect())
    }
}
