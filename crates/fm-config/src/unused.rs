use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;

use crate::LoadedConfig;

/// JSON pointers read by [`Settings::from_config_json`](crate::Settings::from_config_json).
/// Everything below a listed pointer counts as consumed.
pub const CONSUMED_POINTERS: &[&str] = &[
    "/paths/data_dir",
    "/paths/staging_dir",
    "/paths/index_dir",
    "/freshness",
    "/indexing/batch_size",
    "/indexing/chunk_size",
    "/indexing/chunk_overlap",
    "/indexing/max_chunks_per_doc",
    "/indexing/min_text_chars",
    "/indexing/embedding_dim",
    "/registry/entities",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

/// A configured value nothing reads, with the layer that set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedKey {
    pub pointer: String,
    pub layer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UnusedKeyReport {
    /// Sorted by pointer.
    pub unused: Vec<UnusedKey>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused.is_empty()
    }

    pub fn pointers(&self) -> Vec<&str> {
        self.unused.iter().map(|u| u.pointer.as_str()).collect()
    }
}

/// Find leaves outside [`CONSUMED_POINTERS`]. `Fail` turns a non-empty
/// report into an error naming each key and its layer.
pub fn report_unused_keys(loaded: &LoadedConfig, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let mut pointers = Vec::new();
    let mut ptr = String::new();
    walk(&loaded.config_json, &mut ptr, &mut pointers);
    pointers.sort();

    let report = UnusedKeyReport {
        unused: pointers
            .into_iter()
            .map(|pointer| UnusedKey {
                layer: loaded.origin(&pointer).map(str::to_string),
                pointer,
            })
            .collect(),
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        let listed: Vec<String> = report
            .unused
            .iter()
            .map(|u| match &u.layer {
                Some(l) => format!("{} (from {l})", u.pointer),
                None => u.pointer.clone(),
            })
            .collect();
        bail!(
            "CONFIG_UNUSED_KEYS: nothing reads {}",
            listed.join(", ")
        );
    }
    Ok(report)
}

/// Depth-first; a consumed pointer prunes its whole subtree.
fn walk(v: &Value, ptr: &mut String, out: &mut Vec<String>) {
    if CONSUMED_POINTERS.contains(&ptr.as_str()) {
        return;
    }
    let len = ptr.len();
    match v {
        Value::Object(map) => {
            for (k, child) in map {
                ptr.push('/');
                ptr.push_str(&k.replace('~', "~0").replace('/', "~1"));
                walk(child, ptr, out);
                ptr.truncate(len);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                ptr.push_str(&format!("/{i}"));
                walk(child, ptr, out);
                ptr.truncate(len);
            }
        }
        _ if ptr.is_empty() => out.push("/".to_string()),
        _ => out.push(ptr.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_layered_yaml_from_strings;

    #[test]
    fn consumed_pointer_respects_segment_boundary() {
        let loaded =
            load_layered_yaml_from_strings(&["paths:\n  data_dir: a\n  data_dirs: b\n"]).unwrap();
        let report = report_unused_keys(&loaded, UnusedKeyPolicy::Warn).unwrap();
        assert_eq!(report.pointers(), vec!["/paths/data_dirs"]);
    }

    #[test]
    fn empty_mapping_has_no_leaves() {
        let loaded = load_layered_yaml_from_strings(&["{}"]).unwrap();
        assert!(report_unused_keys(&loaded, UnusedKeyPolicy::Fail).unwrap().is_clean());
    }
}
