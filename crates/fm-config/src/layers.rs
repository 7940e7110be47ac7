use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;

use crate::ConfigFingerprint;

/// The merged configuration plus where each value came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_json: Value,
    pub fingerprint: ConfigFingerprint,
    /// Layer labels in merge order: file paths, or `layer[i]` for in-memory docs.
    pub layers: Vec<String>,
    /// Leaf JSON pointer → index into `layers` of the last layer that set it.
    origins: BTreeMap<String, usize>,
}

impl LoadedConfig {
    /// Label of the layer that supplied the value at `pointer`.
    ///
    /// A pointer below a value that was set whole (an array, or a mapping
    /// introduced by one layer) resolves to that value's layer.
    pub fn origin(&self, pointer: &str) -> Option<&str> {
        let mut p = pointer;
        loop {
            if let Some(i) = self.origins.get(p) {
                return self.layers.get(*i).map(String::as_str);
            }
            match p.rfind('/') {
                Some(0) | None => return None,
                Some(cut) => p = &p[..cut],
            }
        }
    }

    pub fn config_hash(&self) -> &str {
        &self.fingerprint.hash
    }
}

/// Read and merge YAML files, base first.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs = Vec::with_capacity(paths.len());
    for p in paths {
        let raw = fs::read_to_string(p).with_context(|| format!("failed to read config {p}"))?;
        docs.push((p.to_string(), raw));
    }
    merge_layers(docs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    merge_layers(
        yaml_docs
            .iter()
            .enumerate()
            .map(|(i, raw)| (format!("layer[{i}]"), raw.to_string())),
    )
}

fn merge_layers<I>(docs: I) -> Result<LoadedConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut merged = Value::Object(Map::new());
    let mut layers = Vec::new();
    let mut origins = BTreeMap::new();

    for (label, raw) in docs {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&raw).with_context(|| format!("invalid yaml in {label}"))?;
        let doc = serde_json::to_value(yaml)
            .with_context(|| format!("{label}: yaml is not representable as json"))?;
        let idx = layers.len();
        layers.push(label);
        // An empty document parses as null: no overrides.
        if doc.is_null() {
            continue;
        }
        overlay(&mut merged, doc, String::new(), idx, &mut origins);
    }

    let fingerprint = ConfigFingerprint::of(&merged)?;
    Ok(LoadedConfig {
        config_json: merged,
        fingerprint,
        layers,
        origins,
    })
}

/// Mappings merge key by key; anything else (scalars, arrays) replaces.
fn overlay(
    target: &mut Value,
    layer: Value,
    ptr: String,
    idx: usize,
    origins: &mut BTreeMap<String, usize>,
) {
    match (target, layer) {
        (Value::Object(dst), Value::Object(src)) => {
            for (k, v) in src {
                let child = format!("{ptr}/{}", k.replace('~', "~0").replace('/', "~1"));
                let slot = dst.entry(k).or_insert(Value::Null);
                overlay(slot, v, child, idx, origins);
            }
        }
        (slot, v) => {
            let prefix = format!("{ptr}/");
            origins.retain(|p, _| !p.starts_with(&prefix));
            origins.insert(ptr, idx);
            *slot = v;
        }
    }
}
