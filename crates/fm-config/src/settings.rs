use anyhow::{anyhow, bail, Context, Result};
use chrono::TimeDelta;
use fm_schemas::{Component, EntityKey, FreshnessPolicies, Identifiers, Jurisdiction};
use serde_json::Value;
use std::path::PathBuf;

/// Env var that overrides `paths.data_dir` (deployment convenience).
pub const ENV_DATA_DIR: &str = "FM_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSettings {
    pub data_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub index_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            staging_dir: PathBuf::from("./staging"),
            index_dir: PathBuf::from("./index"),
        }
    }
}

/// Knobs for the disk-scanning mirror indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexingSettings {
    pub batch_size: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_chunks_per_doc: usize,
    /// Units whose trimmed text is at most this many chars are skipped.
    pub min_text_chars: usize,
    pub embedding_dim: usize,
}

impl Default for IndexingSettings {
    fn default() -> Self {
        Self {
            batch_size: 32,
            chunk_size: 800,
            chunk_overlap: 100,
            max_chunks_per_doc: 50,
            min_text_chars: 50,
            embedding_dim: 256,
        }
    }
}

/// One entity pre-registered from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySeed {
    pub ticker: EntityKey,
    pub jurisdiction: Jurisdiction,
    pub identifiers: Identifiers,
}

/// Typed view over a loaded configuration document.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub paths: PathSettings,
    pub freshness: FreshnessPolicies,
    pub indexing: IndexingSettings,
    pub registry: Vec<RegistrySeed>,
}

impl Settings {
    /// Extract typed settings. Absent keys fall back to defaults; present but
    /// ill-typed keys are an error (never silently ignored).
    pub fn from_config_json(v: &Value) -> Result<Self> {
        let defaults = PathSettings::default();
        let paths = PathSettings {
            data_dir: opt_str(v, "/paths/data_dir")?
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            staging_dir: opt_str(v, "/paths/staging_dir")?
                .map(PathBuf::from)
                .unwrap_or(defaults.staging_dir),
            index_dir: opt_str(v, "/paths/index_dir")?
                .map(PathBuf::from)
                .unwrap_or(defaults.index_dir),
        };

        let mut overrides = Vec::new();
        if let Some(section) = v.pointer("/freshness") {
            let map = section
                .as_object()
                .ok_or_else(|| anyhow!("CONFIG_INVALID /freshness must be a mapping"))?;
            for (key, val) in map {
                let name = key.strip_suffix("_hours").ok_or_else(|| {
                    anyhow!("CONFIG_INVALID /freshness/{key}: expected '<component>_hours'")
                })?;
                let component = Component::parse(name)
                    .with_context(|| format!("CONFIG_INVALID /freshness/{key}"))?;
                let hours = val.as_i64().ok_or_else(|| {
                    anyhow!("CONFIG_INVALID /freshness/{key} must be an integer number of hours")
                })?;
                let max_age = TimeDelta::try_hours(hours).ok_or_else(|| {
                    anyhow!("CONFIG_INVALID /freshness/{key}: {hours} hours is out of range")
                })?;
                overrides.push((component, max_age));
            }
        }
        let freshness = FreshnessPolicies::with_overrides(overrides)
            .map_err(|e| anyhow!("CONFIG_INVALID {e}"))?;

        let d = IndexingSettings::default();
        let indexing = IndexingSettings {
            batch_size: opt_usize(v, "/indexing/batch_size")?.unwrap_or(d.batch_size),
            chunk_size: opt_usize(v, "/indexing/chunk_size")?.unwrap_or(d.chunk_size),
            chunk_overlap: opt_usize(v, "/indexing/chunk_overlap")?.unwrap_or(d.chunk_overlap),
            max_chunks_per_doc: opt_usize(v, "/indexing/max_chunks_per_doc")?
                .unwrap_or(d.max_chunks_per_doc),
            min_text_chars: opt_usize(v, "/indexing/min_text_chars")?.unwrap_or(d.min_text_chars),
            embedding_dim: opt_usize(v, "/indexing/embedding_dim")?.unwrap_or(d.embedding_dim),
        };
        if indexing.batch_size == 0 || indexing.chunk_size == 0 || indexing.embedding_dim == 0 {
            bail!("CONFIG_INVALID /indexing: batch_size, chunk_size and embedding_dim must be > 0");
        }
        if indexing.chunk_overlap >= indexing.chunk_size {
            bail!(
                "CONFIG_INVALID /indexing/chunk_overlap ({}) must be < chunk_size ({})",
                indexing.chunk_overlap,
                indexing.chunk_size
            );
        }

        let registry = match v.pointer("/registry/entities") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| parse_seed(i, item))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => bail!("CONFIG_INVALID /registry/entities must be a list"),
        };

        Ok(Self {
            paths,
            freshness,
            indexing,
            registry,
        })
    }

    /// Apply environment overrides (currently only [`ENV_DATA_DIR`]).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                self.paths.data_dir = PathBuf::from(dir.trim());
            }
        }
        self
    }
}

fn parse_seed(i: usize, item: &Value) -> Result<RegistrySeed> {
    let ptr = format!("/registry/entities/{i}");
    let ticker_raw = item
        .get("ticker")
        .and_then(|t| t.as_str())
        .ok_or_else(|| anyhow!("CONFIG_INVALID {ptr}/ticker missing"))?;
    let ticker = EntityKey::new(ticker_raw).with_context(|| format!("CONFIG_INVALID {ptr}/ticker"))?;
    let jurisdiction_raw = item
        .get("jurisdiction")
        .and_then(|t| t.as_str())
        .ok_or_else(|| anyhow!("CONFIG_INVALID {ptr}/jurisdiction missing"))?;
    let jurisdiction = Jurisdiction::parse(jurisdiction_raw)
        .with_context(|| format!("CONFIG_INVALID {ptr}/jurisdiction"))?;
    let identifiers = Identifiers {
        cik: item.get("cik").and_then(|t| t.as_str()).map(str::to_string),
        scrip_code: item
            .get("scrip_code")
            .and_then(|t| t.as_str())
            .map(str::to_string),
    }
    .normalized();
    Ok(RegistrySeed {
        ticker,
        jurisdiction,
        identifiers,
    })
}

fn opt_str(v: &Value, ptr: &str) -> Result<Option<String>> {
    match v.pointer(ptr) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => bail!("CONFIG_INVALID {ptr} must be a string"),
    }
}

fn opt_usize(v: &Value, ptr: &str) -> Result<Option<usize>> {
    match v.pointer(ptr) {
        None | Some(Value::Null) => Ok(None),
        Some(val) => {
            let n = val
                .as_u64()
                .ok_or_else(|| anyhow!("CONFIG_INVALID {ptr} must be a non-negative integer"))?;
            Ok(Some(n as usize))
        }
    }
}
