//! Command handler modules for fm-cli.
//!
//! Shared wiring (settings, registry, engine assembly) lives here.
//! Command-specific logic lives in the submodules.

pub mod freshness;
pub mod reconcile;
pub mod registry;

use anyhow::{Context, Result};
use clap::Args;
use fm_config::{RegistrySeed, Settings, UnusedKeyPolicy};
use fm_fetch::{FetcherSet, StagingFetcher};
use fm_index::{ChunkConfig, DiskMirrorIndexer, HashingEmbedder, IndexerConfig, JsonFileVectorStore};
use fm_reconcile::ReconcileEngine;
use fm_registry::{EntityRegistry, EntityResolver, Overrides};
use fm_schemas::{EntityLayout, Identifiers};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Options accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Layered YAML config files, merged in order (repeatable)
    #[arg(long = "config", global = true)]
    pub config: Vec<String>,

    /// Root of the per-entity mirror (overrides config and FM_DATA_DIR)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Inbox of pre-downloaded payloads
    #[arg(long = "staging-dir", global = true)]
    pub staging_dir: Option<PathBuf>,

    /// Where the JSON vector store keeps its namespaces
    #[arg(long = "index-dir", global = true)]
    pub index_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Settings plus the fingerprint of the config files they came from.
pub struct Loaded {
    pub settings: Settings,
    pub config_hash: Option<String>,
}

/// Config files → env overrides → command-line flags, in that precedence.
pub fn load_settings(global: &GlobalArgs) -> Result<Loaded> {
    let (settings, config_hash) = if global.config.is_empty() {
        (Settings::default(), None)
    } else {
        let path_refs: Vec<&str> = global.config.iter().map(|s| s.as_str()).collect();
        let loaded = fm_config::load_layered_yaml(&path_refs)?;
        let report = fm_config::report_unused_keys(&loaded, UnusedKeyPolicy::Warn)?;
        for u in &report.unused {
            warn!(pointer = %u.pointer, layer = ?u.layer, "unused config key");
        }
        info!(config = loaded.fingerprint.short(), layers = loaded.layers.len(), "config loaded");
        (
            Settings::from_config_json(&loaded.config_json)?,
            Some(loaded.fingerprint.hash),
        )
    };

    let mut settings = settings.with_env_overrides();
    if let Some(dir) = &global.data_dir {
        settings.paths.data_dir = dir.clone();
    }
    if let Some(dir) = &global.staging_dir {
        settings.paths.staging_dir = dir.clone();
    }
    if let Some(dir) = &global.index_dir {
        settings.paths.index_dir = dir.clone();
    }
    Ok(Loaded {
        settings,
        config_hash,
    })
}

/// Built-in entities plus any seeded from config.
pub fn build_registry(settings: &Settings) -> Result<Arc<EntityRegistry>> {
    let registry = EntityRegistry::with_defaults();
    let seeded = registry
        .seed_from(settings.registry.iter().cloned().map(
            |RegistrySeed {
                 ticker,
                 jurisdiction,
                 identifiers,
             }| (ticker, jurisdiction, identifiers),
        ))
        .context("registry seed from config failed")?;
    if seeded > 0 {
        info!(seeded, "registry seeded from config");
    }
    Ok(Arc::new(registry))
}

pub fn overrides(cik: Option<String>, scrip: Option<String>) -> Overrides {
    Identifiers {
        cik,
        scrip_code: scrip,
    }
    .normalized()
}

/// Staging importer for every component, JSON-file vector store on disk.
pub fn build_engine(loaded: &Loaded, registry: Arc<EntityRegistry>) -> ReconcileEngine {
    let settings = &loaded.settings;
    let layout = EntityLayout::new(&settings.paths.data_dir);
    let idx = settings.indexing;

    let indexer = DiskMirrorIndexer::new(
        layout.clone(),
        HashingEmbedder::new(idx.embedding_dim),
        JsonFileVectorStore::new(&settings.paths.index_dir),
        IndexerConfig {
            chunk: ChunkConfig {
                size: idx.chunk_size,
                overlap: idx.chunk_overlap,
                max_chunks: idx.max_chunks_per_doc,
            },
            batch_size: idx.batch_size,
            min_text_chars: idx.min_text_chars,
        },
    );

    let fetchers = FetcherSet::uniform(Arc::new(StagingFetcher::new(
        &settings.paths.staging_dir,
    )));

    let engine = ReconcileEngine::new(
        EntityResolver::new(registry),
        layout,
        fetchers,
        Arc::new(indexer),
    )
    .with_policies(settings.freshness.clone());
    match &loaded.config_hash {
        Some(hash) => engine.with_config_hash(hash.clone()),
        None => engine,
    }
}
