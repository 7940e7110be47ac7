use anyhow::Result;
use fm_fetch::{FetchError, FetcherSet};
use fm_index::{DiskMirrorIndexer, HashingEmbedder, InMemoryVectorStore, IndexerConfig, VectorStore};
use fm_reconcile::{Checklist, ReconcileEngine, ReconcileMode, ReconcileRequest};
use fm_schemas::{Component, EntityKey, EntityLayout};
use fm_testkit::{default_resolver, ScriptedFetcher};
use std::fs;
use std::sync::Arc;

/// A truncated artifact whose refetch fails must not keep the freshly
/// fetched siblings out of the index, on this run or the next.
#[test]
fn corrupt_artifact_with_failed_refetch_still_indexes_siblings() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = EntityLayout::new(dir.path());
    let key = EntityKey::new("AAPL")?;

    let info = layout.structured_artifact(&key, Component::Info);
    fs::create_dir_all(layout.structured_dir(&key))?;
    fs::write(&info, "{truncated")?;

    let fetcher = Arc::new(
        ScriptedFetcher::new().fail_on(Component::Info, FetchError::Transport("timeout".into())),
    );
    let indexer = Arc::new(DiskMirrorIndexer::new(
        layout.clone(),
        HashingEmbedder::new(16),
        InMemoryVectorStore::new(),
        IndexerConfig::default(),
    ));
    let engine = ReconcileEngine::new(
        default_resolver(),
        layout.clone(),
        FetcherSet::uniform(fetcher.clone()),
        indexer.clone(),
    );
    let req = ReconcileRequest::new("AAPL").with_checklist(Checklist::parse("price,info", false)?);

    let first = engine.reconcile(&req);
    assert_eq!(first.mode, Some(ReconcileMode::Incremental));
    assert_eq!(first.components_updated, vec![Component::Price]);
    assert_eq!(first.components_indexed, vec![Component::Price]);
    assert_eq!(
        first.errors,
        vec!["Error fetching info: transport error: timeout".to_string()]
    );
    assert!(first.success());
    let summary = first.index_summary.expect("index ran");
    assert_eq!(summary.malformed_artifacts, 1);
    assert_eq!(summary.statement_entries, 1);
    assert_eq!(indexer.store().count("AAPL")?, 1);

    let second = engine.reconcile(&req);
    assert!(second.components_updated.is_empty());
    assert_eq!(second.components_checked.get(&Component::Price), Some(&true));
    assert_eq!(second.components_checked.get(&Component::Info), Some(&false));
    assert_eq!(indexer.store().count("AAPL")?, 1, "price stays indexed");
    assert!(info.is_file(), "nothing on disk is rolled back");
    Ok(())
}
