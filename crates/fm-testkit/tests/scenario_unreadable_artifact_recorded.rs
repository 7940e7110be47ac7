use anyhow::Result;
use fm_fetch::FetcherSet;
use fm_reconcile::{Checklist, ReconcileEngine, ReconcileRequest};
use fm_schemas::{Component, EntityKey, EntityLayout};
use fm_testkit::{default_resolver, CountingIndexer, ScriptedFetcher};
use std::fs;
use std::sync::Arc;

#[test]
fn inaccessible_artifact_is_reported_not_fetched() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = EntityLayout::new(dir.path());
    let key = EntityKey::new("TSLA")?;

    // A directory where the artifact file should be cannot be read.
    fs::create_dir_all(layout.structured_artifact(&key, Component::Price))?;

    let fetcher = Arc::new(ScriptedFetcher::new());
    let indexer = Arc::new(CountingIndexer::new());
    let engine = ReconcileEngine::new(
        default_resolver(),
        layout,
        FetcherSet::uniform(fetcher.clone()),
        indexer.clone(),
    );

    let result = engine.reconcile(
        &ReconcileRequest::new("TSLA").with_checklist(Checklist::parse("price,info", false)?),
    );

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Error checking price: "), "{:?}", result.errors);
    assert!(!result.components_checked[&Component::Price]);
    assert_eq!(fetcher.fetched_components(), vec![Component::Info]);
    assert_eq!(result.components_indexed, vec![Component::Info]);
    assert!(result.success());
    assert_eq!(indexer.call_count(), 1);
    Ok(())
}
