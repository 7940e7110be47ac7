use anyhow::Result;
use fm_fetch::FetcherSet;
use fm_reconcile::{Checklist, ReconcileEngine, ReconcileMode, ReconcileRequest};
use fm_schemas::{Component, EntityKey, EntityLayout, Jurisdiction};
use fm_testkit::{default_resolver, CountingIndexer, ScriptedFetcher};
use std::sync::Arc;

#[test]
fn new_entity_fetches_every_checklisted_component_and_indexes_once() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = EntityLayout::new(dir.path());
    let fetcher = Arc::new(ScriptedFetcher::new());
    let indexer = Arc::new(CountingIndexer::new());
    let engine = ReconcileEngine::new(
        default_resolver(),
        layout.clone(),
        FetcherSet::uniform(fetcher.clone()),
        indexer.clone(),
    );

    let checklist = Checklist::new(
        [Component::Price, Component::IncomeStmt, Component::Info],
        true,
    )?;
    let result = engine.reconcile(&ReconcileRequest::new("aapl").with_checklist(checklist));

    assert!(result.success(), "errors: {:?}", result.errors);
    assert_eq!(result.ticker, "AAPL");
    assert_eq!(result.jurisdiction, Some(Jurisdiction::Us));
    assert_eq!(result.mode, Some(ReconcileMode::FullOnboarding));
    assert!(!result.folder_existed);

    let expected = vec![
        Component::Price,
        Component::IncomeStmt,
        Component::Info,
        Component::Unstructured,
    ];
    assert_eq!(fetcher.call_count(), 4);
    assert_eq!(fetcher.fetched_components(), expected);
    assert_eq!(result.components_updated, expected);
    assert_eq!(result.components_indexed, expected);
    assert!(result.components_checked.values().all(|fresh| !fresh));
    assert_eq!(result.components_checked.len(), 4);
    assert!(result.freshness.is_empty(), "onboarding skips freshness");

    assert_eq!(indexer.call_count(), 1);
    assert!(layout.filing_document(&EntityKey::new("AAPL")?).is_file());
    Ok(())
}

#[test]
fn default_checklist_covers_all_six_components() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let fetcher = Arc::new(ScriptedFetcher::new());
    let engine = ReconcileEngine::new(
        default_resolver(),
        EntityLayout::new(dir.path()),
        FetcherSet::uniform(fetcher.clone()),
        Arc::new(CountingIndexer::new()),
    );

    let result = engine.reconcile(&ReconcileRequest::new("TCS"));
    assert!(result.success());
    assert_eq!(result.jurisdiction, Some(Jurisdiction::India));
    assert_eq!(fetcher.fetched_components(), Component::ALL.to_vec());
    Ok(())
}
