use anyhow::Result;
use fm_fetch::{FetchError, FetcherSet};
use fm_reconcile::{Checklist, ReconcileEngine, ReconcileRequest};
use fm_schemas::{Component, EntityKey, EntityLayout};
use fm_testkit::{default_resolver, CountingIndexer, ScriptedFetcher};
use std::sync::Arc;

#[test]
fn one_failing_component_does_not_block_the_others() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = EntityLayout::new(dir.path());
    let fetcher = Arc::new(ScriptedFetcher::new().fail_on(
        Component::BalanceSheet,
        FetchError::Api {
            code: Some(404),
            message: "no balance sheet".into(),
        },
    ));
    let indexer = Arc::new(CountingIndexer::new());
    let engine = ReconcileEngine::new(
        default_resolver(),
        layout.clone(),
        FetcherSet::uniform(fetcher.clone()),
        indexer.clone(),
    );

    let checklist = Checklist::parse("price,balance_sheet,cash_flow", false)?;
    let result = engine.reconcile(&ReconcileRequest::new("GOOGL").with_checklist(checklist));

    assert_eq!(fetcher.call_count(), 3, "failure does not stop later fetches");
    assert_eq!(
        result.components_updated,
        vec![Component::Price, Component::CashFlow]
    );
    assert_eq!(result.components_indexed, result.components_updated);
    assert_eq!(
        result.errors,
        vec!["Error fetching balance_sheet: upstream api error code=404: no balance sheet".to_string()]
    );
    assert!(result.success(), "partial progress counts as success");
    assert!(!result.is_total_failure());
    assert_eq!(indexer.call_count(), 1);

    let key = EntityKey::new("GOOGL")?;
    assert!(!layout.structured_artifact(&key, Component::BalanceSheet).exists());
    assert!(layout.structured_artifact(&key, Component::CashFlow).is_file());
    Ok(())
}

#[test]
fn every_fetch_failing_skips_indexing_and_fails() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .fail_on(Component::Price, FetchError::Transport("timeout".into()))
            .fail_on(Component::Info, FetchError::Decode("bad payload".into())),
    );
    let indexer = Arc::new(CountingIndexer::new());
    let engine = ReconcileEngine::new(
        default_resolver(),
        EntityLayout::new(dir.path()),
        FetcherSet::uniform(fetcher),
        indexer.clone(),
    );

    let result = engine.reconcile(
        &ReconcileRequest::new("V").with_checklist(Checklist::parse("price,info", false)?),
    );
    assert!(!result.success());
    assert!(result.is_total_failure());
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.errors[0], "Error fetching price: transport error: timeout");
    assert_eq!(indexer.call_count(), 0);
    Ok(())
}
