use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use fm_fetch::{write_filing_document, write_raw_filing, write_structured_artifact, RawFiling};
use fm_registry::{EntityRegistry, EntityResolver, Overrides, ResolvedEntity};
use fm_schemas::{Component, EntityKey, EntityLayout, NarratedRecord, RecordMetadata};
use std::path::PathBuf;
use std::sync::Arc;

/// Long enough to survive the indexer's minimum-length filter.
pub const LONG_NARRATIVE: &str = "The company reported steady revenue growth across its core \
segments, with operating margin expanding on lower input costs and disciplined spending.";

/// Resolver over the built-in registry.
pub fn default_resolver() -> EntityResolver {
    EntityResolver::new(Arc::new(EntityRegistry::with_defaults()))
}

/// Resolve a built-in ticker.
pub fn resolved(ticker: &str) -> Result<ResolvedEntity> {
    let key = EntityKey::new(ticker)?;
    default_resolver()
        .resolve(&key, &Overrides::default())
        .with_context(|| format!("resolve {ticker}"))
}

fn record_for(component: Component, at: DateTime<Utc>) -> NarratedRecord {
    let date = at.format("%Y-%m-%d").to_string();
    NarratedRecord {
        text: format!(
            "{} narrative for period ending {date}: {LONG_NARRATIVE}",
            component.as_str()
        ),
        metadata: RecordMetadata {
            report_type: component.as_str().to_string(),
            date,
        },
    }
}

/// `structured/<component>.json` with one indexable record.
pub fn write_structured_fixture(
    layout: &EntityLayout,
    key: &EntityKey,
    component: Component,
    fetched_at: DateTime<Utc>,
) -> Result<PathBuf> {
    write_structured_artifact(
        layout,
        key,
        component,
        "fixture",
        vec![record_for(component, fetched_at)],
        fetched_at,
    )
}

/// US `unstructured/data.json`.
pub fn write_us_filing_fixture(
    layout: &EntityLayout,
    key: &EntityKey,
    fetched_at: DateTime<Utc>,
) -> Result<PathBuf> {
    write_filing_document(
        layout,
        key,
        "fixture",
        &format!("{key} annual report. {LONG_NARRATIVE}"),
        Some(fetched_at.date_naive()),
        fetched_at,
    )
}

/// India `unstructured/raw/<date>_annual_report.{pdf,txt}`.
pub fn write_india_filing_fixture(
    layout: &EntityLayout,
    key: &EntityKey,
    filing_date: NaiveDate,
) -> Result<Vec<PathBuf>> {
    let text = format!("{key} annual report. {LONG_NARRATIVE}");
    write_raw_filing(
        layout,
        key,
        &RawFiling {
            filing_date,
            subject: "annual report",
            pdf: b"%PDF-1.4 fixture",
            text: Some(&text),
        },
    )
}
