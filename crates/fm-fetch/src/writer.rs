//! Canonical artifact writers.
//!
//! Every write goes to a temporary sibling first and is renamed into place,
//! so readers see either the previous artifact or the complete new one.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use fm_schemas::{
    format_fetched_at, ArtifactMeta, Component, EntityKey, EntityLayout, FilingDocument,
    Jurisdiction, NarratedRecord, StructuredArtifact,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("artifact path has no parent: {}", path.display()))?;
    fs::create_dir_all(dir).with_context(|| format!("create dir failed: {}", dir.display()))?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("artifact path has no file name: {}", path.display()))?;
    let tmp = dir.join(format!(".{name}.tmp-{}", std::process::id()));

    fs::write(&tmp, bytes).with_context(|| format!("write temp failed: {}", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("rename into place failed: {}", path.display()));
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut body = serde_json::to_vec_pretty(value).context("serialize artifact failed")?;
    body.push(b'\n');
    write_atomic(path, &body)
}

// ---------------------------------------------------------------------------
// Structured
// ---------------------------------------------------------------------------

/// Write `structured/<component>.json` for `key`.
pub fn write_structured_artifact(
    layout: &EntityLayout,
    key: &EntityKey,
    component: Component,
    source: &str,
    records: Vec<NarratedRecord>,
    fetched_at: DateTime<Utc>,
) -> Result<PathBuf> {
    anyhow::ensure!(
        component.kind().is_structured(),
        "{} is not a structured component",
        component.as_str()
    );

    let path = layout.structured_artifact(key, component);
    let n = records.len();
    let artifact = StructuredArtifact {
        meta: ArtifactMeta {
            fetched_at: format_fetched_at(fetched_at),
            source: source.to_string(),
            component,
        },
        records,
    };
    write_json(&path, &artifact)?;
    info!(ticker = %key, component = component.as_str(), records = n, path = %path.display(), "structured artifact written");
    Ok(path)
}

// ---------------------------------------------------------------------------
// Filings
// ---------------------------------------------------------------------------

/// Write the single US filing document `unstructured/data.json`.
pub fn write_filing_document(
    layout: &EntityLayout,
    key: &EntityKey,
    source: &str,
    text: &str,
    filing_date: Option<NaiveDate>,
    fetched_at: DateTime<Utc>,
) -> Result<PathBuf> {
    let path = layout.filing_document(key);
    let doc = FilingDocument {
        ticker: key.clone(),
        source: source.to_string(),
        jurisdiction: Jurisdiction::Us,
        fetched_at: format_fetched_at(fetched_at),
        filing_date: filing_date.map(|d| d.format("%Y-%m-%d").to_string()),
        text: text.to_string(),
    };
    write_json(&path, &doc)?;
    info!(ticker = %key, chars = text.len(), path = %path.display(), "filing document written");
    Ok(path)
}

/// One India filing as delivered by the exchange.
#[derive(Debug, Clone)]
pub struct RawFiling<'a> {
    pub filing_date: NaiveDate,
    /// Free-form subject, reduced to `[a-z0-9_]` in the file name.
    pub subject: &'a str,
    pub pdf: &'a [u8],
    /// Extracted text, written as a `.txt` sidecar with the same stem.
    pub text: Option<&'a str>,
}

fn slug(subject: &str) -> String {
    let mut out = String::with_capacity(subject.len());
    for c in subject.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let out = out.trim_matches('_').to_string();
    if out.is_empty() {
        "filing".to_string()
    } else {
        out
    }
}

/// Write `unstructured/raw/YYYY-MM-DD_<subject>.pdf` (and its text sidecar).
///
/// The filing date in the name is what freshness reads back.
pub fn write_raw_filing(
    layout: &EntityLayout,
    key: &EntityKey,
    filing: &RawFiling<'_>,
) -> Result<Vec<PathBuf>> {
    let dir = layout.raw_filings_dir(key);
    let stem = format!("{}_{}", filing.filing_date.format("%Y-%m-%d"), slug(filing.subject));

    let pdf = dir.join(format!("{stem}.pdf"));
    write_atomic(&pdf, filing.pdf)?;
    let mut paths = vec![pdf];

    if let Some(text) = filing.text {
        let txt = dir.join(format!("{stem}.txt"));
        write_atomic(&txt, text.as_bytes())?;
        paths.push(txt);
    }
    info!(ticker = %key, stem = %stem, files = paths.len(), "raw filing written");
    Ok(paths)
}
