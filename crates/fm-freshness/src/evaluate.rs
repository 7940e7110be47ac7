use chrono::{DateTime, Duration, NaiveTime, Utc};
use fm_schemas::{
    filing_date_from_name, parse_fetched_at, Component, ComponentKind, EntityKey, EntityLayout,
    FreshnessPolicies, Jurisdiction, FETCHED_AT_POINTER,
};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::{FreshnessError, FreshnessResult};

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// `true` when the entity has a folder under the data root.
pub fn entity_folder_exists(layout: &EntityLayout, key: &EntityKey) -> bool {
    layout.entity_dir(key).is_dir()
}

/// Freshness of one component of one entity at `now`.
pub fn evaluate(
    layout: &EntityLayout,
    key: &EntityKey,
    jurisdiction: Jurisdiction,
    component: Component,
    policies: &FreshnessPolicies,
    now: DateTime<Utc>,
) -> Result<FreshnessResult, FreshnessError> {
    let max_age = policies.max_age(component);

    let result = match (component.kind(), jurisdiction) {
        (ComponentKind::TimeSeries, _)
        | (ComponentKind::PeriodicStatement, _)
        | (ComponentKind::Profile, _) => json_timestamp(
            &layout.structured_artifact(key, component),
            FETCHED_AT_POINTER,
            component,
            max_age,
            now,
        )?,
        (ComponentKind::Document, Jurisdiction::Us) => json_timestamp(
            &layout.filing_document(key),
            "/fetched_at",
            component,
            max_age,
            now,
        )?,
        (ComponentKind::Document, Jurisdiction::India) => {
            raw_filings(&layout.raw_filings_dir(key), component, max_age, now)?
        }
    };

    debug!(
        ticker = %key,
        component = component.as_str(),
        exists = result.exists,
        fresh = result.is_fresh,
        age_secs = ?result.age_secs,
        "freshness evaluated"
    );
    Ok(result)
}

/// Evaluate every component in order. Each component carries its own result
/// so one unreadable artifact does not hide the others.
pub fn evaluate_all(
    layout: &EntityLayout,
    key: &EntityKey,
    jurisdiction: Jurisdiction,
    components: &[Component],
    policies: &FreshnessPolicies,
    now: DateTime<Utc>,
) -> Vec<(Component, Result<FreshnessResult, FreshnessError>)> {
    components
        .iter()
        .map(|c| (*c, evaluate(layout, key, jurisdiction, *c, policies, now)))
        .collect()
}

// ---------------------------------------------------------------------------
// JSON artifacts
// ---------------------------------------------------------------------------

fn json_timestamp(
    path: &Path,
    pointer: &str,
    component: Component,
    max_age: Duration,
    now: DateTime<Utc>,
) -> Result<FreshnessResult, FreshnessError> {
    let raw = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(FreshnessResult::missing(component, max_age))
        }
        Err(e) => return Err(FreshnessError::io(path, e)),
    };

    let fetched_at = serde_json::from_slice::<serde_json::Value>(&raw)
        .ok()
        .and_then(|v| v.pointer(pointer).and_then(|t| t.as_str()).and_then(parse_fetched_at));

    Ok(match fetched_at {
        Some(ts) => FreshnessResult::dated(component, ts, max_age, now),
        None => FreshnessResult::undated(component, max_age),
    })
}

// ---------------------------------------------------------------------------
// India raw filings
// ---------------------------------------------------------------------------

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

fn raw_filings(
    dir: &Path,
    component: Component,
    max_age: Duration,
    now: DateTime<Utc>,
) -> Result<FreshnessResult, FreshnessError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(FreshnessResult::missing(component, max_age))
        }
        Err(e) => return Err(FreshnessError::io(dir, e)),
    };

    let mut pdfs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FreshnessError::io(dir, e))?;
        let path = entry.path();
        if is_pdf(&path) && path.is_file() {
            pdfs.push(path);
        }
    }
    if pdfs.is_empty() {
        return Ok(FreshnessResult::missing(component, max_age));
    }

    let newest_named = pdfs
        .iter()
        .filter_map(|p| filing_date_from_name(p))
        .max()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc());

    let newest = match newest_named {
        Some(ts) => Some(ts),
        None => newest_mtime(&pdfs)?,
    };

    Ok(match newest {
        Some(ts) => FreshnessResult::dated(component, ts, max_age, now),
        None => FreshnessResult::undated(component, max_age),
    })
}

fn newest_mtime(paths: &[std::path::PathBuf]) -> Result<Option<DateTime<Utc>>, FreshnessError> {
    let mut newest: Option<DateTime<Utc>> = None;
    for p in paths {
        let modified = match std::fs::metadata(p).and_then(|m| m.modified()) {
            Ok(t) => DateTime::<Utc>::from(t),
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) if e.kind() == ErrorKind::Unsupported => continue,
            Err(e) => return Err(FreshnessError::io(p, e)),
        };
        newest = Some(newest.map_or(modified, |n| n.max(modified)));
    }
    Ok(newest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn key() -> EntityKey {
        EntityKey::new("AAPL").unwrap()
    }

    fn write(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn corrupt_json_is_stale_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = EntityLayout::new(dir.path());
        write(&layout.structured_artifact(&key(), Component::Info), "{not json");

        let r = evaluate(
            &layout,
            &key(),
            Jurisdiction::Us,
            Component::Info,
            &FreshnessPolicies::default(),
            now(),
        )
        .unwrap();
        assert!(r.exists);
        assert!(!r.is_fresh);
        assert_eq!(r.fetched_at, None);
    }

    #[test]
    fn us_document_reads_top_level_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let layout = EntityLayout::new(dir.path());
        write(
            &layout.filing_document(&key()),
            r#"{"ticker":"AAPL","fetched_at":"2026-10-01T00:00:00+00:00","text":"x"}"#,
        );

        let r = evaluate(
            &layout,
            &key(),
            Jurisdiction::Us,
            Component::Unstructured,
            &FreshnessPolicies::default(),
            now(),
        )
        .unwrap();
        assert!(r.exists && r.is_fresh);
        assert_eq!(r.age(), Some(Duration::days(18) + Duration::hours(12)));
    }

    #[test]
    fn india_dir_without_pdfs_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = EntityLayout::new(dir.path());
        let key = EntityKey::new("TCS").unwrap();
        write(&layout.raw_filings_dir(&key).join("2026-10-01_notes.txt"), "text");

        let r = evaluate(
            &layout,
            &key,
            Jurisdiction::India,
            Component::Unstructured,
            &FreshnessPolicies::default(),
            now(),
        )
        .unwrap();
        assert!(!r.exists);
    }

    #[test]
    fn india_undated_pdf_falls_back_to_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let layout = EntityLayout::new(dir.path());
        let key = EntityKey::new("TCS").unwrap();
        write(&layout.raw_filings_dir(&key).join("annual_report.PDF"), "%PDF");

        let r = evaluate(
            &layout,
            &key,
            Jurisdiction::India,
            Component::Unstructured,
            &FreshnessPolicies::default(),
            Utc::now(),
        )
        .unwrap();
        assert!(r.exists);
        assert!(r.is_fresh, "file just written must be fresh by mtime");
    }

    #[test]
    fn entity_folder_detection() {
        let dir = tempfile::tempdir().unwrap();
        let layout = EntityLayout::new(dir.path());
        assert!(!entity_folder_exists(&layout, &key()));
        fs::create_dir_all(layout.entity_dir(&key())).unwrap();
        assert!(entity_folder_exists(&layout, &key()));
    }
}
