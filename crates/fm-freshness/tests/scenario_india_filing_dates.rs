use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use fm_freshness::{evaluate, evaluate_all};
use fm_schemas::{Component, EntityKey, EntityLayout, FreshnessPolicies, Jurisdiction};
use std::fs;

fn touch(layout: &EntityLayout, key: &EntityKey, name: &str) -> Result<()> {
    let dir = layout.raw_filings_dir(key);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(name), b"%PDF-1.4")?;
    Ok(())
}

#[test]
fn newest_filename_date_drives_freshness() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = EntityLayout::new(dir.path());
    let key = EntityKey::new("TCS")?;

    touch(&layout, &key, "2024-05-10_annual_report.pdf")?;
    touch(&layout, &key, "20260301_q4_results.pdf")?;
    touch(&layout, &key, "shareholding.pdf")?;

    let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
    let policies = FreshnessPolicies::default();
    let r = evaluate(&layout, &key, Jurisdiction::India, Component::Unstructured, &policies, now)?;

    assert!(r.exists);
    assert_eq!(
        r.fetched_at,
        Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()),
        "compact date in the newest filing wins, undated files are ignored"
    );
    assert!(r.is_fresh, "about seven months is within the yearly policy");

    let short = FreshnessPolicies::with_overrides([(Component::Unstructured, Duration::days(30))])?;
    let r = evaluate(&layout, &key, Jurisdiction::India, Component::Unstructured, &short, now)?;
    assert!(!r.is_fresh);
    Ok(())
}

#[test]
fn missing_raw_dir_is_not_found() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = EntityLayout::new(dir.path());
    let key = EntityKey::new("INFY")?;

    let r = evaluate(
        &layout,
        &key,
        Jurisdiction::India,
        Component::Unstructured,
        &FreshnessPolicies::default(),
        Utc::now(),
    )?;
    assert!(!r.exists);
    Ok(())
}

#[test]
fn evaluate_all_keeps_checklist_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = EntityLayout::new(dir.path());
    let key = EntityKey::new("SBIN")?;
    touch(&layout, &key, "2026-10-01_annual.pdf")?;

    let order = [Component::Info, Component::Price, Component::Unstructured];
    let all = evaluate_all(
        &layout,
        &key,
        Jurisdiction::India,
        &order,
        &FreshnessPolicies::default(),
        Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap(),
    );

    let got: Vec<Component> = all.iter().map(|(c, _)| *c).collect();
    assert_eq!(got, order);
    let doc = all[2].1.as_ref().expect("readable");
    assert!(doc.exists && doc.is_fresh);
    assert!(!all[0].1.as_ref().expect("readable").exists);
    Ok(())
}
