use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use fm_freshness::evaluate;
use fm_schemas::{
    format_fetched_at, Component, EntityKey, EntityLayout, FreshnessPolicies, Jurisdiction,
};
use std::fs;

fn write_price(layout: &EntityLayout, key: &EntityKey, body: &str) -> Result<()> {
    let path = layout.structured_artifact(key, Component::Price);
    fs::create_dir_all(path.parent().unwrap())?;
    fs::write(path, body)?;
    Ok(())
}

#[test]
fn one_hour_old_price_is_fresh_twenty_five_hours_is_stale() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = EntityLayout::new(dir.path());
    let key = EntityKey::new("AAPL")?;
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
    let policies = FreshnessPolicies::with_overrides([(Component::Price, Duration::hours(24))])?;

    let one_hour = format_fetched_at(now - Duration::hours(1));
    write_price(
        &layout,
        &key,
        &format!(r#"{{"_meta":{{"fetched_at":"{one_hour}","component":"price"}},"records":[]}}"#),
    )?;
    let r = evaluate(&layout, &key, Jurisdiction::Us, Component::Price, &policies, now)?;
    assert!(r.exists && r.is_fresh);
    assert_eq!(r.to_string(), "price: FRESH (age: 1h 0m)");

    let day_plus = format_fetched_at(now - Duration::hours(25));
    write_price(
        &layout,
        &key,
        &format!(r#"{{"_meta":{{"fetched_at":"{day_plus}","component":"price"}},"records":[]}}"#),
    )?;
    let r = evaluate(&layout, &key, Jurisdiction::Us, Component::Price, &policies, now)?;
    assert!(r.exists);
    assert!(!r.is_fresh);
    assert!(r.needs_fetch());
    Ok(())
}

#[test]
fn missing_timestamp_field_falls_back_to_stale() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = EntityLayout::new(dir.path());
    let key = EntityKey::new("MSFT")?;
    let now = Utc::now();

    write_price(&layout, &key, r#"{"_meta":{"component":"price"},"records":[]}"#)?;
    let r = evaluate(
        &layout,
        &key,
        Jurisdiction::Us,
        Component::Price,
        &FreshnessPolicies::default(),
        now,
    )?;
    assert!(r.exists, "file is present");
    assert!(!r.is_fresh, "absent fetched_at must never be treated as fresh");

    write_price(
        &layout,
        &key,
        r#"{"_meta":{"fetched_at":"yesterday-ish","component":"price"}}"#,
    )?;
    let r = evaluate(
        &layout,
        &key,
        Jurisdiction::Us,
        Component::Price,
        &FreshnessPolicies::default(),
        now,
    )?;
    assert!(r.exists && !r.is_fresh);
    Ok(())
}

#[test]
fn naive_timestamps_are_read_as_utc() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = EntityLayout::new(dir.path());
    let key = EntityKey::new("NVDA")?;
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

    write_price(
        &layout,
        &key,
        r#"{"_meta":{"fetched_at":"2026-10-19T10:30:00.123456","component":"price"}}"#,
    )?;
    let r = evaluate(
        &layout,
        &key,
        Jurisdiction::Us,
        Component::Price,
        &FreshnessPolicies::default(),
        now,
    )?;
    assert!(r.is_fresh);
    assert_eq!(r.age_secs, Some(5399));
    Ok(())
}

#[test]
fn absent_artifact_is_not_found() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = EntityLayout::new(dir.path());
    let key = EntityKey::new("JPM")?;

    let r = evaluate(
        &layout,
        &key,
        Jurisdiction::Us,
        Component::BalanceSheet,
        &FreshnessPolicies::default(),
        Utc::now(),
    )?;
    assert!(!r.exists);
    assert_eq!(r.to_string(), "balance_sheet: NOT FOUND");
    Ok(())
}
