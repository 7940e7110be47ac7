use chrono::Duration;
use fm_config::{load_layered_yaml_from_strings, IndexingSettings, Settings};
use fm_schemas::{Component, Jurisdiction};
use std::path::PathBuf;

#[test]
fn empty_config_yields_defaults() {
    let loaded = load_layered_yaml_from_strings(&["{}"]).unwrap();
    let s = Settings::from_config_json(&loaded.config_json).unwrap();

    assert_eq!(s.paths.data_dir, PathBuf::from("./data"));
    assert_eq!(s.indexing, IndexingSettings::default());
    assert_eq!(s.freshness.max_age(Component::Price), Duration::hours(24));
    assert!(s.registry.is_empty());
}

#[test]
fn freshness_hours_override_policies() {
    let yaml = r#"
freshness:
  price_hours: 6
  unstructured_hours: 720
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let s = Settings::from_config_json(&loaded.config_json).unwrap();

    assert_eq!(s.freshness.max_age(Component::Price), Duration::hours(6));
    assert_eq!(s.freshness.max_age(Component::Unstructured), Duration::hours(720));
    assert_eq!(s.freshness.max_age(Component::Info), Duration::days(7));
}

#[test]
fn unknown_freshness_component_is_rejected() {
    let loaded = load_layered_yaml_from_strings(&["freshness:\n  dividends_hours: 5\n"]).unwrap();
    let err = Settings::from_config_json(&loaded.config_json).unwrap_err();
    assert!(format!("{err:#}").contains("dividends"));
}

#[test]
fn zero_hour_policy_is_rejected() {
    let loaded = load_layered_yaml_from_strings(&["freshness:\n  info_hours: 0\n"]).unwrap();
    assert!(Settings::from_config_json(&loaded.config_json).is_err());
}

#[test]
fn out_of_range_hours_are_rejected_not_panicking() {
    let yaml = format!("freshness:\n  price_hours: {}\n", i64::MAX);
    let loaded = load_layered_yaml_from_strings(&[yaml.as_str()]).unwrap();
    let err = Settings::from_config_json(&loaded.config_json).unwrap_err();
    assert!(err.to_string().contains("out of range"), "got: {err}");
}

#[test]
fn overlap_must_be_smaller_than_chunk() {
    let yaml = "indexing:\n  chunk_size: 100\n  chunk_overlap: 100\n";
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    assert!(Settings::from_config_json(&loaded.config_json).is_err());
}

#[test]
fn registry_seeds_are_normalized() {
    let yaml = r#"
registry:
  entities:
    - ticker: "orcl"
      jurisdiction: "us"
      cik: "0001341439"
    - ticker: "wipro"
      jurisdiction: "INDIA"
      scrip_code: " 507685 "
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let s = Settings::from_config_json(&loaded.config_json).unwrap();

    assert_eq!(s.registry.len(), 2);
    assert_eq!(s.registry[0].ticker.as_str(), "ORCL");
    assert_eq!(s.registry[0].jurisdiction, Jurisdiction::Us);
    assert_eq!(s.registry[1].identifiers.scrip_code.as_deref(), Some("507685"));
}
