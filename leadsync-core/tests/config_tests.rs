//! Config resolution tests: YAML file, environment overlay, and error messages.
//!
//! The environment is always simulated with a lookup closure; tests never
//! touch the real process environment or `~/.leadsync`.

use std::collections::HashMap;
use std::time::Duration;

use assert_fs::prelude::*;
use leadsync_core::{
    config::{self, ConfigFile},
    ConfigError, CustomFieldId, SyncConfig,
};
use predicates::prelude::predicate;
use rstest::rstest;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

fn full_env() -> Vec<(&'static str, &'static str)> {
    vec![
        (config::AIRTABLE_API_KEY, "patAIRTABLEKEY123"),
        (config::AIRTABLE_BASE_ID, "appBase"),
        (config::AIRTABLE_TABLE_NAME, "Leads"),
        (config::CLICKUP_API_KEY, "pk_CLICKUPKEY456"),
        (config::CLICKUP_LIST_ID, "901"),
        (config::CLICKUP_CUSTOM_FIELD_ID, "cf-airtable-id"),
    ]
}

const FULL_YAML: &str = r#"
airtable:
  api_key: patFROMFILE0001
  base_id: appFile
  table_name: FileLeads
  rate_limit_pause_secs: 1
clickup:
  api_key: pk_FROMFILE0002
  list_id: "777"
  custom_field_id: cf-file
  base_url: http://localhost:8080/api/v2/
sync:
  window_minutes: 15
"#;

// ---------------------------------------------------------------------------
// 1. Environment only
// ---------------------------------------------------------------------------

#[test]
fn environment_alone_is_sufficient_and_defaults_apply() {
    let cfg = SyncConfig::resolve(ConfigFile::default(), lookup(&full_env())).expect("resolve");

    assert_eq!(cfg.airtable.base_id, "appBase");
    assert_eq!(cfg.airtable.base_url, config::DEFAULT_AIRTABLE_BASE_URL);
    assert_eq!(cfg.airtable.rate_limit_pause, Duration::from_secs(5));
    assert_eq!(cfg.clickup.custom_field_id, CustomFieldId::from("cf-airtable-id"));
    assert_eq!(cfg.clickup.base_url, config::DEFAULT_CLICKUP_BASE_URL);
    assert_eq!(cfg.clickup.rate_limit_pause, Duration::from_secs(10));
    assert_eq!(cfg.sync.window_minutes, 60);
}

#[rstest]
#[case(config::AIRTABLE_API_KEY)]
#[case(config::AIRTABLE_BASE_ID)]
#[case(config::AIRTABLE_TABLE_NAME)]
#[case(config::CLICKUP_API_KEY)]
#[case(config::CLICKUP_LIST_ID)]
#[case(config::CLICKUP_CUSTOM_FIELD_ID)]
fn each_required_key_is_reported_when_missing(#[case] missing: &'static str) {
    let pairs: Vec<_> = full_env().into_iter().filter(|(k, _)| *k != missing).collect();
    let err = SyncConfig::resolve(ConfigFile::default(), lookup(&pairs)).unwrap_err();
    match err {
        ConfigError::Missing { key } => assert_eq!(key, missing),
        other => panic!("expected Missing, got: {other}"),
    }
}

#[test]
fn blank_required_value_counts_as_missing() {
    let mut pairs = full_env();
    pairs.retain(|(k, _)| *k != config::CLICKUP_CUSTOM_FIELD_ID);
    pairs.push((config::CLICKUP_CUSTOM_FIELD_ID, "  "));
    let err = SyncConfig::resolve(ConfigFile::default(), lookup(&pairs)).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Missing {
            key: config::CLICKUP_CUSTOM_FIELD_ID
        }
    ));
}

#[rstest]
#[case(config::WINDOW_MINUTES, "soon")]
#[case(config::WINDOW_MINUTES, "0")]
#[case(config::CLICKUP_RATE_LIMIT_PAUSE_SECS, "-3")]
fn unusable_numbers_are_invalid(#[case] key: &'static str, #[case] value: &'static str) {
    let mut pairs = full_env();
    pairs.push((key, value));
    let err = SyncConfig::resolve(ConfigFile::default(), lookup(&pairs)).unwrap_err();
    assert!(
        matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
        "got: {err}"
    );
}

// ---------------------------------------------------------------------------
// 2. File + environment layering
// ---------------------------------------------------------------------------

#[test]
fn file_alone_is_sufficient() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".leadsync/config.yaml")
        .write_str(FULL_YAML)
        .expect("write config");

    let cfg = SyncConfig::load_at(home.path(), None, lookup(&[])).expect("load");
    assert_eq!(cfg.airtable.table_name, "FileLeads");
    assert_eq!(cfg.airtable.rate_limit_pause, Duration::from_secs(1));
    assert_eq!(cfg.clickup.list_id, "777");
    assert_eq!(cfg.clickup.base_url, "http://localhost:8080/api/v2");
    assert_eq!(cfg.sync.window_minutes, 15);
}

#[test]
fn environment_overrides_file() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".leadsync/config.yaml")
        .write_str(FULL_YAML)
        .expect("write config");

    let cfg = SyncConfig::load_at(
        home.path(),
        None,
        lookup(&[
            (config::CLICKUP_LIST_ID, "override"),
            (config::WINDOW_MINUTES, "90"),
        ]),
    )
    .expect("load");
    assert_eq!(cfg.clickup.list_id, "override");
    assert_eq!(cfg.sync.window_minutes, 90);
    assert_eq!(cfg.airtable.base_id, "appFile", "untouched keys come from file");
}

#[test]
fn missing_default_file_is_not_an_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let cfg = SyncConfig::load_at(home.path(), None, lookup(&full_env())).expect("load");
    assert_eq!(cfg.airtable.table_name, "Leads");
    home.child(".leadsync").assert(predicate::path::missing());
}

#[test]
fn missing_explicit_file_is_an_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let explicit = home.path().join("nope.yaml");
    let err = SyncConfig::load_at(home.path(), Some(&explicit), lookup(&full_env())).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("nope.yaml"));
}

#[test]
fn malformed_yaml_reports_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let file = home.child("bad.yaml");
    file.write_str("airtable: [unclosed").expect("write");

    let err = SyncConfig::load_at(home.path(), Some(file.path()), lookup(&full_env())).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("bad.yaml"));
}

#[test]
fn unknown_keys_are_rejected() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let file = home.child("typo.yaml");
    file.write_str("clickup:\n  custom_feild_id: cf\n").expect("write");

    let err = SyncConfig::load_at(home.path(), Some(file.path()), lookup(&full_env())).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 3. Redaction
// ---------------------------------------------------------------------------

#[test]
fn redacted_view_never_contains_keys() {
    let cfg = SyncConfig::resolve(ConfigFile::default(), lookup(&full_env())).expect("resolve");
    let json = serde_json::to_string(&cfg.redacted()).expect("serialize");
    assert!(!json.contains("patAIRTABLEKEY123"));
    assert!(!json.contains("pk_CLICKUPKEY456"));
    assert!(json.contains("cf-airtable-id"));
}
