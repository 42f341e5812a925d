use nexus_records::query::UnknownOperatorPolicy;
use nexus_records::{DbError, RecordsConfig};
use std::collections::HashMap;
use tempfile::tempdir;

#[test]
fn load_explicit_file_then_env_overrides() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.toml");
    std::fs::write(&path, "id_length = 10\nmax_take = 50\nlog_level = \"debug\"\n").unwrap();
    let mut cfg = RecordsConfig::load(Some(&path)).unwrap();
    assert_eq!(cfg.id_length, 10);
    assert_eq!(cfg.log_level.as_deref(), Some("debug"));

    let env: HashMap<&str, &str> = [("NEXUS_RECORDS_MAX_TAKE", "5"), ("NEXUS_RECORDS_LOG_DIR", "/tmp/x")].into();
    cfg.apply_env_from(|k| env.get(k).map(|v| (*v).to_string())).unwrap();
    assert_eq!(cfg.max_take, Some(5));
    assert_eq!(cfg.log_dir.as_deref(), Some(std::path::Path::new("/tmp/x")));
}

#[test]
fn missing_explicit_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = RecordsConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, DbError::Io(_)));
}

#[test]
fn malformed_toml_is_a_config_error() {
    assert!(matches!(RecordsConfig::from_toml_str("id_length = \"x\""), Err(DbError::Config(_))));
}

#[test]
fn bad_policy_override_is_rejected() {
    let mut cfg = RecordsConfig::default();
    let r = cfg.apply_env_from(|k| (k == "NEXUS_RECORDS_UNKNOWN_OPERATORS").then(|| "maybe".to_string()));
    assert!(r.is_err());
    assert_eq!(cfg.unknown_operators, UnknownOperatorPolicy::Ignore);
}

#[test]
fn init_builds_a_configured_service() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.toml");
    std::fs::write(&path, "id_length = 6\n").unwrap();
    let svc = nexus_records::init(Some(&path)).unwrap();
    assert_eq!(svc.config().id_length, 6);
    let rec = svc.create_json("c", r#"{"data":{"a":1}}"#).unwrap();
    assert_eq!(rec.get_str("_id").unwrap().len(), 6);
}
