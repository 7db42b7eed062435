use super::*;

#[test]
fn test_parse_minimal_config() {
    let config = Config::parse("connections:\n  test: duckdb://\n", Path::new("x")).unwrap();
    assert_eq!(config.parallel_workers, 4);
    assert!(!config.use_process);
    assert_eq!(config.checks_path, PathBuf::from("checks"));
    assert_eq!(config.default_load_mode, LoadMode::Truncate);
    assert_eq!(config.print_format, PrintFormat::Pandas);
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
connections:
  local: "duckdb:///local.duckdb"
  test: "duckdb://"
default_connection: test
parallel_workers: 2
use_process: true
log: logs/data_check.log
checks_path: tests/checks
lookups_path: tests/lookups
template_path: tests/template.yml
default_load_mode: upsert
print_format: json
traceback: true
"#;
    let config = Config::parse(yaml, Path::new("data_check.yml")).unwrap();
    assert_eq!(config.connections.len(), 2);
    assert_eq!(config.default_connection.as_deref(), Some("test"));
    assert_eq!(config.parallel_workers, 2);
    assert!(config.use_process);
    assert_eq!(config.default_load_mode, LoadMode::Upsert);
    assert_eq!(config.print_format, PrintFormat::Json);
    assert!(config.traceback);

    let root = PathBuf::from("/project");
    assert_eq!(
        config.checks_path_absolute(&root),
        PathBuf::from("/project/tests/checks")
    );
    assert_eq!(
        config.log_path_absolute(&root),
        Some(PathBuf::from("/project/logs/data_check.log"))
    );
}

#[test]
fn test_unknown_key_rejected() {
    let err = Config::parse("connection: x\n", Path::new("data_check.yml")).unwrap_err();
    assert!(err.to_string().contains("[C002]"));
}

#[test]
fn test_bad_load_mode_rejected() {
    let err = Config::parse("default_load_mode: merge\n", Path::new("data_check.yml"));
    assert!(err.is_err());
}

#[test]
fn test_default_connection_must_exist() {
    let yaml = "connections:\n  a: duckdb://\ndefault_connection: b\n";
    let err = Config::parse(yaml, Path::new("data_check.yml")).unwrap_err();
    assert!(matches!(err, CoreError::UnknownConnection { .. }));
}

#[test]
fn test_zero_workers_rejected() {
    let err = Config::parse("parallel_workers: 0\n", Path::new("data_check.yml")).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_connection_resolution() {
    let yaml = "connections:\n  a: duckdb:///a.db\n  b: duckdb:///b.db\ndefault_connection: a\n";
    let config = Config::parse(yaml, Path::new("data_check.yml")).unwrap();

    assert_eq!(
        config.connection(None).unwrap(),
        ("a".to_string(), "duckdb:///a.db".to_string())
    );
    assert_eq!(config.connection(Some("b")).unwrap().1, "duckdb:///b.db");
    assert!(matches!(
        config.connection(Some("c")),
        Err(CoreError::UnknownConnection { .. })
    ));
}

#[test]
fn test_single_connection_is_implicit_default() {
    let config = Config::parse("connections:\n  only: duckdb://\n", Path::new("x")).unwrap();
    assert_eq!(config.connection(None).unwrap().0, "only");
}

#[test]
fn test_no_default_connection() {
    let yaml = "connections:\n  a: duckdb://\n  b: duckdb://\n";
    let config = Config::parse(yaml, Path::new("x")).unwrap();
    assert!(matches!(
        config.connection(None),
        Err(CoreError::NoDefaultConnection)
    ));
}

#[test]
fn test_print_format_from_str() {
    assert_eq!("CSV".parse::<PrintFormat>().unwrap(), PrintFormat::Csv);
    assert_eq!("table".parse::<PrintFormat>().unwrap(), PrintFormat::Pandas);
    assert!("xml".parse::<PrintFormat>().is_err());
}
