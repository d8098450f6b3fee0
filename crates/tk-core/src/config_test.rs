use super::*;

#[test]
fn test_defaults_when_empty() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.database.url, "duckdb::memory:");
    assert!(config.database.schema.is_none());
    assert!(!config.database.skip_create);
    assert_eq!(config.migrations.extension, ".sql");
    assert_eq!(config.migrations.delimiter, ";");
    assert_eq!(config.migrations.empty_marker, "-- Empty migration");
    assert_eq!(config.tables.prefix, "jobrunr_");
    assert_eq!(config.tables.tracking, "jobrunr_migrations");
    assert_eq!(config.tables.required.len(), 4);
    assert!(config.tables.required.iter().any(|t| t == "jobrunr_jobs"));
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
database:
  url: duckdb:./jobs.duckdb
  user: jobs
  password: secret
  schema: app
  skip_create: true
migrations:
  paths: [migrations]
  overrides: [migrations/duckdb]
  delimiter: ";;"
tables:
  prefix: jr_
  tracking: jr_migrations
  required: [jr_jobs]
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.database.url, "duckdb:./jobs.duckdb");
    assert_eq!(config.database.user.as_deref(), Some("jobs"));
    assert_eq!(config.schema(), Some("app"));
    assert!(config.database.skip_create);
    assert_eq!(config.migrations.paths, vec!["migrations".to_string()]);
    assert_eq!(config.migrations.delimiter, ";;");
    assert_eq!(config.tables.prefix, "jr_");
    assert_eq!(config.tables.required, vec![TableName::new("jr_jobs")]);
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("database:\n  host: localhost\n");
    assert!(result.is_err());
}

#[test]
fn test_empty_table_name_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("tables:\n  tracking: \"\"\n");
    assert!(result.is_err());
}

#[test]
fn test_non_identifier_table_name_rejected() {
    let err = serde_yaml::from_str::<Config>("tables:\n  required: [\"jobs; DROP TABLE x\"]\n")
        .unwrap_err();
    assert!(err.to_string().contains("invalid table name"), "{err}");
}

#[test]
fn test_invalid_schema_rejected() {
    let config: Config = serde_yaml::from_str("database:\n  schema: \"app; DROP\"\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("E002"), "got: {err}");
}

#[test]
fn test_empty_schema_means_none() {
    let config: Config = serde_yaml::from_str("database:\n  schema: \"\"\n").unwrap();
    config.validate().unwrap();
    assert_eq!(config.schema(), None);
}

#[test]
fn test_empty_delimiter_rejected() {
    let config: Config = serde_yaml::from_str("migrations:\n  delimiter: \"\"\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_plain_identifier() {
    assert!(is_plain_identifier("app"));
    assert!(is_plain_identifier("_tenant_42"));
    assert!(!is_plain_identifier("42tenant"));
    assert!(!is_plain_identifier("app.sub"));
    assert!(!is_plain_identifier(""));
}

#[test]
fn test_load_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("tablekeeper.yml"),
        "database:\n  schema: app\n",
    )
    .unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.schema(), Some("app"));
}

#[test]
fn test_load_from_dir_yaml_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tablekeeper.yaml"), "{}\n").unwrap();
    assert!(Config::load_from_dir(dir.path()).is_ok());
}

#[test]
fn test_load_from_dir_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_or_default_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(dir.path()).unwrap();
    assert_eq!(config.tables.prefix, "jobrunr_");
}

#[test]
fn test_paths_resolved_against_root() {
    let config: Config =
        serde_yaml::from_str("migrations:\n  paths: [sql]\n  overrides: [sql/duckdb]\n").unwrap();
    let root = Path::new("/srv/jobs");
    assert_eq!(
        config.migration_paths_absolute(root),
        vec![PathBuf::from("/srv/jobs/sql")]
    );
    assert_eq!(
        config.override_paths_absolute(root),
        vec![PathBuf::from("/srv/jobs/sql/duckdb")]
    );
}
