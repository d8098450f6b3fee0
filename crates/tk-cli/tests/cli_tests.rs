//! End-to-end tests of the `tk` binary against DuckDB files.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// Path to the compiled tk binary (resolved at compile time)
fn tk_bin() -> String {
    env!("CARGO_BIN_EXE_tk").to_string()
}

/// Run `tk` in `dir` with the connection environment cleared.
fn tk(dir: &Path, args: &[&str]) -> Output {
    Command::new(tk_bin())
        .current_dir(dir)
        .args(args)
        .env_remove("TK_DATABASE_URL")
        .env_remove("TK_DATABASE_USER")
        .env_remove("TK_DATABASE_PASSWORD")
        .env_remove("TK_DATABASE_SCHEMA")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run tk")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_migrate_bundled_into_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = tk(dir.path(), &["--url", "duckdb:jobs.duckdb", "migrate"]);

    let out = stdout(&output);
    assert!(output.status.success(), "stdout: {out}\nstderr: {}", stderr(&output));
    assert!(out.contains("Tablekeeper Table Creator"));
    assert!(out.contains("Applied  v000__create_migrations_table.sql"));
    assert!(out.contains("Applied  v006__create_job_state_index.sql"));
    assert!(out.contains("Successfully created all tables!"));
    assert!(dir.path().join("jobs.duckdb").exists());
}

#[test]
fn test_second_migrate_applies_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let first = tk(dir.path(), &["--url", "duckdb:jobs.duckdb", "migrate"]);
    assert!(first.status.success(), "{}", stdout(&first));

    let second = tk(dir.path(), &["--url", "duckdb:jobs.duckdb", "migrate"]);
    let out = stdout(&second);
    assert!(second.status.success(), "{out}");
    assert!(!out.contains("Applied "));
    assert!(out.contains("Successfully created all tables!"));
}

#[test]
fn test_skip_create_on_empty_database_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = tk(
        dir.path(),
        &["--url", "duckdb:jobs.duckdb", "migrate", "--skip-create"],
    );

    let out = stdout(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(out.contains("An error occurred:"), "{out}");
    assert!(out.contains("Not all required tables are available"), "{out}");
    assert!(!out.contains("Successfully created all tables!"));
}

#[test]
fn test_validate_after_migrate() {
    let dir = tempfile::tempdir().unwrap();
    let before = tk(dir.path(), &["--url", "duckdb:jobs.duckdb", "validate"]);
    assert!(!before.status.success());
    assert!(stderr(&before).contains("[M006]"), "{}", stderr(&before));

    let migrate = tk(dir.path(), &["--url", "duckdb:jobs.duckdb", "migrate"]);
    assert!(migrate.status.success(), "{}", stdout(&migrate));

    let after = tk(dir.path(), &["--url", "duckdb:jobs.duckdb", "validate"]);
    assert!(after.status.success(), "{}", stderr(&after));
    assert!(stdout(&after).contains("All 4 required tables are available"));
}

#[test]
fn test_status_json() {
    let dir = tempfile::tempdir().unwrap();
    let migrate = tk(dir.path(), &["--url", "duckdb:jobs.duckdb", "migrate"]);
    assert!(migrate.status.success(), "{}", stdout(&migrate));

    let output = tk(dir.path(), &["--url", "duckdb:jobs.duckdb", "status", "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let statuses: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let statuses = statuses.as_array().unwrap();
    assert_eq!(statuses.len(), 7);
    assert_eq!(statuses[0]["name"], "v000__create_migrations_table.sql");
    assert!(statuses.iter().all(|s| s["state"] == "applied"));
}

#[test]
fn test_status_table_on_fresh_database() {
    let dir = tempfile::tempdir().unwrap();
    let output = tk(dir.path(), &["--url", "duckdb:jobs.duckdb", "status"]);

    let out = stdout(&output);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(out.contains("MIGRATION"));
    assert!(out.contains("0 applied, 7 pending"), "{out}");
}

#[test]
fn test_config_file_with_schema_and_directories() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("migrations");
    let variant = dir.path().join("duckdb");
    fs::create_dir_all(&base).unwrap();
    fs::create_dir_all(&variant).unwrap();
    fs::write(
        base.join("001_init.sql"),
        "CREATE SCHEMA app;\n\
         CREATE TABLE jobrunr_migrations (id VARCHAR(36), script_name VARCHAR(64), applied_at VARCHAR(29));\n\
         CREATE TABLE jobrunr_jobs (id VARCHAR(36));",
    )
    .unwrap();
    fs::write(
        base.join("002_index.sql"),
        "CREATE INDEX jobrunr_jobs_idx ON jobrunr_jobs (id);",
    )
    .unwrap();
    fs::write(variant.join("002_index.sql"), "-- Empty migration").unwrap();
    fs::write(
        dir.path().join("tablekeeper.yml"),
        "database:\n  url: \"duckdb:jobs.duckdb\"\n  schema: app\n\
         migrations:\n  paths: [migrations]\n  overrides: [duckdb]\n\
         tables:\n  required: [jobrunr_jobs]\n",
    )
    .unwrap();

    let output = tk(dir.path(), &["migrate"]);
    let out = stdout(&output);
    assert!(output.status.success(), "{out}");
    assert!(out.contains("Applied  001_init.sql"));
    assert!(out.contains("Applied  002_index.sql"));

    let validate = tk(dir.path(), &["validate"]);
    assert!(validate.status.success(), "{}", stderr(&validate));
    assert!(stdout(&validate).contains("All 1 required tables are available"));

    // The tables live in `app`, so validating the default schema fails.
    let unqualified = tk(dir.path(), &["--schema", "", "validate"]);
    assert!(!unqualified.status.success());
}

#[test]
fn test_unsupported_url_scheme() {
    let dir = tempfile::tempdir().unwrap();
    let output = tk(
        dir.path(),
        &["--url", "postgres://localhost/jobs", "--user", "jobs", "migrate"],
    );

    let out = stdout(&output);
    assert!(!output.status.success());
    assert!(out.contains("An error occurred:"));
    assert!(out.contains("[D005]"), "{out}");
}

#[test]
fn test_invalid_schema_flag() {
    let dir = tempfile::tempdir().unwrap();
    let output = tk(dir.path(), &["--schema", "app;drop", "migrate"]);

    let out = stdout(&output);
    assert!(!output.status.success());
    assert!(out.contains("Invalid configuration"), "{out}");
}

#[test]
fn test_url_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(tk_bin())
        .current_dir(dir.path())
        .arg("migrate")
        .env("TK_DATABASE_URL", "duckdb:from_env.duckdb")
        .env_remove("TK_DATABASE_SCHEMA")
        .output()
        .expect("Failed to run tk");

    assert!(output.status.success(), "{}", stdout(&output));
    assert!(dir.path().join("from_env.duckdb").exists());
}
