//! End-to-end migration runs against DuckDB.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tk_core::{MigrationState, TableName};
use tk_db::{Connection, ConnectionSource, DuckDbSource};
use tk_migrate::{
    DatabaseOptions, DirectoryMigrationSource, EmbeddedMigrationSource, MigrateError,
    MigrationRunner, MigratorSettings, StaticMigrationSource,
};

const TRACKING_DDL: &str = "CREATE TABLE jobrunr_migrations (id VARCHAR(36) PRIMARY KEY, script_name VARCHAR(64) NOT NULL, applied_at VARCHAR(29) NOT NULL)";

fn memory() -> Arc<DuckDbSource> {
    Arc::new(DuckDbSource::in_memory().unwrap())
}

fn runner(
    db: &Arc<DuckDbSource>,
    migrations: impl tk_migrate::MigrationSource + 'static,
    settings: MigratorSettings,
) -> MigrationRunner {
    MigrationRunner::new(db.clone(), Box::new(migrations), settings).unwrap()
}

fn tracked_names(conn: &dyn Connection, table: &str) -> Vec<String> {
    conn.query_rows(
        &format!("SELECT script_name FROM {table} ORDER BY applied_at, script_name"),
        &[],
    )
    .unwrap()
    .into_iter()
    .map(|row| row[0].clone())
    .collect()
}

fn count(conn: &dyn Connection, sql: &str) -> i64 {
    conn.query_count(sql, &[]).unwrap()
}

fn init_and_add_col() -> StaticMigrationSource {
    StaticMigrationSource::default()
        .with(
            "002_add_col.sql",
            "ALTER TABLE jobrunr_jobs ADD COLUMN recurring_job_id VARCHAR(128)",
        )
        .with(
            "001_init.sql",
            &format!("{TRACKING_DDL};\nCREATE TABLE jobrunr_jobs (id VARCHAR(36) NOT NULL);"),
        )
}

#[test]
fn test_out_of_order_source_applies_in_name_order() {
    let db = memory();
    let report = runner(&db, init_and_add_col(), MigratorSettings::default())
        .run_migrations()
        .unwrap();
    assert_eq!(report.applied, vec!["001_init.sql", "002_add_col.sql"]);

    let conn = db.connect().unwrap();
    assert_eq!(
        tracked_names(conn.as_ref(), "jobrunr_migrations"),
        vec!["001_init.sql", "002_add_col.sql"]
    );
    assert_eq!(
        count(
            conn.as_ref(),
            "SELECT COUNT(*) FROM information_schema.columns \
             WHERE table_name = 'jobrunr_jobs' AND column_name = 'recurring_job_id'"
        ),
        1
    );
}

#[test]
fn test_second_run_is_a_no_op() {
    let db = memory();
    let runner = runner(&db, init_and_add_col(), MigratorSettings::default());
    runner.run_migrations().unwrap();

    let report = runner.run_migrations().unwrap();
    assert!(report.applied.is_empty());
    assert_eq!(report.skipped, vec!["001_init.sql", "002_add_col.sql"]);

    let conn = db.connect().unwrap();
    assert_eq!(count(conn.as_ref(), "SELECT COUNT(*) FROM jobrunr_migrations"), 2);
}

#[test]
fn test_application_order_is_observable() {
    let db = memory();
    let migrations = StaticMigrationSource::default()
        .with(
            "c.sql",
            "INSERT INTO jobrunr_order VALUES (nextval('jobrunr_seq'), 'c')",
        )
        .with(
            "a.sql",
            &format!(
                "{TRACKING_DDL}; CREATE SEQUENCE jobrunr_seq; CREATE TABLE jobrunr_order (step INTEGER, name VARCHAR)"
            ),
        )
        .with(
            "b.sql",
            "INSERT INTO jobrunr_order VALUES (nextval('jobrunr_seq'), 'b')",
        );
    runner(&db, migrations, MigratorSettings::default())
        .run_migrations()
        .unwrap();

    let conn = db.connect().unwrap();
    let rows = conn
        .query_rows("SELECT name FROM jobrunr_order ORDER BY step", &[])
        .unwrap();
    assert_eq!(rows, vec![vec!["b".to_string()], vec!["c".to_string()]]);
}

#[test]
fn test_empty_migration_is_recorded_only() {
    let db = memory();
    let migrations = StaticMigrationSource::default()
        .with("001_init.sql", TRACKING_DDL)
        .with(
            "002_index.sql",
            "-- Empty migration: replaced for this database\nCREATE TABLE jobrunr_never (id INT)",
        );
    runner(&db, migrations, MigratorSettings::default())
        .run_migrations()
        .unwrap();

    let conn = db.connect().unwrap();
    assert_eq!(
        tracked_names(conn.as_ref(), "jobrunr_migrations").len(),
        2
    );
    let err = conn
        .query_count("SELECT COUNT(*) FROM jobrunr_never", &[])
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_failed_migration_leaves_no_trace() {
    let db = memory();
    let migrations = StaticMigrationSource::default()
        .with("001_init.sql", TRACKING_DDL)
        .with(
            "002_broken.sql",
            "CREATE TABLE jobrunr_a (id INT);\n\
             CREATE TABLE jobrunr_b (id INT);\n\
             INSERT INTO jobrunr_missing VALUES (1);",
        )
        .with("003_later.sql", "CREATE TABLE jobrunr_later (id INT)");

    let err = runner(&db, migrations, MigratorSettings::default())
        .run_migrations()
        .unwrap_err();
    match &err {
        MigrateError::Execution {
            name, statement, ..
        } => {
            assert_eq!(name, "002_broken.sql");
            assert_eq!(*statement, 3);
        }
        other => panic!("unexpected error: {other}"),
    }

    let conn = db.connect().unwrap();
    assert_eq!(
        tracked_names(conn.as_ref(), "jobrunr_migrations"),
        vec!["001_init.sql"]
    );
    for table in ["jobrunr_a", "jobrunr_b", "jobrunr_later"] {
        let err = conn
            .query_count(&format!("SELECT COUNT(*) FROM {table}"), &[])
            .unwrap_err();
        assert!(err.is_not_found(), "{table} should not exist");
    }
}

#[test]
fn test_bundled_migrations_create_required_tables() {
    let db = memory();
    let runner = runner(&db, EmbeddedMigrationSource, MigratorSettings::default());

    assert!(matches!(
        runner.validate_tables(),
        Err(MigrateError::TablesMissing)
    ));
    let report = runner.prepare(DatabaseOptions::Create).unwrap();
    assert_eq!(report.applied.len(), 7);
    assert_eq!(report.applied[0], "v000__create_migrations_table.sql");
    runner.validate_tables().unwrap();

    let conn = db.connect().unwrap();
    assert_eq!(
        count(
            conn.as_ref(),
            "SELECT COUNT(*) FROM jobrunr_metadata WHERE id = 'succeeded-jobs-counter-cluster'"
        ),
        1
    );
    assert_eq!(
        count(
            conn.as_ref(),
            "SELECT COUNT(*) FROM jobrunr_jobs WHERE recurring_job_id IS NULL"
        ),
        0
    );
}

#[test]
fn test_schema_qualified_end_to_end() {
    let db = memory();
    db.connect()
        .unwrap()
        .execute_batch("CREATE SCHEMA app")
        .unwrap();
    let settings = MigratorSettings::default().with_schema(Some("app"));
    let runner = runner(&db, EmbeddedMigrationSource, settings);

    runner.run_migrations().unwrap();
    runner.validate_tables().unwrap();

    let conn = db.connect().unwrap();
    assert_eq!(
        tracked_names(conn.as_ref(), "app.jobrunr_migrations").len(),
        7
    );
    assert_eq!(count(conn.as_ref(), "SELECT COUNT(*) FROM app.jobrunr_metadata"), 1);
    assert_eq!(
        count(
            conn.as_ref(),
            "SELECT COUNT(*) FROM duckdb_indexes() \
             WHERE schema_name = 'app' AND index_name = 'jobrunr_job_state_idx'"
        ),
        1
    );
    let err = conn
        .query_count("SELECT COUNT(*) FROM main.jobrunr_jobs", &[])
        .unwrap_err();
    assert!(err.is_not_found());

    let report = runner.run_migrations().unwrap();
    assert!(report.applied.is_empty());
}

#[test]
fn test_index_migration_under_schema() {
    let db = memory();
    db.connect()
        .unwrap()
        .execute_batch("CREATE SCHEMA app")
        .unwrap();
    let migrations = StaticMigrationSource::default().with(
        "001_init.sql",
        &format!(
            "{TRACKING_DDL};\n\
             CREATE TABLE jobrunr_jobs (id VARCHAR(36) NOT NULL, state VARCHAR(36));\n\
             CREATE INDEX jobrunr_state_idx ON jobrunr_jobs (state);"
        ),
    );
    let settings = MigratorSettings::default().with_schema(Some("app"));

    let report = runner(&db, migrations, settings).run_migrations().unwrap();
    assert_eq!(report.applied, vec!["001_init.sql"]);

    let conn = db.connect().unwrap();
    assert_eq!(
        count(
            conn.as_ref(),
            "SELECT COUNT(*) FROM duckdb_indexes() \
             WHERE schema_name = 'app' AND index_name = 'jobrunr_state_idx'"
        ),
        1
    );
}

#[test]
fn test_skip_create_validates_without_migrating() {
    let db = memory();
    let runner = runner(&db, EmbeddedMigrationSource, MigratorSettings::default());

    assert!(matches!(
        runner.prepare(DatabaseOptions::SkipCreate),
        Err(MigrateError::TablesMissing)
    ));
    let conn = db.connect().unwrap();
    assert!(conn
        .query_count("SELECT COUNT(*) FROM jobrunr_migrations", &[])
        .unwrap_err()
        .is_not_found());

    runner.prepare(DatabaseOptions::Create).unwrap();
    let report = runner.prepare(DatabaseOptions::SkipCreate).unwrap();
    assert!(report.applied.is_empty());
}

#[test]
fn test_status_tracks_progress() {
    let db = memory();
    let runner = runner(&db, init_and_add_col(), MigratorSettings::default());

    let before = runner.status().unwrap();
    assert_eq!(before.len(), 2);
    assert!(before.iter().all(|s| s.state == MigrationState::Pending));

    runner.run_migrations().unwrap();
    let after = runner.status().unwrap();
    assert!(after.iter().all(|s| s.state == MigrationState::Applied));
    assert!(after.iter().all(|s| s.applied_at.is_some()));
}

#[test]
fn test_custom_required_tables() {
    let db = memory();
    let settings =
        MigratorSettings::default().with_required_tables(vec![TableName::new("jobrunr_jobs")]);
    let runner = runner(&db, init_and_add_col(), settings);
    runner.run_migrations().unwrap();
    runner.validate_tables().unwrap();
}

fn write(dir: &Path, name: &str, sql: &str) {
    fs::write(dir.join(name), sql).unwrap();
}

#[test]
fn test_directory_source_with_overrides() {
    let base = tempfile::tempdir().unwrap();
    let variant = tempfile::tempdir().unwrap();
    write(base.path(), "v000__tracking.sql", TRACKING_DDL);
    write(base.path(), "v001__jobs.sql", "CREATE TABLE jobrunr_jobs (id INT)");
    write(
        base.path(),
        "v002__index.sql",
        "CREATE INDEX jobrunr_jobs_id_idx ON jobrunr_jobs (id)",
    );
    write(base.path(), "README.md", "migrations live here");
    write(
        variant.path(),
        "v002__index.sql",
        "-- Empty migration: no index for this variant",
    );

    let source = DirectoryMigrationSource::new(vec![base.path().to_path_buf()])
        .with_overrides(vec![variant.path().to_path_buf()]);
    let data = tempfile::tempdir().unwrap();
    let db = Arc::new(DuckDbSource::from_path(&data.path().join("jobs.duckdb")).unwrap());
    let report = runner(&db, source, MigratorSettings::default())
        .run_migrations()
        .unwrap();

    assert_eq!(
        report.applied,
        vec!["v000__tracking.sql", "v001__jobs.sql", "v002__index.sql"]
    );
    assert_eq!(report.ignored, vec!["README.md"]);
    let conn = db.connect().unwrap();
    assert_eq!(
        count(
            conn.as_ref(),
            "SELECT COUNT(*) FROM duckdb_indexes() WHERE index_name = 'jobrunr_jobs_id_idx'"
        ),
        0
    );
}

#[test]
fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.duckdb");
    {
        let db = Arc::new(DuckDbSource::from_path(&path).unwrap());
        runner(&db, init_and_add_col(), MigratorSettings::default())
            .run_migrations()
            .unwrap();
    }
    let db = Arc::new(DuckDbSource::from_path(&path).unwrap());
    let report = runner(&db, init_and_add_col(), MigratorSettings::default())
        .run_migrations()
        .unwrap();
    assert!(report.applied.is_empty());
    assert_eq!(report.skipped.len(), 2);
}
