//! The migration runner.
//!
//! Orders the recognized migrations by name, skips the ones already tracked,
//! and applies the rest one at a time. A migration's statements and its
//! tracking record share one connection and one transaction.

use crate::error::{MigrateError, MigrateResult};
use crate::settings::MigratorSettings;
use crate::source::MigrationSource;
use crate::tracker::MigrationTracker;
use crate::validator::TableValidator;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tk_core::{MigrationDescriptor, MigrationName, MigrationState};
use tk_db::{ConnectionSource, Transaction};
use tk_sql::{split_statements, SchemaQualifier};

/// What `prepare` does with the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatabaseOptions {
    /// Apply pending migrations
    #[default]
    Create,
    /// Only check that the required tables exist
    SkipCreate,
}

/// Outcome of one `run_migrations` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Applied by this run, in application order
    pub applied: Vec<MigrationName>,
    /// Already tracked before this run
    pub skipped: Vec<MigrationName>,
    /// Source entries without the migration extension
    pub ignored: Vec<MigrationName>,
}

/// One recognized migration and whether it has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub name: MigrationName,
    pub state: MigrationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<String>,
}

/// Applies migrations from a source against a database.
pub struct MigrationRunner {
    connections: Arc<dyn ConnectionSource>,
    migrations: Box<dyn MigrationSource>,
    settings: MigratorSettings,
    qualifier: SchemaQualifier,
    tracker: MigrationTracker,
    validator: TableValidator,
    /// State each migration reached in this runner's runs
    run_states: Mutex<HashMap<MigrationName, MigrationState>>,
}

impl MigrationRunner {
    /// Create a runner. Fails when the settings are unusable.
    pub fn new(
        connections: Arc<dyn ConnectionSource>,
        migrations: Box<dyn MigrationSource>,
        settings: MigratorSettings,
    ) -> MigrateResult<Self> {
        settings.validate()?;
        let qualifier = settings.qualifier();
        let tracker = MigrationTracker::new(
            Arc::clone(&connections),
            &qualifier,
            &settings.tracking_table,
        );
        let validator = TableValidator::new(
            Arc::clone(&connections),
            &qualifier,
            &settings.required_tables,
        );
        Ok(Self {
            connections,
            migrations,
            settings,
            qualifier,
            tracker,
            validator,
            run_states: Mutex::new(HashMap::new()),
        })
    }

    pub fn settings(&self) -> &MigratorSettings {
        &self.settings
    }

    pub fn tracker(&self) -> &MigrationTracker {
        &self.tracker
    }

    /// Apply every pending migration in name order.
    ///
    /// Stops at the first failure. Migrations applied before the failure
    /// stay applied; the failing one leaves neither schema changes nor a
    /// tracking record behind.
    pub fn run_migrations(&self) -> MigrateResult<MigrationReport> {
        let (pending, ignored) = self.recognized()?;
        let mut report = MigrationReport {
            ignored,
            ..MigrationReport::default()
        };

        for migration in &pending {
            if self.tracker.is_applied(migration.name())? {
                log::debug!("Migration {} already applied", migration.name());
                report.skipped.push(migration.name().clone());
                continue;
            }
            self.transition(migration.name(), MigrationState::Applying);
            if let Err(err) = self.apply(migration) {
                self.transition(migration.name(), MigrationState::Failed);
                return Err(err);
            }
            self.transition(migration.name(), MigrationState::Applied);
            report.applied.push(migration.name().clone());
        }

        log::info!(
            "Migrations done: {} applied, {} already applied",
            report.applied.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Check that every required table can be queried.
    pub fn validate_tables(&self) -> MigrateResult<()> {
        self.validator.validate_tables()
    }

    /// Create the tables, or only validate them with
    /// [`DatabaseOptions::SkipCreate`].
    pub fn prepare(&self, options: DatabaseOptions) -> MigrateResult<MigrationReport> {
        match options {
            DatabaseOptions::Create => self.run_migrations(),
            DatabaseOptions::SkipCreate => {
                self.validate_tables()?;
                Ok(MigrationReport::default())
            }
        }
    }

    /// Every recognized migration in application order with its state.
    ///
    /// Tracked migrations are applied. Untracked ones report the state this
    /// runner last left them in, so a migration that failed stays failed
    /// until a later run applies it.
    pub fn status(&self) -> MigrateResult<Vec<MigrationStatus>> {
        let (migrations, _) = self.recognized()?;
        let mut applied: HashMap<MigrationName, String> = self
            .tracker
            .applied_records()?
            .into_iter()
            .map(|record| (record.name, record.applied_at))
            .collect();
        let run_states = self.run_states.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(migrations
            .into_iter()
            .map(|migration| {
                let applied_at = applied.remove(migration.name());
                let state = if applied_at.is_some() {
                    MigrationState::Applied
                } else {
                    match run_states.get(migration.name()) {
                        Some(state @ (MigrationState::Applying | MigrationState::Failed)) => *state,
                        _ => MigrationState::Pending,
                    }
                };
                MigrationStatus {
                    name: migration.name().clone(),
                    state,
                    applied_at,
                }
            })
            .collect())
    }

    /// Recognized migrations sorted by name, and the names of ignored
    /// entries.
    fn recognized(&self) -> MigrateResult<(Vec<MigrationDescriptor>, Vec<MigrationName>)> {
        let mut recognized = Vec::new();
        let mut ignored = Vec::new();
        for migration in self.migrations.migrations()? {
            if migration.name().has_extension(&self.settings.extension) {
                recognized.push(migration);
            } else {
                log::debug!("Ignoring {}: not a migration script", migration.name());
                ignored.push(migration.name().clone());
            }
        }
        ignored.sort();

        let mut seen: HashMap<MigrationName, usize> = HashMap::new();
        for (position, migration) in recognized.iter().enumerate() {
            if let Some(first) = seen.insert(migration.name().clone(), position) {
                return Err(MigrateError::DuplicateMigration {
                    name: migration.name().clone(),
                    first: format!("entry {}", first + 1),
                    second: format!("entry {}", position + 1),
                });
            }
        }

        recognized.sort_by(|a, b| a.name().cmp(b.name()));
        Ok((recognized, ignored))
    }

    fn transition(&self, name: &MigrationName, next: MigrationState) {
        let mut states = self.run_states.lock().unwrap_or_else(PoisonError::into_inner);
        let current = states.get(name).copied().unwrap_or(MigrationState::Pending);
        if current.can_transition_to(next) {
            log::debug!("Migration {name}: {current} -> {next}");
        } else {
            log::warn!("Migration {name}: unexpected transition {current} -> {next}");
        }
        states.insert(name.clone(), next);
    }

    fn apply(&self, migration: &MigrationDescriptor) -> MigrateResult<()> {
        let name = migration.name();
        let conn = self
            .connections
            .connect()
            .map_err(|source| MigrateError::Connection {
                context: format!("migration {name}"),
                source,
            })?;
        log::info!("Running migration {name} on {}", conn.db_type());

        let tx = Transaction::begin(conn.as_ref()).map_err(|source| MigrateError::Transaction {
            name: name.clone(),
            source,
        })?;

        if migration.is_empty_migration(&self.settings.empty_marker) {
            log::debug!("Migration {name} is empty, recording only");
        } else {
            let statements = split_statements(migration.sql(), &self.settings.delimiter);
            for (index, statement) in statements.into_iter().enumerate() {
                let number = index + 1;
                let sql = self
                    .qualifier
                    .qualify(statement)
                    .map_err(|source| MigrateError::Qualify {
                        name: name.clone(),
                        statement: number,
                        source,
                    })?;
                log::debug!("Migration {name}, statement {number}: {sql}");
                tx.connection()
                    .execute_batch(&sql)
                    .map_err(|source| MigrateError::Execution {
                        name: name.clone(),
                        statement: number,
                        source,
                    })?;
            }
        }

        self.tracker
            .record_applied(tx.connection(), name)
            .map_err(|source| MigrateError::Recording {
                name: name.clone(),
                source,
            })?;
        tx.commit().map_err(|source| MigrateError::Transaction {
            name: name.clone(),
            source,
        })?;

        log::info!("Migration {name} applied");
        Ok(())
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
