//! Error types for the migration core.

use thiserror::Error;
use tk_core::{InvalidName, MigrationName};
use tk_db::DbError;
use tk_sql::SqlError;

/// Migration errors. Every variant except `TrackingQuery` on a missing
/// tracking table is fatal to the run.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// No connection could be acquired (M001).
    #[error("[M001] Could not acquire a database connection for {context}")]
    Connection {
        context: String,
        #[source]
        source: DbError,
    },

    /// A statement of a migration failed (M002).
    #[error("[M002] Error running database migration {name} (statement {statement})")]
    Execution {
        name: MigrationName,
        statement: usize,
        #[source]
        source: DbError,
    },

    /// The tracking record could not be inserted (M003).
    #[error("[M003] Error recording database migration {name} as applied")]
    Recording {
        name: MigrationName,
        #[source]
        source: DbError,
    },

    /// BEGIN or COMMIT failed for a migration (M004).
    #[error("[M004] Transaction failed for database migration {name}")]
    Transaction {
        name: MigrationName,
        #[source]
        source: DbError,
    },

    /// The tracking table exists but could not be queried (M005).
    #[error("[M005] Could not determine whether migration {name} was applied")]
    TrackingQuery {
        name: MigrationName,
        #[source]
        source: DbError,
    },

    /// At least one required table is not queryable (M006).
    #[error("[M006] Not all required tables are available")]
    TablesMissing,

    /// A statement could not be schema-qualified (M007).
    #[error("[M007] Could not qualify statement {statement} of migration {name}")]
    Qualify {
        name: MigrationName,
        statement: usize,
        #[source]
        source: SqlError,
    },

    /// A migration directory or script could not be read (M008).
    #[error("[M008] Failed to load migrations from '{path}'")]
    Source {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The same script name was supplied twice (M009).
    #[error("[M009] Duplicate migration {name}: found in '{first}' and '{second}'")]
    DuplicateMigration {
        name: MigrationName,
        first: String,
        second: String,
    },

    /// The tracking table could not be listed (M010).
    #[error("[M010] Could not read applied migrations")]
    TrackingList {
        #[source]
        source: DbError,
    },

    /// Migrator settings are unusable (M011).
    #[error("[M011] Invalid migrator settings: {0}")]
    InvalidSettings(String),

    /// A migration source produced an unusable script name (M012).
    #[error("[M012] {0}")]
    InvalidName(#[from] InvalidName),
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;

impl MigrateError {
    /// Name of the migration the error belongs to, when there is one.
    pub fn migration_name(&self) -> Option<&MigrationName> {
        match self {
            MigrateError::Execution { name, .. }
            | MigrateError::Recording { name, .. }
            | MigrateError::Transaction { name, .. }
            | MigrateError::TrackingQuery { name, .. }
            | MigrateError::Qualify { name, .. }
            | MigrateError::DuplicateMigration { name, .. } => Some(name),
            _ => None,
        }
    }
}
