//! tk-migrate - Migration core for Tablekeeper
//!
//! Applies an ordered set of SQL migration scripts exactly once each,
//! records every applied script in a tracking table, and validates that the
//! job-store tables exist. Each migration runs in its own transaction, on its
//! own connection, strictly one after another.

pub mod bundled;
pub mod error;
pub mod runner;
pub mod settings;
pub mod source;
pub mod tracker;
pub mod validator;

pub use bundled::EmbeddedMigrationSource;
pub use error::{MigrateError, MigrateResult};
pub use runner::{DatabaseOptions, MigrationReport, MigrationRunner, MigrationStatus};
pub use settings::MigratorSettings;
pub use source::{DirectoryMigrationSource, MigrationSource, StaticMigrationSource};
pub use tracker::MigrationTracker;
pub use validator::TableValidator;
