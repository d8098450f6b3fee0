//! tk-core - Core library for Tablekeeper
//!
//! This crate provides the shared migration types (names, descriptors,
//! tracking records, per-migration state) and the `tablekeeper.yml`
//! configuration used by every other Tablekeeper crate.

mod checked_name;
pub mod config;
pub mod error;
pub mod migration;
pub mod migration_name;
pub mod table_name;

pub use config::{Config, DatabaseConfig, MigrationsConfig, TablesConfig};
pub use error::{CoreError, CoreResult, InvalidName};
pub use migration::{MigrationDescriptor, MigrationRecord, MigrationState};
pub use migration_name::MigrationName;
pub use table_name::TableName;
