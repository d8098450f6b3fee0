//! The bundled job-store migrations.
//!
//! Each migration is a `.sql` file embedded via `include_str!`. Used when no
//! migration directories are configured.

use crate::error::MigrateResult;
use crate::source::MigrationSource;
use tk_core::{MigrationDescriptor, MigrationName};

/// All bundled migrations as `(file name, script)`.
pub static BUNDLED_MIGRATIONS: &[(&str, &str)] = &[
    (
        "v000__create_migrations_table.sql",
        include_str!("v000__create_migrations_table.sql"),
    ),
    (
        "v001__create_job_table.sql",
        include_str!("v001__create_job_table.sql"),
    ),
    (
        "v002__create_recurring_job_table.sql",
        include_str!("v002__create_recurring_job_table.sql"),
    ),
    (
        "v003__create_background_job_servers_table.sql",
        include_str!("v003__create_background_job_servers_table.sql"),
    ),
    (
        "v004__create_metadata_table.sql",
        include_str!("v004__create_metadata_table.sql"),
    ),
    (
        "v005__add_recurring_job_id.sql",
        include_str!("v005__add_recurring_job_id.sql"),
    ),
    (
        "v006__create_job_state_index.sql",
        include_str!("v006__create_job_state_index.sql"),
    ),
];

/// Source over [`BUNDLED_MIGRATIONS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedMigrationSource;

impl MigrationSource for EmbeddedMigrationSource {
    fn migrations(&self) -> MigrateResult<Vec<MigrationDescriptor>> {
        Ok(BUNDLED_MIGRATIONS
            .iter()
            .map(|(name, sql)| MigrationDescriptor::new(MigrationName::new(*name), *sql))
            .collect())
    }
}
