//! Runner settings.
//!
//! Everything that used to be a process-wide constant (required tables,
//! delimiter, extension, empty-migration marker, table prefix, tracking
//! table) is a field here, so runners for different schemas or tenants can
//! coexist in one process.

use crate::error::{MigrateError, MigrateResult};
use tk_core::config::is_plain_identifier;
use tk_core::{Config, TableName};
use tk_sql::SchemaQualifier;

/// Settings a [`crate::MigrationRunner`] is built with.
#[derive(Debug, Clone)]
pub struct MigratorSettings {
    /// Schema qualifying every job-store table
    pub schema: Option<String>,
    /// Prefix marking job-store tables inside migration statements
    pub table_prefix: String,
    /// Tracking table name (unqualified)
    pub tracking_table: TableName,
    /// Tables checked by validation (unqualified)
    pub required_tables: Vec<TableName>,
    /// Extension a source entry needs to count as a migration
    pub extension: String,
    /// Statement delimiter
    pub delimiter: String,
    /// Leading marker of an intentionally empty migration
    pub empty_marker: String,
}

impl Default for MigratorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl MigratorSettings {
    /// Build settings from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            schema: config.schema().map(str::to_string),
            table_prefix: config.tables.prefix.clone(),
            tracking_table: config.tables.tracking.clone(),
            required_tables: config.tables.required.clone(),
            extension: config.migrations.extension.clone(),
            delimiter: config.migrations.delimiter.clone(),
            empty_marker: config.migrations.empty_marker.clone(),
        }
    }

    /// Replace the schema. An empty string clears it.
    pub fn with_schema(mut self, schema: Option<&str>) -> Self {
        self.schema = schema.filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    /// Replace the required tables.
    pub fn with_required_tables(mut self, tables: Vec<TableName>) -> Self {
        self.required_tables = tables;
        self
    }

    /// Check the settings before a runner uses them.
    pub fn validate(&self) -> MigrateResult<()> {
        if let Some(schema) = &self.schema {
            if !is_plain_identifier(schema) {
                return Err(MigrateError::InvalidSettings(format!(
                    "schema '{schema}' is not a plain identifier"
                )));
            }
        }
        let non_empty = [
            ("table prefix", &self.table_prefix),
            ("extension", &self.extension),
            ("delimiter", &self.delimiter),
            ("empty-migration marker", &self.empty_marker),
        ];
        for (what, value) in non_empty {
            if value.is_empty() {
                return Err(MigrateError::InvalidSettings(format!(
                    "{what} cannot be empty"
                )));
            }
        }
        Ok(())
    }

    /// The qualifier matching these settings.
    pub fn qualifier(&self) -> SchemaQualifier {
        SchemaQualifier::new(self.schema.as_deref(), self.table_prefix.clone())
    }
}
