//! The tracking table: one row per applied migration.

use crate::error::{MigrateError, MigrateResult};
use std::sync::Arc;
use tk_core::{MigrationName, MigrationRecord, TableName};
use tk_db::{Connection, ConnectionSource, DbResult};
use tk_sql::SchemaQualifier;

/// Format of `applied_at`: local time with millisecond precision.
const APPLIED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Reads and writes the tracking table.
pub struct MigrationTracker {
    source: Arc<dyn ConnectionSource>,
    table: String,
}

impl MigrationTracker {
    /// Track migrations in `table`, qualified by `qualifier`.
    pub fn new(
        source: Arc<dyn ConnectionSource>,
        qualifier: &SchemaQualifier,
        table: &TableName,
    ) -> Self {
        Self {
            source,
            table: qualifier.qualify_table_name(table),
        }
    }

    /// The fully qualified tracking table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Whether `name` has a tracking record.
    ///
    /// A tracking table that does not exist yet means nothing was applied.
    /// Any other query failure is an error.
    pub fn is_applied(&self, name: &MigrationName) -> MigrateResult<bool> {
        let conn = self
            .source
            .connect()
            .map_err(|source| MigrateError::Connection {
                context: format!("checking migration {name}"),
                source,
            })?;
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE script_name = ?",
            self.table
        );
        match conn.query_count(&sql, &[name.as_str()]) {
            Ok(count) => Ok(count > 0),
            Err(e) if e.is_not_found() => {
                log::debug!("Tracking table {} not found: {e}", self.table);
                Ok(false)
            }
            Err(source) => Err(MigrateError::TrackingQuery {
                name: name.clone(),
                source,
            }),
        }
    }

    /// Insert the tracking record for `name` on `conn`.
    ///
    /// Called inside the migration's own transaction, so the record and the
    /// migration's statements commit or roll back together.
    pub fn record_applied(&self, conn: &dyn Connection, name: &MigrationName) -> DbResult<()> {
        let id = uuid::Uuid::new_v4().to_string();
        let applied_at = chrono::Local::now().format(APPLIED_AT_FORMAT).to_string();
        conn.execute(
            &format!(
                "INSERT INTO {} (id, script_name, applied_at) VALUES (?, ?, ?)",
                self.table
            ),
            &[id.as_str(), name.as_str(), applied_at.as_str()],
        )?;
        Ok(())
    }

    /// All tracking records ordered by script name. Empty when the tracking
    /// table does not exist.
    pub fn applied_records(&self) -> MigrateResult<Vec<MigrationRecord>> {
        let conn = self
            .source
            .connect()
            .map_err(|source| MigrateError::Connection {
                context: "listing applied migrations".to_string(),
                source,
            })?;
        let sql = format!(
            "SELECT id, script_name, applied_at FROM {} ORDER BY script_name",
            self.table
        );
        let rows = match conn.query_rows(&sql, &[]) {
            Ok(rows) => rows,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(source) => return Err(MigrateError::TrackingList { source }),
        };

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cols = row.into_iter();
            let (Some(id), Some(script_name), Some(applied_at)) =
                (cols.next(), cols.next(), cols.next())
            else {
                continue;
            };
            let name = match MigrationName::parse(script_name) {
                Ok(name) => name,
                Err(err) => {
                    log::warn!("Skipping tracking record {id}: {err}");
                    continue;
                }
            };
            records.push(MigrationRecord {
                id,
                name,
                applied_at,
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tests;
