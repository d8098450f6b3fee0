//! Required-table validation.

use crate::error::{MigrateError, MigrateResult};
use std::sync::Arc;
use tk_core::TableName;
use tk_db::{ConnectionSource, Transaction};
use tk_sql::SchemaQualifier;

/// Checks that every required table can be queried.
pub struct TableValidator {
    source: Arc<dyn ConnectionSource>,
    tables: Vec<String>,
}

impl TableValidator {
    pub fn new(
        source: Arc<dyn ConnectionSource>,
        qualifier: &SchemaQualifier,
        tables: &[TableName],
    ) -> Self {
        Self {
            source,
            tables: tables
                .iter()
                .map(|t| qualifier.qualify_table_name(t))
                .collect(),
        }
    }

    /// Fully qualified names of the tables that are checked.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Run `SELECT COUNT(*)` against each required table inside one
    /// transaction. The first failure stops the check; the transaction is
    /// committed either way since nothing was written.
    pub fn validate_tables(&self) -> MigrateResult<()> {
        let conn = self
            .source
            .connect()
            .map_err(|source| MigrateError::Connection {
                context: "validating required tables".to_string(),
                source,
            })?;
        let tx = Transaction::begin(conn.as_ref()).map_err(|e| {
            log::debug!("Could not start validation transaction: {e}");
            MigrateError::TablesMissing
        })?;

        let missing = self.tables.iter().find_map(|table| {
            let sql = format!("SELECT COUNT(*) FROM {table}");
            match tx.connection().query_count(&sql, &[]) {
                Ok(_) => None,
                Err(e) => {
                    log::debug!("Required table {table} is not available: {e}");
                    Some(table)
                }
            }
        });

        if let Err(e) = tx.commit() {
            log::debug!("Could not commit validation transaction: {e}");
            return Err(MigrateError::TablesMissing);
        }
        match missing {
            Some(_) => Err(MigrateError::TablesMissing),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
