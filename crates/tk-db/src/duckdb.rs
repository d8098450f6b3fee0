//! DuckDB implementation of the connection traits

use crate::error::{DbError, DbResult};
use crate::row_helpers::get_column_as_string;
use crate::traits::{Connection, ConnectionSource};
use duckdb::params_from_iter;
use std::path::Path;
use std::sync::Mutex;

/// One DuckDB connection.
pub struct DuckDbConnection {
    conn: duckdb::Connection,
}

impl DuckDbConnection {
    /// Wrap an already-open DuckDB connection
    pub fn new(conn: duckdb::Connection) -> Self {
        Self { conn }
    }
}

/// Attach the statement text to execution errors; catalog classification is
/// preserved.
fn query_error(err: duckdb::Error, sql: &str) -> DbError {
    match DbError::from(err) {
        DbError::ExecutionError(msg) => DbError::ExecutionError(format!("{msg}: {sql}")),
        other => other,
    }
}

fn owned_params(params: &[&str]) -> Vec<String> {
    params.iter().map(|p| p.to_string()).collect()
}

impl Connection for DuckDbConnection {
    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| query_error(e, sql))
    }

    fn execute(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        self.conn
            .execute(sql, params_from_iter(owned_params(params)))
            .map_err(|e| query_error(e, sql))
    }

    fn query_count(&self, sql: &str, params: &[&str]) -> DbResult<i64> {
        self.conn
            .query_row(sql, params_from_iter(owned_params(params)), |row| {
                row.get::<_, i64>(0)
            })
            .map_err(|e| query_error(e, sql))
    }

    fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Vec<String>>> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| query_error(e, sql))?;
        let rows = stmt
            .query_map(params_from_iter(owned_params(params)), |row| {
                let col_count = row.as_ref().column_count();
                Ok((0..col_count)
                    .map(|i| get_column_as_string(row, i))
                    .collect::<Vec<_>>())
            })
            .map_err(|e| query_error(e, sql))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| query_error(e, sql))?;
        Ok(rows)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Hands out connections to one DuckDB database.
///
/// The database is opened once; every `connect` clones the base connection,
/// so in-memory databases are shared across the connections handed out.
pub struct DuckDbSource {
    base: Mutex<duckdb::Connection>,
    location: String,
}

impl DuckDbSource {
    /// Open a new in-memory database
    pub fn in_memory() -> DbResult<Self> {
        let conn = duckdb::Connection::open_in_memory()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            base: Mutex::new(conn),
            location: ":memory:".to_string(),
        })
    }

    /// Open (or create) a database file
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = duckdb::Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            base: Mutex::new(conn),
            location: path.display().to_string(),
        })
    }

    /// Open from a path string (handles the :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Where the database lives, for display
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Acquire a connection with its concrete type.
    pub fn connect_duckdb(&self) -> DbResult<DuckDbConnection> {
        let base = self
            .base
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        let conn = base
            .try_clone()
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", self.location)))?;
        Ok(DuckDbConnection::new(conn))
    }
}

impl ConnectionSource for DuckDbSource {
    fn connect(&self) -> DbResult<Box<dyn Connection>> {
        Ok(Box::new(self.connect_duckdb()?))
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
