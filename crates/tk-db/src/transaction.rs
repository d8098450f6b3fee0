//! Scoped transactions over a [`Connection`]

use crate::error::{DbError, DbResult};
use crate::traits::Connection;

/// A transaction bound to one connection.
///
/// `commit` consumes the scope. A scope dropped without committing rolls
/// back, so every early return and error path abandons the work.
pub struct Transaction<'c> {
    conn: &'c dyn Connection,
    finished: bool,
}

impl<'c> Transaction<'c> {
    /// Issue `BEGIN TRANSACTION` on `conn`.
    pub fn begin(conn: &'c dyn Connection) -> DbResult<Self> {
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;
        Ok(Self {
            conn,
            finished: false,
        })
    }

    /// The connection the transaction runs on.
    pub fn connection(&self) -> &'c dyn Connection {
        self.conn
    }

    /// Commit. On failure the transaction is rolled back before returning.
    pub fn commit(mut self) -> DbResult<()> {
        self.finished = true;
        if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
            let _ = self.conn.execute_batch("ROLLBACK");
            return Err(DbError::TransactionError(format!(
                "COMMIT failed: {commit_err}"
            )));
        }
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            log::warn!("Rollback of abandoned transaction failed: {e}");
        }
    }
}

#[cfg(test)]
#[path = "transaction_test.rs"]
mod tests;
