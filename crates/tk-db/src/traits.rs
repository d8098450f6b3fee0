//! Connection traits the migration core is written against

use crate::error::DbResult;

/// A live database connection.
///
/// Calls block until the database answers. Parameters are bound positionally
/// to `?` placeholders as strings.
pub trait Connection {
    /// Execute one or more statements that return no rows
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute a single parameterized statement, returns affected rows
    fn execute(&self, sql: &str, params: &[&str]) -> DbResult<usize>;

    /// Run a query whose first column of the first row is a count
    fn query_count(&self, sql: &str, params: &[&str]) -> DbResult<i64>;

    /// Run a query and return every row with each column rendered as text
    fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Vec<String>>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Supplies a fresh connection for each logical operation.
pub trait ConnectionSource: Send + Sync {
    /// Acquire a ready-to-use connection or fail with `DbError::ConnectionError`
    fn connect(&self) -> DbResult<Box<dyn Connection>>;
}

impl<F> ConnectionSource for F
where
    F: Fn() -> DbResult<Box<dyn Connection>> + Send + Sync,
{
    fn connect(&self) -> DbResult<Box<dyn Connection>> {
        self()
    }
}
