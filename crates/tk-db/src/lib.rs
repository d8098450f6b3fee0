//! tk-db - Database layer for Tablekeeper
//!
//! This crate provides the `Connection` and `ConnectionSource` traits the
//! migration core runs against, a scoped `Transaction`, and the DuckDB
//! implementation of both traits.

pub mod duckdb;
pub mod error;
pub(crate) mod row_helpers;
pub mod traits;
pub mod transaction;
pub mod url;

pub use duckdb::{DuckDbConnection, DuckDbSource};
pub use error::{DbError, DbResult};
pub use traits::{Connection, ConnectionSource};
pub use transaction::Transaction;
pub use url::{open_source, ConnectionSettings, DatabaseUrl};
