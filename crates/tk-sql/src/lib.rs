//! tk-sql - SQL handling for Tablekeeper
//!
//! Rewrites job-store table references to include a configured schema and
//! splits migration scripts into individual statements.

pub mod error;
pub mod qualify;
pub mod split;

pub use error::{SqlError, SqlResult};
pub use qualify::SchemaQualifier;
pub use split::split_statements;
