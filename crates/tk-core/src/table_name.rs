//! Strongly-typed table name.

use crate::checked_name::checked_name;
use crate::config::is_plain_identifier;

checked_name! {
    /// Unqualified name of a table owned by the job store, e.g. `jobrunr_jobs`.
    ///
    /// Table names are spliced into SQL unquoted, so only plain identifiers
    /// are accepted.
    pub struct TableName("table name") checked by identifier_problem;
}

fn identifier_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("must not be empty")
    } else if !is_plain_identifier(name) {
        Some("must be a plain identifier ([A-Za-z_][A-Za-z0-9_]*)")
    } else {
        None
    }
}
