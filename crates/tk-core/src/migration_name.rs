//! Strongly-typed migration name.

use crate::checked_name::checked_name;

checked_name! {
    /// Name of a migration script, e.g. `v001__create_jobs_table.sql`.
    ///
    /// Lexical order of names is application order, which is why migration
    /// files are conventionally version-prefixed. A name is a bare file
    /// name: never empty, no path separators, no control characters.
    pub struct MigrationName("migration name") checked by file_name_problem;
}

impl MigrationName {
    /// Returns `true` when the name ends with `extension` (e.g. `.sql`).
    pub fn has_extension(&self, extension: &str) -> bool {
        self.0.ends_with(extension)
    }
}

fn file_name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("must not be empty")
    } else if name.contains(['/', '\\']) {
        Some("must be a file name, not a path")
    } else if name.chars().any(char::is_control) {
        Some("must not contain control characters")
    } else {
        None
    }
}
