//! Migration descriptors, tracking records, and per-migration state.

use crate::migration_name::MigrationName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel that marks a migration as intentionally empty.
pub const DEFAULT_EMPTY_MARKER: &str = "-- Empty migration";

/// A migration script produced by a migration source.
///
/// Immutable once created: the runner only reads the name and the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDescriptor {
    name: MigrationName,
    sql: String,
}

impl MigrationDescriptor {
    /// Create a descriptor from a script name and its raw SQL.
    pub fn new(name: MigrationName, sql: impl Into<String>) -> Self {
        Self {
            name,
            sql: sql.into(),
        }
    }

    /// The script name (application order key).
    pub fn name(&self) -> &MigrationName {
        &self.name
    }

    /// The raw script text, possibly holding several statements.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns `true` when the script starts with `marker`.
    ///
    /// Empty migrations execute no statements but are still recorded as
    /// applied.
    pub fn is_empty_migration(&self, marker: &str) -> bool {
        self.sql.starts_with(marker)
    }
}

/// A row of the tracking table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Opaque unique identifier (UUID v4)
    pub id: String,
    /// Name of the applied migration
    pub name: MigrationName,
    /// Local timestamp of application
    pub applied_at: String,
}

/// Lifecycle of a single migration within a run.
///
/// `Pending -> Applying -> Applied`, or `Pending -> Applying -> Failed`.
/// A failed migration stops the whole run and is retried by the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationState {
    Pending,
    Applying,
    Applied,
    Failed,
}

impl MigrationState {
    /// Whether a migration in this state may move to `next`.
    pub fn can_transition_to(self, next: MigrationState) -> bool {
        use MigrationState::*;
        matches!(
            (self, next),
            (Pending | Failed, Applying) | (Applying, Applied | Failed)
        )
    }

}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationState::Pending => write!(f, "pending"),
            MigrationState::Applying => write!(f, "applying"),
            MigrationState::Applied => write!(f, "applied"),
            MigrationState::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
