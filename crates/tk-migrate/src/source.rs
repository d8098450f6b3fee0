//! Migration sources.
//!
//! A source hands the runner every migration it knows about, in any order;
//! the runner does the filtering and sorting.

use crate::error::{MigrateError, MigrateResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tk_core::{InvalidName, MigrationDescriptor, MigrationName};

/// Produces the full, unordered set of available migrations.
pub trait MigrationSource {
    /// Every migration this source knows about
    fn migrations(&self) -> MigrateResult<Vec<MigrationDescriptor>>;
}

/// Migrations held in memory.
///
/// Names are checked when the source is read, so a bad name added with
/// [`with`](Self::with) surfaces as an error from `migrations`.
#[derive(Debug, Clone, Default)]
pub struct StaticMigrationSource {
    migrations: Vec<Result<MigrationDescriptor, InvalidName>>,
}

impl StaticMigrationSource {
    /// Create a source from a list of descriptors
    pub fn new(migrations: Vec<MigrationDescriptor>) -> Self {
        Self {
            migrations: migrations.into_iter().map(Ok).collect(),
        }
    }

    /// Add a migration from its name and script.
    pub fn with(mut self, name: &str, sql: &str) -> Self {
        self.migrations
            .push(MigrationName::parse(name).map(|name| MigrationDescriptor::new(name, sql)));
        self
    }
}

impl MigrationSource for StaticMigrationSource {
    fn migrations(&self) -> MigrateResult<Vec<MigrationDescriptor>> {
        self.migrations
            .iter()
            .cloned()
            .map(|migration| migration.map_err(MigrateError::from))
            .collect()
    }
}

/// Migrations read from directories.
///
/// Every regular file directly inside a base directory is a migration named
/// after the file. Files in override directories replace the base file of
/// the same name (or add a new one); this is how a database variant swaps
/// in its own version of a script, including an empty one.
#[derive(Debug, Clone, Default)]
pub struct DirectoryMigrationSource {
    base: Vec<PathBuf>,
    overrides: Vec<PathBuf>,
}

impl DirectoryMigrationSource {
    /// Read migrations from the given base directories
    pub fn new(base: Vec<PathBuf>) -> Self {
        Self {
            base,
            overrides: Vec::new(),
        }
    }

    /// Layer override directories on top of the base directories.
    pub fn with_overrides(mut self, overrides: Vec<PathBuf>) -> Self {
        self.overrides = overrides;
        self
    }
}

impl MigrationSource for DirectoryMigrationSource {
    fn migrations(&self) -> MigrateResult<Vec<MigrationDescriptor>> {
        let mut found: BTreeMap<MigrationName, (PathBuf, String)> = BTreeMap::new();

        for dir in &self.base {
            for (name, path, sql) in read_scripts(dir)? {
                if let Some((first, _)) = found.get(&name) {
                    return Err(MigrateError::DuplicateMigration {
                        name,
                        first: first.display().to_string(),
                        second: path.display().to_string(),
                    });
                }
                found.insert(name, (path, sql));
            }
        }

        for dir in &self.overrides {
            for (name, path, sql) in read_scripts(dir)? {
                log::debug!("Migration {name} taken from {}", path.display());
                found.insert(name, (path, sql));
            }
        }

        Ok(found
            .into_iter()
            .map(|(name, (_, sql))| MigrationDescriptor::new(name, sql))
            .collect())
    }
}

/// Read every regular file directly inside `dir`.
fn read_scripts(dir: &Path) -> MigrateResult<Vec<(MigrationName, PathBuf, String)>> {
    let io_err = |path: &Path| {
        let path = path.display().to_string();
        move |source| MigrateError::Source { path, source }
    };

    let mut scripts = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err(dir))? {
        let entry = entry.map_err(io_err(dir))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping migration file with a non UTF-8 name: {}", path.display());
            continue;
        };
        let name = MigrationName::parse(file_name)?;
        let sql = std::fs::read_to_string(&path).map_err(io_err(&path))?;
        scripts.push((name, path, sql));
    }
    Ok(scripts)
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
