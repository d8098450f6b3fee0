//! Configuration types and parsing for tablekeeper.yml

use crate::error::{CoreError, CoreResult};
use crate::migration::DEFAULT_EMPTY_MARKER;
use crate::table_name::TableName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration from tablekeeper.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Where migration scripts come from and how they are split
    #[serde(default)]
    pub migrations: MigrationsConfig,

    /// Names of the tables the job store owns
    #[serde(default)]
    pub tables: TablesConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL (`duckdb:<path>`, `duckdb::memory:`, or a bare path)
    #[serde(default = "default_db_url")]
    pub url: String,

    /// User name passed to the backend
    #[serde(default)]
    pub user: Option<String>,

    /// Password passed to the backend
    #[serde(default)]
    pub password: Option<String>,

    /// Schema that qualifies every job-store table
    #[serde(default)]
    pub schema: Option<String>,

    /// Only validate that the tables exist instead of running migrations
    #[serde(default)]
    pub skip_create: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            user: None,
            password: None,
            schema: None,
            skip_create: false,
        }
    }
}

/// Migration discovery and script format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationsConfig {
    /// Directories holding migration scripts. Empty means the bundled set.
    #[serde(default)]
    pub paths: Vec<String>,

    /// Variant directories whose scripts replace same-named base scripts
    #[serde(default)]
    pub overrides: Vec<String>,

    /// Recognized script extension
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Statement delimiter inside a script
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Leading marker of an intentionally empty migration
    #[serde(default = "default_empty_marker")]
    pub empty_marker: String,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            overrides: Vec::new(),
            extension: default_extension(),
            delimiter: default_delimiter(),
            empty_marker: default_empty_marker(),
        }
    }
}

/// Job-store table naming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TablesConfig {
    /// Prefix shared by every job-store table; references starting with it
    /// are schema-qualified
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Tracking table recording applied migrations
    #[serde(default = "default_tracking_table")]
    pub tracking: TableName,

    /// Tables that must exist before the job store is used
    #[serde(default = "default_required_tables")]
    pub required: Vec<TableName>,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            tracking: default_tracking_table(),
            required: default_required_tables(),
        }
    }
}

const DEFAULT_DB_URL: &str = "duckdb::memory:";

const CONFIG_FILE_NAMES: &[&str] = &["tablekeeper.yml", "tablekeeper.yaml"];

fn default_db_url() -> String {
    DEFAULT_DB_URL.to_string()
}

fn default_extension() -> String {
    ".sql".to_string()
}

fn default_delimiter() -> String {
    ";".to_string()
}

fn default_empty_marker() -> String {
    DEFAULT_EMPTY_MARKER.to_string()
}

fn default_prefix() -> String {
    "jobrunr_".to_string()
}

fn default_tracking_table() -> TableName {
    TableName::new("jobrunr_migrations")
}

/// The tables a job store cannot run without.
pub fn default_required_tables() -> Vec<TableName> {
    [
        "jobrunr_jobs",
        "jobrunr_recurring_jobs",
        "jobrunr_backgroundjobservers",
        "jobrunr_metadata",
    ]
    .into_iter()
    .map(TableName::new)
    .collect()
}

/// Returns `true` for a plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory.
    /// Looks for tablekeeper.yml or tablekeeper.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => Err(CoreError::ConfigNotFound {
                path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
            }),
        }
    }

    /// Load the configuration from `dir` when a config file exists there,
    /// falling back to defaults otherwise.
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => {
                log::debug!(
                    "No tablekeeper config in {}, using defaults",
                    dir.display()
                );
                Ok(Self::default())
            }
        }
    }

    fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(schema) = self.schema() {
            if !is_plain_identifier(schema) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "database.schema '{schema}' must be a plain identifier ([A-Za-z_][A-Za-z0-9_]*)"
                    ),
                });
            }
        }

        let non_empty = [
            ("migrations.extension", &self.migrations.extension),
            ("migrations.delimiter", &self.migrations.delimiter),
            ("migrations.empty_marker", &self.migrations.empty_marker),
            ("tables.prefix", &self.tables.prefix),
        ];
        for (field, value) in non_empty {
            if value.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("{field} cannot be empty"),
                });
            }
        }

        Ok(())
    }

    /// The configured schema, treating an empty string as "no schema".
    pub fn schema(&self) -> Option<&str> {
        self.database.schema.as_deref().filter(|s| !s.is_empty())
    }

    /// Migration directories resolved against `root`
    pub fn migration_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.migrations.paths.iter().map(|p| root.join(p)).collect()
    }

    /// Override directories resolved against `root`
    pub fn override_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.migrations
            .overrides
            .iter()
            .map(|p| root.join(p))
            .collect()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
