//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tk_core::Config;
use tk_db::{open_source, ConnectionSettings, ConnectionSource};
use tk_migrate::{
    DirectoryMigrationSource, EmbeddedMigrationSource, MigrationRunner, MigrationSource,
    MigratorSettings,
};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Returned after a command has already reported its failure, so `main`
/// exits without printing anything further.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Configuration with command-line overrides applied and directories
/// resolved.
#[derive(Debug)]
pub(crate) struct Setup {
    pub(crate) config: Config,
    pub(crate) migration_dirs: Vec<PathBuf>,
    pub(crate) override_dirs: Vec<PathBuf>,
}

/// Load the config file and apply the global flags on top of it.
///
/// Directories from the config file are relative to the file; directories
/// given on the command line are relative to the working directory.
pub(crate) fn load_setup(global: &GlobalArgs) -> Result<Setup> {
    let (mut config, root) = match &global.config {
        Some(path) => {
            let path = Path::new(path);
            let config = Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (config, root)
        }
        None => {
            let cwd = std::env::current_dir().context("Failed to read working directory")?;
            let config = Config::load_or_default(&cwd).context("Failed to load config")?;
            (config, cwd)
        }
    };

    if let Some(url) = &global.url {
        config.database.url = url.clone();
    }
    if let Some(user) = &global.user {
        config.database.user = Some(user.clone());
    }
    if let Some(password) = &global.password {
        config.database.password = Some(password.clone());
    }
    if let Some(schema) = &global.schema {
        config.database.schema = Some(schema.clone());
    }
    config.validate().context("Invalid configuration")?;

    let migration_dirs = if global.migrations.is_empty() {
        config.migration_paths_absolute(&root)
    } else {
        global.migrations.iter().map(PathBuf::from).collect()
    };
    let override_dirs = if global.overrides.is_empty() {
        config.override_paths_absolute(&root)
    } else {
        global.overrides.iter().map(PathBuf::from).collect()
    };

    Ok(Setup {
        config,
        migration_dirs,
        override_dirs,
    })
}

/// Build a runner for the configured database and migrations.
pub(crate) fn build_runner(setup: &Setup) -> Result<MigrationRunner> {
    let database = &setup.config.database;
    let settings = ConnectionSettings {
        url: database.url.clone(),
        user: database.user.clone(),
        password: database.password.clone(),
    };
    let connections: Arc<dyn ConnectionSource> = Arc::from(
        open_source(&settings)
            .with_context(|| format!("Failed to open database {}", settings.url))?,
    );

    let migrations: Box<dyn MigrationSource> = if setup.migration_dirs.is_empty() {
        if !setup.override_dirs.is_empty() {
            log::warn!("Override directories are ignored without migration directories");
        }
        log::debug!("Using bundled migrations");
        Box::new(EmbeddedMigrationSource)
    } else {
        Box::new(
            DirectoryMigrationSource::new(setup.migration_dirs.clone())
                .with_overrides(setup.override_dirs.clone()),
        )
    };

    let runner = MigrationRunner::new(
        connections,
        migrations,
        MigratorSettings::from_config(&setup.config),
    )?;
    Ok(runner)
}
