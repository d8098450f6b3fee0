//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Tablekeeper - creates and checks the tables of a background-job store
#[derive(Parser, Debug)]
#[command(name = "tk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: tablekeeper.yml in the current directory, if present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Database URL (duckdb:<path>, duckdb::memory:, or a file path)
    #[arg(short, long, global = true, env = "TK_DATABASE_URL")]
    pub url: Option<String>,

    /// Database user
    #[arg(long, global = true, env = "TK_DATABASE_USER")]
    pub user: Option<String>,

    /// Database password
    #[arg(long, global = true, env = "TK_DATABASE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Schema holding the job-store tables
    #[arg(short, long, global = true, env = "TK_DATABASE_SCHEMA")]
    pub schema: Option<String>,

    /// Migration directory (repeatable; replaces the configured directories)
    #[arg(short, long = "migrations", global = true)]
    pub migrations: Vec<String>,

    /// Override directory whose scripts replace same-named migrations (repeatable)
    #[arg(short, long = "overrides", global = true)]
    pub overrides: Vec<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Migrate(MigrateArgs),

    /// Check that every required table exists
    Validate,

    /// List migrations and whether they have been applied
    Status(StatusArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Only validate the tables, do not create them
    #[arg(long)]
    pub skip_create: bool,
}

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
