//! Validate command implementation

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use crate::commands::common::{build_runner, load_setup};

/// Execute the validate command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let setup = load_setup(global)?;
    let runner = build_runner(&setup)?;

    runner
        .validate_tables()
        .with_context(|| format!("Validation failed for {}", setup.config.database.url))?;

    let tables = runner.settings().required_tables.len();
    println!("All {tables} required tables are available");
    Ok(())
}
