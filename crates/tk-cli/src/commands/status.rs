//! Status command implementation

use anyhow::{Context, Result};
use tk_core::MigrationState;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{build_runner, load_setup};

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let setup = load_setup(global)?;
    let runner = build_runner(&setup)?;
    let statuses = runner.status().context("Failed to read migration status")?;

    if args.json {
        let json = serde_json::to_string_pretty(&statuses)
            .context("Failed to serialize migration status")?;
        println!("{json}");
        return Ok(());
    }

    if statuses.is_empty() {
        println!("No migrations found");
        return Ok(());
    }

    let width = statuses
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max("MIGRATION".len());
    println!("{:<width$}  {:<8}  APPLIED AT", "MIGRATION", "STATE");
    for status in &statuses {
        println!(
            "{:<width$}  {:<8}  {}",
            status.name.as_str(),
            status.state.to_string(),
            status.applied_at.as_deref().unwrap_or("-")
        );
    }

    let count = |state: MigrationState| statuses.iter().filter(|s| s.state == state).count();
    println!();
    println!(
        "{} applied, {} pending",
        count(MigrationState::Applied),
        count(MigrationState::Pending)
    );
    Ok(())
}
