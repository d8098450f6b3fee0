//! Migrate command implementation

use anyhow::Result;
use tk_migrate::DatabaseOptions;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{build_runner, load_setup, ExitCode};

/// Execute the migrate command
pub(crate) fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    println!("============================================");
    println!("         Tablekeeper Table Creator          ");
    println!("============================================");

    match run(args, global) {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => {
            println!("An error occurred:");
            println!("{err:?}");
            Err(ExitCode(1).into())
        }
    }
}

fn run(args: &MigrateArgs, global: &GlobalArgs) -> Result<&'static str> {
    let setup = load_setup(global)?;
    let runner = build_runner(&setup)?;

    let options = if args.skip_create || setup.config.database.skip_create {
        DatabaseOptions::SkipCreate
    } else {
        DatabaseOptions::Create
    };

    match options {
        DatabaseOptions::Create => println!("Creating tables in {}", setup.config.database.url),
        DatabaseOptions::SkipCreate => {
            println!("Validating tables in {}", setup.config.database.url)
        }
    }
    let report = runner.prepare(options)?;

    for name in &report.applied {
        println!("  Applied  {name}");
    }
    if global.verbose {
        for name in &report.skipped {
            println!("  Skipped  {name} (already applied)");
        }
        for name in &report.ignored {
            println!("  Ignored  {name}");
        }
    }

    Ok(match options {
        DatabaseOptions::Create => "Successfully created all tables!",
        DatabaseOptions::SkipCreate => "All required tables are available!",
    })
}
