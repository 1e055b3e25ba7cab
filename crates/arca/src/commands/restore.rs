//! Restore command

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::Path;

use crate::cli::RestoreArgs;
use crate::context::AppContext;
use crate::output;

pub async fn run(args: RestoreArgs, config: Option<&Path>) -> Result<()> {
    let ctx = AppContext::load(config)?;

    let record = ctx
        .registry
        .get(args.id)
        .context("Failed to read registry")?
        .with_context(|| format!("No backup with id {}", args.id))?;

    if !args.yes && !confirm(&record.filename)? {
        output::info("Restore cancelled");
        return Ok(());
    }

    let _lock = ctx
        .lock()
        .context("Another backup or restore is already running")?;

    output::info(&format!("Restoring {}...", record.filename));

    ctx.restore_orchestrator()
        .run(args.id)
        .await
        .context("Restore failed")?;

    output::success(&format!("Restored {}", record.filename));
    Ok(())
}

fn confirm(filename: &str) -> Result<bool> {
    output::warning(&format!(
        "This will replace the live database with the contents of {filename}."
    ));
    print!("Continue? [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer)? == 0 {
        bail!("No confirmation received; pass --yes to run non-interactively");
    }
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
