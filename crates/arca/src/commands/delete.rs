//! Delete command

use anyhow::{bail, Context, Result};
use arca_backup::store::FileStore;
use std::io::Write;
use std::path::Path;

use crate::cli::DeleteArgs;
use crate::context::AppContext;
use crate::output;

pub async fn run(args: DeleteArgs, config: Option<&Path>) -> Result<()> {
    let ctx = AppContext::load(config)?;
    let record = ctx
        .registry
        .get(args.id)
        .context("Failed to read registry")?
        .with_context(|| format!("No backup with id {}", args.id))?;

    if !args.yes && !confirm(&record.filename)? {
        output::info("Delete cancelled");
        return Ok(());
    }

    if let Err(e) = ctx.store.delete(&record.filename) {
        output::warning(&format!("Could not delete archive file: {e}"));
    }
    ctx.registry
        .delete(record.id)
        .context("Failed to delete registry record")?;

    output::success(&format!("Deleted backup {}", record.filename));
    Ok(())
}

fn confirm(filename: &str) -> Result<bool> {
    print!("Delete {filename}? [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer)? == 0 {
        bail!("No confirmation received; pass --yes to run non-interactively");
    }
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
