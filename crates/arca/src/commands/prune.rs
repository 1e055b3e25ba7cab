//! Prune command

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::PruneArgs;
use crate::context::AppContext;
use crate::output;

pub async fn run(_args: PruneArgs, config: Option<&Path>) -> Result<()> {
    let ctx = AppContext::load(config)?;
    let settings = ctx.settings.load().context("Failed to load settings")?;

    let outcome = ctx
        .retention_manager()
        .prune(&settings)
        .context("Prune failed")?;

    if outcome.deleted_by_age + outcome.deleted_by_count == 0 {
        output::info("Nothing to prune");
    } else {
        output::success(&format!(
            "Pruned {} backup(s): {} by age, {} by count",
            outcome.deleted_by_age + outcome.deleted_by_count,
            outcome.deleted_by_age,
            outcome.deleted_by_count
        ));
    }
    Ok(())
}
