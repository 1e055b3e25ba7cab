//! Scheduled-backup tick command
//!
//! Intended to run from cron every minute. Evaluates the schedule against
//! the current wall clock and, when a backup is due, takes it and then
//! applies retention. A tick that finds the operation lock held skips the
//! run entirely instead of waiting.

use anyhow::{Context, Result};
use arca_backup::registry::{BackupKind, SYSTEM_CAUSER};
use arca_core::error::Error;
use arca_core::schedule::should_run;
use std::path::Path;
use tracing::debug;

use crate::cli::TickArgs;
use crate::context::AppContext;
use crate::output;

pub async fn run(_args: TickArgs, config: Option<&Path>) -> Result<()> {
    let ctx = AppContext::load(config)?;
    let settings = ctx.settings.load().context("Failed to load settings")?;

    if !should_run(ctx.clock.now(), &settings) {
        debug!("No scheduled backup due");
        return Ok(());
    }

    let _lock = match ctx.lock() {
        Ok(lock) => lock,
        Err(Error::Busy) => {
            output::info("Another operation is running; skipping scheduled backup");
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to acquire operation lock"),
    };

    let record = ctx
        .backup_orchestrator()
        .run(BackupKind::Scheduled, SYSTEM_CAUSER)
        .await
        .context("Scheduled backup failed")?;
    output::success(&format!("Scheduled backup created: {}", record.filename));

    let outcome = ctx
        .retention_manager()
        .prune(&settings)
        .context("Post-backup prune failed")?;
    if outcome.deleted_by_age + outcome.deleted_by_count > 0 {
        output::info(&format!(
            "Pruned {} old backup(s)",
            outcome.deleted_by_age + outcome.deleted_by_count
        ));
    }
    Ok(())
}
