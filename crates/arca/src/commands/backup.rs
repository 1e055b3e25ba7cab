//! Manual backup command

use anyhow::{Context, Result};
use arca_backup::registry::BackupKind;
use std::path::Path;

use crate::cli::BackupArgs;
use crate::context::AppContext;
use crate::output;

pub async fn run(args: BackupArgs, config: Option<&Path>) -> Result<()> {
    let ctx = AppContext::load(config)?;
    let _lock = ctx
        .lock()
        .context("Another backup or restore is already running")?;

    output::info("Creating backup...");

    let record = ctx
        .backup_orchestrator()
        .run(BackupKind::Manual, &args.causer)
        .await
        .context("Backup failed")?;

    output::success(&format!(
        "Backup created: {} ({})",
        record.filename,
        record
            .size_bytes
            .map(output::format_bytes)
            .unwrap_or_else(|| "size unknown".to_string())
    ));
    Ok(())
}
