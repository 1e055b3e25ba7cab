//! Show command

use anyhow::{Context, Result};
use arca_backup::store::FileStore;
use std::path::Path;

use crate::cli::ShowArgs;
use crate::context::AppContext;
use crate::output;

pub async fn run(args: ShowArgs, config: Option<&Path>) -> Result<()> {
    let ctx = AppContext::load(config)?;
    let record = ctx
        .registry
        .get(args.id)
        .context("Failed to read registry")?
        .with_context(|| format!("No backup with id {}", args.id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    output::header(&format!("Backup {}", record.id));
    println!();
    output::kv("Filename", &record.filename);
    output::kv("Kind", &record.kind.to_string());
    output::kv(
        "Size",
        &record
            .size_bytes
            .map(output::format_bytes)
            .unwrap_or_else(|| "-".to_string()),
    );
    output::kv("Causer", &record.causer);
    output::kv(
        "Created",
        &record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    output::kv(
        "On disk",
        if ctx.store.exists(&record.filename) {
            "yes"
        } else {
            "missing"
        },
    );
    Ok(())
}
