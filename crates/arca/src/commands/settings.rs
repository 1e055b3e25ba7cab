//! Settings commands

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::{SettingsCommands, SettingsSetArgs};
use crate::context::AppContext;
use crate::output;

pub async fn run(command: SettingsCommands, config: Option<&Path>) -> Result<()> {
    match command {
        SettingsCommands::Show => show(config).await,
        SettingsCommands::Set(args) => set(args, config).await,
    }
}

async fn show(config: Option<&Path>) -> Result<()> {
    let ctx = AppContext::load(config)?;
    let settings = ctx.settings.load().context("Failed to load settings")?;

    output::header("Backup Settings");
    println!();
    for (key, value) in settings.entries() {
        output::kv(key, &value);
    }
    Ok(())
}

async fn set(args: SettingsSetArgs, config: Option<&Path>) -> Result<()> {
    let ctx = AppContext::load(config)?;
    ctx.settings
        .set(&args.key, &args.value)
        .with_context(|| format!("Failed to set {}", args.key))?;

    output::success(&format!("Set {} = {}", args.key, args.value));
    Ok(())
}
