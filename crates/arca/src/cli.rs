//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Arca - Database backup and restore
#[derive(Parser, Debug)]
#[command(name = "arca")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to config.json (default: ~/.arca/config.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a backup now
    Backup(BackupArgs),

    /// Restore a backup by id
    Restore(RestoreArgs),

    /// List known backups
    List(ListArgs),

    /// Show one backup record
    Show(ShowArgs),

    /// Delete a backup and its archive
    Delete(DeleteArgs),

    /// Apply the retention policy
    Prune(PruneArgs),

    /// Reconcile the registry with the backup directory
    Reconcile(ReconcileArgs),

    /// Evaluate the schedule and run a backup if due
    Tick(TickArgs),

    /// Backup settings management
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Who requested this backup (recorded in the registry)
    #[arg(long, default_value = "system")]
    pub causer: String,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Registry id of the backup to restore
    pub id: u64,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Registry id of the backup
    pub id: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Registry id of the backup
    pub id: u64,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct PruneArgs {}

#[derive(Args, Debug)]
pub struct ReconcileArgs {}

#[derive(Args, Debug)]
pub struct TickArgs {}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show all settings
    Show,

    /// Set one setting by key
    Set(SettingsSetArgs),
}

#[derive(Args, Debug)]
pub struct SettingsSetArgs {
    /// Setting key, e.g. schedule_frequency
    pub key: String,

    /// New value
    pub value: String,
}
