//! List command

use anyhow::{Context, Result};
use arca_backup::registry::BackupRecord;
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::ListArgs;
use crate::context::AppContext;
use crate::output;

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Filename")]
    filename: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Causer")]
    causer: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&BackupRecord> for Row {
    fn from(record: &BackupRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename.clone(),
            kind: record.kind.to_string(),
            size: record
                .size_bytes
                .map(output::format_bytes)
                .unwrap_or_else(|| "-".to_string()),
            causer: record.causer.clone(),
            created: record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

pub async fn run(args: ListArgs, config: Option<&Path>) -> Result<()> {
    let ctx = AppContext::load(config)?;
    let records = ctx.registry.list().context("Failed to read registry")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        output::info("No backups recorded");
        return Ok(());
    }

    let rows: Vec<Row> = records.iter().map(Row::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
