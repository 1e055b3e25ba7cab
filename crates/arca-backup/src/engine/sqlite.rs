//! SQLite restore executor.
//!
//! Two paths. If the archive carried a raw copy of the database file, the
//! current live file is first copied aside (timestamped sibling, kept) and
//! the raw copy moved into place; no SQL runs at all. Without a raw copy,
//! the live file is deleted and the sanitized script executed as a single
//! batch against a brand-new database. A failed batch leaves whatever
//! partial state the engine produced; recovering a known-good state is the
//! job of the pre-restore safety backup, not this executor.

use super::{RestoreDump, RestoreExecutor};
use arca_core::error::{Error, Result};
use arca_core::Clock;
use async_trait::async_trait;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub struct SqliteExecutor {
    database_path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl SqliteExecutor {
    pub fn new(database_path: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self {
            database_path,
            clock,
        }
    }

    /// Name the live file is parked under before a raw-file swap.
    fn aside_path(&self) -> PathBuf {
        let stamp = self.clock.now().format("%Y-%m-%d-%H-%M-%S");
        let name = self
            .database_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("database.sqlite");
        self.database_path
            .with_file_name(format!("{name}.pre-restore-{stamp}"))
    }

}

fn swap_raw_file(live: &Path, aside: &Path, raw: &Path) -> Result<()> {
    if live.exists() {
        fs::copy(live, aside)?;
        info!("Parked current database file at {}", aside.display());
    } else {
        warn!(
            "Live database file {} does not exist; nothing to park",
            live.display()
        );
    }

    fs::copy(raw, live)?;
    info!(
        "Replaced live database file with raw copy from archive ({} bytes)",
        fs::metadata(live)?.len()
    );
    Ok(())
}

fn execute_script(live: &Path, sql: &str) -> Result<()> {
    if live.exists() {
        fs::remove_file(live)?;
    }
    if let Some(parent) = live.parent() {
        fs::create_dir_all(parent)?;
    }

    let connection = Connection::open(live)
        .map_err(|e| Error::engine("cannot open fresh database file", e.to_string()))?;

    connection
        .execute_batch(sql)
        .map_err(|e| Error::engine("dump execution failed", e.to_string()))?;

    Ok(())
}

#[async_trait]
impl RestoreExecutor for SqliteExecutor {
    // File copies and script execution are synchronous rusqlite/fs work;
    // run them on the blocking pool so the orchestrator's timeout stays
    // able to preempt and no runtime worker stalls for the duration.
    async fn restore(&self, dump: &RestoreDump) -> Result<()> {
        let live = self.database_path.clone();
        let task = if let Some(raw) = &dump.raw_database {
            info!("Raw database file present in archive, taking file-swap path");
            let aside = self.aside_path();
            let raw = raw.clone();
            tokio::task::spawn_blocking(move || swap_raw_file(&live, &aside, &raw))
        } else {
            info!(
                "Executing sanitized dump ({} bytes) against fresh database",
                dump.sql.len()
            );
            let sql = dump.sql.clone();
            tokio::task::spawn_blocking(move || execute_script(&live, &sql))
        };

        task.await
            .map_err(|e| Error::engine("restore task aborted", e.to_string()))?
    }
}
