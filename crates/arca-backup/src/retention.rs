//! Retention: age- and count-based pruning.
//!
//! Two independent passes, age first. Every pass deletes the physical file
//! (when present) before removing the registry row; rows whose file already
//! vanished are still pruned.

use crate::registry::Registry;
use crate::store::FileStore;
use arca_core::error::Result;
use arca_core::settings::BackupSettings;
use arca_core::Clock;
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PruneOutcome {
    pub deleted_by_age: usize,
    pub deleted_by_count: usize,
}

pub struct RetentionManager {
    registry: Arc<Registry>,
    store: Arc<dyn FileStore>,
    clock: Arc<dyn Clock>,
}

impl RetentionManager {
    pub fn new(registry: Arc<Registry>, store: Arc<dyn FileStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry,
            store,
            clock,
        }
    }

    pub fn prune(&self, settings: &BackupSettings) -> Result<PruneOutcome> {
        let mut outcome = PruneOutcome::default();
        let cutoff = self.clock.now() - Duration::days(settings.retention_days as i64);

        // Age pass: unconditional.
        for record in self.registry.list()? {
            if record.created_at < cutoff {
                self.delete_backup(&record.filename, record.id)?;
                outcome.deleted_by_age += 1;
            }
        }

        // Count pass: oldest-first surplus beyond max_backups.
        let remaining = self.registry.list()?;
        if remaining.len() > settings.max_backups {
            let surplus = remaining.len() - settings.max_backups;
            // list() is newest first, so the surplus sits at the tail.
            for record in remaining.iter().rev().take(surplus) {
                self.delete_backup(&record.filename, record.id)?;
                outcome.deleted_by_count += 1;
            }
        }

        if outcome.deleted_by_age + outcome.deleted_by_count > 0 {
            info!(
                "Pruned backups: {} by age, {} by count",
                outcome.deleted_by_age, outcome.deleted_by_count
            );
        }

        Ok(outcome)
    }

    fn delete_backup(&self, filename: &str, id: u64) -> Result<()> {
        if let Err(e) = self.store.delete(filename) {
            // A row whose file cannot be removed is still pruned; the
            // reconciler will pick the file up again if it survives.
            warn!("Could not delete backup file {}: {}", filename, e);
        }
        self.registry.delete(id)?;
        Ok(())
    }
}
