//! Filesystem reconciler.
//!
//! Makes the registry agree with the backup directory in both directions:
//! archive files without a record are adopted (metadata recovered from the
//! filename), records without a file are evicted. Idempotent and safe to run
//! at any time; this is what keeps the registry eventually consistent after
//! crashes, manual file operations, or a restore that itself touched the
//! backup directory.

use crate::filename::parse_backup_filename;
use crate::registry::{NewBackupRecord, Registry, SYSTEM_CAUSER};
use crate::store::FileStore;
use arca_core::error::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileOutcome {
    pub adopted: usize,
    pub evicted: usize,
}

pub struct Reconciler {
    registry: Arc<Registry>,
    store: Arc<dyn FileStore>,
}

impl Reconciler {
    pub fn new(registry: Arc<Registry>, store: Arc<dyn FileStore>) -> Self {
        Self { registry, store }
    }

    pub fn reconcile(&self) -> Result<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();

        let files: Vec<String> = self
            .store
            .list()?
            .into_iter()
            .filter(|name| name.ends_with(".zip"))
            .collect();
        let file_set: HashSet<&str> = files.iter().map(String::as_str).collect();

        // Adopt: files with no record.
        for name in &files {
            if self.registry.find_by_filename(name)?.is_some() {
                continue;
            }
            let Some((created_at, kind)) = parse_backup_filename(name) else {
                debug!("Ignoring unrecognized archive name: {}", name);
                continue;
            };
            let size_bytes = self.store.size(name).ok();
            self.registry.insert(NewBackupRecord {
                causer: SYSTEM_CAUSER.to_string(),
                filename: name.clone(),
                size_bytes,
                kind,
                created_at,
            })?;
            info!("Adopted orphan backup file: {}", name);
            outcome.adopted += 1;
        }

        // Evict: records with no file.
        for record in self.registry.list()? {
            if !file_set.contains(record.filename.as_str()) {
                self.registry.delete(record.id)?;
                info!("Evicted dangling record for: {}", record.filename);
                outcome.evicted += 1;
            }
        }

        Ok(outcome)
    }
}
