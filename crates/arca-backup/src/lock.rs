//! Single-flight lock for backup and restore.
//!
//! Both operations mutate the same backup directory and the same live
//! database, so at most one of either may run system-wide. The lock is an
//! advisory exclusive lock on a well-known file inside the backup directory;
//! acquisition never blocks. A scheduled trigger that finds the lock held
//! skips its run entirely rather than queueing it.

use arca_core::error::{Error, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::debug;

pub const LOCK_FILENAME: &str = ".arca.lock";

/// Held for the duration of one backup or restore; released on drop.
#[derive(Debug)]
pub struct OperationLock {
    file: File,
}

impl OperationLock {
    /// Try to take the lock. Fails fast with [`Error::Busy`] when another
    /// operation holds it.
    pub fn try_acquire(backup_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(backup_dir)?;
        let path = backup_dir.join(LOCK_FILENAME);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock_exclusive() {
            Ok(true) => {
                debug!("Acquired operation lock at {}", path.display());
                Ok(Self { file })
            }
            Ok(false) => Err(Error::Busy),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for OperationLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!("Failed to release operation lock: {}", e);
        }
    }
}
