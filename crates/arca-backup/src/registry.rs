//! Durable catalogue of backup records.
//!
//! The registry stores metadata only; the archive bytes live in the file
//! store. It is a single JSON document; mutations serialize on an exclusive
//! sibling lock file and land via temp file + atomic rename, so a reader at
//! any instant (including mid-crash) sees a complete old or complete new
//! document, never a torn one. Records are immutable once created; the only
//! mutation is deletion.

use arca_core::error::{Error, Result};
use chrono::NaiveDateTime;
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Causer recorded for scheduled and reconciler-synthesized records.
pub const SYSTEM_CAUSER: &str = "system";

/// What triggered a backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    Manual,
    Scheduled,
}

impl BackupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
        }
    }
}

impl std::fmt::Display for BackupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalogued backup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRecord {
    /// Registry-assigned identifier
    pub id: u64,

    /// User identifier, or [`SYSTEM_CAUSER`] for unattended runs
    pub causer: String,

    /// Archive base name; the natural key for reconciliation
    pub filename: String,

    /// Archive size, when known
    pub size_bytes: Option<u64>,

    /// What triggered this backup
    pub kind: BackupKind,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Fields of a record before the registry assigns its id.
#[derive(Debug, Clone)]
pub struct NewBackupRecord {
    pub causer: String,
    pub filename: String,
    pub size_bytes: Option<u64>,
    pub kind: BackupKind,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    next_id: u64,
    records: Vec<BackupRecord>,
}

/// JSON-file-backed registry.
pub struct Registry {
    path: PathBuf,
}

impl Registry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a new record and return it with its assigned id.
    pub fn insert(&self, new: NewBackupRecord) -> Result<BackupRecord> {
        self.with_file(|contents| {
            let id = contents.next_id.max(1);
            contents.next_id = id + 1;
            let record = BackupRecord {
                id,
                causer: new.causer.clone(),
                filename: new.filename.clone(),
                size_bytes: new.size_bytes,
                kind: new.kind,
                created_at: new.created_at,
                updated_at: new.created_at,
            };
            contents.records.push(record.clone());
            Ok(record)
        })
    }

    pub fn get(&self, id: u64) -> Result<Option<BackupRecord>> {
        Ok(self.read()?.records.into_iter().find(|r| r.id == id))
    }

    pub fn find_by_filename(&self, filename: &str) -> Result<Option<BackupRecord>> {
        Ok(self
            .read()?
            .records
            .into_iter()
            .find(|r| r.filename == filename))
    }

    /// All records, newest first.
    pub fn list(&self) -> Result<Vec<BackupRecord>> {
        let mut records = self.read()?.records;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.read()?.records.len())
    }

    /// Delete a record. Returns false when the id was unknown.
    pub fn delete(&self, id: u64) -> Result<bool> {
        self.with_file(|contents| {
            let before = contents.records.len();
            contents.records.retain(|r| r.id != id);
            Ok(contents.records.len() != before)
        })
    }

    fn read(&self) -> Result<RegistryFile> {
        if !self.path.exists() {
            return Ok(RegistryFile::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(RegistryFile::default());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Read-modify-write serialized on the sibling lock file. The new
    /// document is written to a temp sibling, synced, then renamed over the
    /// registry path; the catalogue on disk is always a complete document.
    fn with_file<T>(&self, apply: impl FnOnce(&mut RegistryFile) -> Result<T>) -> Result<T> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.sibling("lock"))?;
        lock.lock_exclusive()?;

        let mut parsed = self.read()?;
        let result = apply(&mut parsed)?;

        let json = serde_json::to_string_pretty(&parsed)?;
        let tmp = self.sibling("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        // Lock released when `lock` is dropped.
        Ok(result)
    }

    /// `registry.json.lock`, `registry.json.tmp`.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".");
        name.push(suffix);
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn new_record(filename: &str, created_at: NaiveDateTime) -> NewBackupRecord {
        NewBackupRecord {
            causer: "7".to_string(),
            filename: filename.to_string(),
            size_bytes: Some(1024),
            kind: BackupKind::Manual,
            created_at,
        }
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let temp = TempDir::new().unwrap();
        let registry = Registry::new(temp.path().join("registry.json"));

        let a = registry
            .insert(new_record("2025-03-01-02-00-00-manual.zip", at(1, 2)))
            .unwrap();
        let b = registry
            .insert(new_record("2025-03-02-02-00-00-manual.zip", at(2, 2)))
            .unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.updated_at, a.created_at);
    }

    #[test]
    fn test_get_and_find_by_filename() {
        let temp = TempDir::new().unwrap();
        let registry = Registry::new(temp.path().join("registry.json"));
        let inserted = registry
            .insert(new_record("2025-03-01-02-00-00-manual.zip", at(1, 2)))
            .unwrap();

        let by_id = registry.get(inserted.id).unwrap().unwrap();
        assert_eq!(by_id.filename, inserted.filename);

        let by_name = registry
            .find_by_filename("2025-03-01-02-00-00-manual.zip")
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, inserted.id);

        assert!(registry.get(999).unwrap().is_none());
        assert!(registry.find_by_filename("missing.zip").unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let temp = TempDir::new().unwrap();
        let registry = Registry::new(temp.path().join("registry.json"));
        registry
            .insert(new_record("2025-03-01-02-00-00-manual.zip", at(1, 2)))
            .unwrap();
        registry
            .insert(new_record("2025-03-03-02-00-00-manual.zip", at(3, 2)))
            .unwrap();
        registry
            .insert(new_record("2025-03-02-02-00-00-manual.zip", at(2, 2)))
            .unwrap();

        let listed = registry.list().unwrap();
        let days: Vec<u32> = listed
            .iter()
            .map(|r| chrono::Datelike::day(&r.created_at))
            .collect();
        assert_eq!(days, vec![3, 2, 1]);
    }

    #[test]
    fn test_delete() {
        let temp = TempDir::new().unwrap();
        let registry = Registry::new(temp.path().join("registry.json"));
        let record = registry
            .insert(new_record("2025-03-01-02-00-00-manual.zip", at(1, 2)))
            .unwrap();

        assert!(registry.delete(record.id).unwrap());
        assert!(!registry.delete(record.id).unwrap());
        assert_eq!(registry.count().unwrap(), 0);
    }

    #[test]
    fn test_mutation_replaces_document_atomically() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("registry.json");
        let registry = Registry::new(&path);

        // Stale scratch from an interrupted earlier write must not get in
        // the way.
        std::fs::write(temp.path().join("registry.json.tmp"), b"garbage").unwrap();

        registry
            .insert(new_record("2025-03-01-02-00-00-manual.zip", at(1, 2)))
            .unwrap();

        // The temp sibling was consumed by the rename and the document on
        // disk is complete valid JSON.
        assert!(!temp.path().join("registry.json.tmp").exists());
        let on_disk = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&on_disk).unwrap();
        assert_eq!(parsed["records"].as_array().unwrap().len(), 1);

        registry
            .insert(new_record("2025-03-02-02-00-00-manual.zip", at(2, 2)))
            .unwrap();
        assert!(!temp.path().join("registry.json.tmp").exists());
        assert_eq!(registry.count().unwrap(), 2);
    }

    #[test]
    fn test_persistence_across_instances() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("registry.json");

        let first = Registry::new(&path);
        first
            .insert(new_record("2025-03-01-02-00-00-manual.zip", at(1, 2)))
            .unwrap();

        let second = Registry::new(&path);
        assert_eq!(second.count().unwrap(), 1);
        // Ids keep increasing after a reload.
        let next = second
            .insert(new_record("2025-03-02-02-00-00-manual.zip", at(2, 2)))
            .unwrap();
        assert_eq!(next.id, 2);
    }
}
