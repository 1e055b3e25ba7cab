//! File store abstraction over the backup directory.
//!
//! The physical directory is ground truth for archive bytes; the registry is
//! ground truth for metadata. Only the reconciler copies facts from here
//! into the registry, never the reverse.

use arca_core::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub trait FileStore: Send + Sync {
    /// Base names of all regular files in the store.
    fn list(&self) -> Result<Vec<String>>;

    fn exists(&self, name: &str) -> bool;

    fn size(&self, name: &str) -> Result<u64>;

    fn read(&self, name: &str) -> Result<Vec<u8>>;

    fn write(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Delete a file. Deleting a name that does not exist is not an error:
    /// retention and reconciliation both tolerate already-orphaned rows.
    fn delete(&self, name: &str) -> Result<()>;

    /// Absolute path a name maps to, whether or not it exists yet.
    fn path_of(&self, name: &str) -> PathBuf;
}

/// File store over a local directory.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileStore for LocalFileStore {
    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    fn size(&self, name: &str) -> Result<u64> {
        Ok(fs::metadata(self.path_of(name))?.len())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.path_of(name))?)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        fs::write(self.path_of(name), bytes)?;
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.path_of(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_read_delete() {
        let temp = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp.path().join("backups")).unwrap();

        store.write("a.zip", b"bytes").unwrap();
        assert!(store.exists("a.zip"));
        assert_eq!(store.size("a.zip").unwrap(), 5);
        assert_eq!(store.read("a.zip").unwrap(), b"bytes");

        store.delete("a.zip").unwrap();
        assert!(!store.exists("a.zip"));
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let temp = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp.path()).unwrap();
        store.delete("never-existed.zip").unwrap();
    }

    #[test]
    fn test_list_skips_directories() {
        let temp = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp.path()).unwrap();
        store.write("b.zip", b"b").unwrap();
        store.write("a.zip", b"a").unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();

        assert_eq!(store.list().unwrap(), vec!["a.zip", "b.zip"]);
    }
}
