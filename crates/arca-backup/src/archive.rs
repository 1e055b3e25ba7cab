//! Archive codec: opens a backup ZIP and locates the SQL dump inside.
//!
//! Extraction happens into a fresh scratch directory owned by
//! [`ExtractedArchive`]; the directory is removed when the value is dropped,
//! on every exit path of the restore state machine.

use arca_core::error::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Conventional sub-directory dumps are written to inside the archive.
pub const DUMP_SUBDIR: &str = "db-dumps";

/// Dump file extension.
const DUMP_EXTENSION: &str = "sql";

/// Extensions recognized as a raw embedded-database file.
const RAW_DATABASE_EXTENSIONS: &[&str] = &["sqlite", "sqlite3"];

/// Ordered strategies for finding the dump, first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocateStrategy {
    /// The conventional `db-dumps/` sub-directory
    FixedSubdir,
    /// The scratch root itself
    Root,
    /// Full recursive walk
    Recursive,
}

impl LocateStrategy {
    pub(crate) fn find(&self, root: &Path) -> Option<PathBuf> {
        match self {
            Self::FixedSubdir => first_dump_in_dir(&root.join(DUMP_SUBDIR)),
            Self::Root => first_dump_in_dir(root),
            Self::Recursive => {
                let mut dumps: Vec<PathBuf> = WalkDir::new(root)
                    .follow_links(false)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.into_path())
                    .filter(|p| has_extension(p, DUMP_EXTENSION))
                    .collect();
                dumps.sort();
                dumps.into_iter().next()
            }
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Lexicographically first `.sql` file directly inside `dir`, if any.
fn first_dump_in_dir(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut dumps: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| has_extension(p, DUMP_EXTENSION))
        .collect();
    dumps.sort();
    dumps.into_iter().next()
}

/// A backup archive extracted into a scoped scratch directory.
#[derive(Debug)]
pub struct ExtractedArchive {
    scratch: TempDir,
}

impl ExtractedArchive {
    /// Open and fully extract the archive at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::archive(format!("{}: {e}", path.display())))?;
        let mut zip = ZipArchive::new(file)
            .map_err(|e| Error::archive(format!("{}: {e}", path.display())))?;

        let scratch = tempfile::tempdir()?;
        zip.extract(scratch.path())
            .map_err(|e| Error::archive(format!("{}: {e}", path.display())))?;

        debug!(
            "Extracted {} entries from {} into {}",
            zip.len(),
            path.display(),
            scratch.path().display()
        );

        Ok(Self { scratch })
    }

    /// Scratch directory root. Lives only as long as `self`.
    pub fn root(&self) -> &Path {
        self.scratch.path()
    }

    /// Locate the SQL dump: conventional sub-directory, then the root, then
    /// a recursive walk.
    pub fn locate_dump(&self) -> Option<PathBuf> {
        [
            LocateStrategy::FixedSubdir,
            LocateStrategy::Root,
            LocateStrategy::Recursive,
        ]
        .iter()
        .find_map(|strategy| {
            let found = strategy.find(self.root());
            if let Some(ref path) = found {
                debug!("Located dump via {:?}: {}", strategy, path.display());
            }
            found
        })
    }

    /// Raw embedded-database file sitting next to the dump, if the archive
    /// carried one.
    pub fn raw_database_sibling(&self, dump: &Path) -> Option<PathBuf> {
        let dir = dump.parent()?;
        let entries = std::fs::read_dir(dir).ok()?;
        let mut raws: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| {
                RAW_DATABASE_EXTENSIONS
                    .iter()
                    .any(|ext| has_extension(p, ext))
            })
            .collect();
        raws.sort();
        raws.into_iter().next()
    }
}
