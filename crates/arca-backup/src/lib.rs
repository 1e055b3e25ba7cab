//! Arca Backup System
//!
//! This crate implements backup and restore for an Arca installation's
//! database. Backups are ZIP archives produced by an external dump command
//! and catalogued in a JSON registry; restores extract an archive, sanitize
//! the SQL dump it carries, and replay it against the configured database
//! engine.
//!
//! # Features
//!
//! ## Backup
//! - **Timestamped archives**: filenames carry creation time and trigger kind
//! - **External dump tool**: any command that writes a ZIP to a given path
//! - **Registry**: JSON catalogue of every known backup, with file locking
//! - **Retention**: age- and count-based pruning
//! - **Reconciliation**: adopts orphan files, evicts dangling records
//!
//! ## Restore
//! - **Engine executors**: MySQL (client binary) and SQLite (in-process)
//! - **Pre-restore safety backup**: best-effort snapshot before any mutation
//! - **SQL sanitizing**: rewrites `unistr(...)` calls into plain literals
//! - **Raw-file fast path**: SQLite archives carrying the database file
//!   itself are restored by file swap, parking the current database
//!
//! # Examples
//!
//! ```no_run
//! use arca_backup::{BackupOrchestrator, CommandDumpTool, Registry};
//! use arca_backup::audit::TracingAuditLogger;
//! use arca_backup::engine::TokioProcessRunner;
//! use arca_backup::registry::BackupKind;
//! use arca_backup::store::LocalFileStore;
//! use arca_core::SystemClock;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> arca_core::error::Result<()> {
//!     let registry = Arc::new(Registry::new("/var/lib/arca/registry.json"));
//!     let store = Arc::new(LocalFileStore::new("/var/lib/arca/backups")?);
//!     let tool = CommandDumpTool::new(
//!         vec!["arca-dump".to_string()],
//!         Arc::new(TokioProcessRunner),
//!     );
//!
//!     let orchestrator = BackupOrchestrator::new(
//!         registry,
//!         store,
//!         Arc::new(tool),
//!         Arc::new(SystemClock),
//!         Arc::new(TracingAuditLogger),
//!     );
//!
//!     let record = orchestrator.run(BackupKind::Manual, "7").await?;
//!     println!("Backup created: {}", record.filename);
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod audit;
pub mod backup;
pub mod connection;
pub mod engine;
pub mod filename;
pub mod lock;
pub mod reconcile;
pub mod registry;
pub mod restore;
pub mod retention;
pub mod sanitize;
pub mod store;

// Re-export commonly used types
pub use archive::{ExtractedArchive, DUMP_SUBDIR};
pub use audit::{AuditEvent, AuditLogger, TracingAuditLogger};
pub use backup::{BackupOrchestrator, CommandDumpTool, DumpTool, BACKUP_TIMEOUT};
pub use connection::{DbConnection, NoopDbConnection, SqliteDbConnection};
pub use engine::{executor_for, RestoreDump, RestoreExecutor, TokioProcessRunner};
pub use filename::{format_backup_filename, parse_backup_filename};
pub use lock::{OperationLock, LOCK_FILENAME};
pub use reconcile::{ReconcileOutcome, Reconciler};
pub use registry::{BackupKind, BackupRecord, NewBackupRecord, Registry, SYSTEM_CAUSER};
pub use restore::{RestoreOrchestrator, RESTORE_TIMEOUT};
pub use retention::{PruneOutcome, RetentionManager};
pub use sanitize::sanitize_dump;
pub use store::{FileStore, LocalFileStore};
