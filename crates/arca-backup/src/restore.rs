//! Restore orchestrator.
//!
//! Drives one restore through its stages:
//! validating, safety backup, extracting, locating, sanitizing, executing,
//! reconnecting, reconciling, done. The safety backup and the final audit
//! event are best-effort; everything else fails the restore. On any failure
//! the orchestrator still attempts a reconnect and a failure audit event,
//! without letting either replace the original error.
//!
//! Once execution begins the live database is being mutated; there is no
//! clean abort from that point, which is exactly why the safety backup runs
//! first.

use crate::archive::ExtractedArchive;
use crate::audit::{AuditEvent, AuditLogger, RESTORE_COMPLETED, RESTORE_FAILED};
use crate::backup::BackupOrchestrator;
use crate::connection::DbConnection;
use crate::engine::{RestoreDump, RestoreExecutor};
use crate::reconcile::Reconciler;
use crate::registry::{BackupKind, Registry, SYSTEM_CAUSER};
use crate::sanitize::sanitize_dump;
use crate::store::FileStore;
use arca_core::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Upper bound on dump execution. Exceeding it aborts the job.
pub const RESTORE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

pub struct RestoreOrchestrator {
    registry: Arc<Registry>,
    store: Arc<dyn FileStore>,
    backup: Arc<BackupOrchestrator>,
    executor: Arc<dyn RestoreExecutor>,
    connection: Arc<dyn DbConnection>,
    audit: Arc<dyn AuditLogger>,
}

impl RestoreOrchestrator {
    pub fn new(
        registry: Arc<Registry>,
        store: Arc<dyn FileStore>,
        backup: Arc<BackupOrchestrator>,
        executor: Arc<dyn RestoreExecutor>,
        connection: Arc<dyn DbConnection>,
        audit: Arc<dyn AuditLogger>,
    ) -> Self {
        Self {
            registry,
            store,
            backup,
            executor,
            connection,
            audit,
        }
    }

    /// Restore the backup catalogued under `id`.
    pub async fn run(&self, id: u64) -> Result<()> {
        // Best-effort lookup for the audit payload; a failing registry read
        // surfaces inside run_stages and takes the failure path below like
        // any other error.
        let filename = self.registry.get(id).ok().flatten().map(|r| r.filename);

        match self.run_stages(id).await {
            Ok(restored) => {
                info!("Restore complete: {}", restored);
                Ok(())
            }
            Err(e) => {
                error!("Restore failed: {}", e);
                // Secondary recovery attempts must not mask the original
                // error.
                if let Err(reconnect_err) = self.connection.reconnect() {
                    warn!("Reconnect after failed restore failed: {}", reconnect_err);
                }
                self.audit_best_effort(AuditEvent::failed(RESTORE_FAILED, filename, &e));
                Err(e)
            }
        }
    }

    async fn run_stages(&self, id: u64) -> Result<String> {
        // Stage 1: Validating
        info!("Stage 1/8: Validating backup record {}", id);
        let record = self.registry.get(id)?.ok_or_else(|| Error::not_found(id))?;
        if !self.store.exists(&record.filename) {
            return Err(Error::missing_file(&record.filename));
        }

        // Stage 2: SafetyBackup. Best-effort: there is nothing to restore
        // *to* if a mandatory safety backup fails, so the risk is accepted.
        info!("Stage 2/8: Taking pre-restore safety backup");
        if let Err(e) = self.backup.run(BackupKind::Manual, SYSTEM_CAUSER).await {
            warn!("Safety backup failed, continuing with restore: {}", e);
        }

        // Stage 3: Extracting. The scratch directory is owned by `archive`
        // and removed on every exit path below.
        info!("Stage 3/8: Extracting {}", record.filename);
        let archive = ExtractedArchive::open(&self.store.path_of(&record.filename))?;

        // Stage 4: Locating
        info!("Stage 4/8: Locating SQL dump");
        let dump_path = archive
            .locate_dump()
            .ok_or_else(|| Error::no_dump_found(&record.filename))?;

        // Stage 5: Sanitizing
        info!("Stage 5/8: Sanitizing dump");
        let raw_sql = std::fs::read_to_string(&dump_path)?;
        let sql = sanitize_dump(&raw_sql);

        // Stage 6: Executing
        info!("Stage 6/8: Executing dump");
        let dump = RestoreDump {
            sql,
            raw_database: archive.raw_database_sibling(&dump_path),
            dump_path,
        };
        match tokio::time::timeout(RESTORE_TIMEOUT, self.executor.restore(&dump)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::engine(
                    format!("restore timed out after {}s", RESTORE_TIMEOUT.as_secs()),
                    "",
                ));
            }
        }
        drop(archive);

        // Stage 7: Reconnecting
        info!("Stage 7/8: Reconnecting live database");
        self.connection.reconnect()?;

        // Stage 8: Reconciling. Full pass: the executor may itself have
        // written or deleted files in the backup directory.
        info!("Stage 8/8: Reconciling registry with backup directory");
        let reconciler = Reconciler::new(self.registry.clone(), self.store.clone());
        let outcome = reconciler.reconcile()?;
        if outcome.adopted + outcome.evicted > 0 {
            info!(
                "Reconciled registry: {} adopted, {} evicted",
                outcome.adopted, outcome.evicted
            );
        }

        self.audit_best_effort(AuditEvent::completed(
            RESTORE_COMPLETED,
            record.filename.clone(),
        ));

        Ok(record.filename)
    }

    fn audit_best_effort(&self, event: AuditEvent) {
        if let Err(e) = self.audit.record(event) {
            warn!("Audit logging failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::testing::CollectingAuditLogger;
    use crate::backup::DumpTool;
    use crate::store::LocalFileStore;
    use arca_core::{Clock, FixedClock};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    struct RecordingExecutor {
        executed: AtomicBool,
        fail: bool,
    }

    #[async_trait]
    impl RestoreExecutor for RecordingExecutor {
        async fn restore(&self, _dump: &RestoreDump) -> Result<()> {
            self.executed.store(true, Ordering::SeqCst);
            if self.fail {
                return Err(Error::engine("execution failed", "diagnostics"));
            }
            Ok(())
        }
    }

    struct CountingConnection {
        reconnects: std::sync::atomic::AtomicUsize,
    }

    impl DbConnection for CountingConnection {
        fn purge(&self) -> Result<()> {
            Ok(())
        }

        fn reconnect(&self) -> Result<()> {
            self.reconnects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ZipDumpTool;

    #[async_trait]
    impl DumpTool for ZipDumpTool {
        async fn produce(&self, target: &Path) -> Result<()> {
            write_zip(target, &[("db-dumps/dump.sql", b"SELECT 1;")]);
            Ok(())
        }
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        use std::io::Write;
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, bytes) in entries {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
    }

    struct Fixture {
        registry: Arc<Registry>,
        store: Arc<LocalFileStore>,
        executor: Arc<RecordingExecutor>,
        connection: Arc<CountingConnection>,
        audit: Arc<CollectingAuditLogger>,
        orchestrator: RestoreOrchestrator,
    }

    fn fixture(temp: &TempDir, executor_fails: bool) -> Fixture {
        let registry = Arc::new(Registry::new(temp.path().join("registry.json")));
        let store = Arc::new(LocalFileStore::new(temp.path().join("backups")).unwrap());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2025, 7, 1)
                .unwrap()
                .and_hms_opt(3, 0, 0)
                .unwrap(),
        ));
        let audit = Arc::new(CollectingAuditLogger::default());
        let backup = Arc::new(BackupOrchestrator::new(
            registry.clone(),
            store.clone(),
            Arc::new(ZipDumpTool),
            clock,
            audit.clone(),
        ));
        let executor = Arc::new(RecordingExecutor {
            executed: AtomicBool::new(false),
            fail: executor_fails,
        });
        let connection = Arc::new(CountingConnection {
            reconnects: std::sync::atomic::AtomicUsize::new(0),
        });
        let orchestrator = RestoreOrchestrator::new(
            registry.clone(),
            store.clone(),
            backup,
            executor.clone(),
            connection.clone(),
            audit.clone(),
        );
        Fixture {
            registry,
            store,
            executor,
            connection,
            audit,
            orchestrator,
        }
    }

    fn register_archive(f: &Fixture, filename: &str, entries: &[(&str, &[u8])]) -> u64 {
        write_zip(&f.store.path_of(filename), entries);
        let (created_at, kind) = crate::filename::parse_backup_filename(filename).unwrap();
        f.registry
            .insert(crate::registry::NewBackupRecord {
                causer: "7".to_string(),
                filename: filename.to_string(),
                size_bytes: f.store.size(filename).ok(),
                kind,
                created_at,
            })
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, false);

        let err = f.orchestrator.run(99).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(!f.executor.executed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_unreadable_registry_still_reconnects_and_audits() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, false);
        std::fs::write(temp.path().join("registry.json"), b"not json at all").unwrap();

        let err = f.orchestrator.run(1).await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));

        assert_eq!(f.connection.reconnects.load(Ordering::SeqCst), 1);
        let events = f.audit.events.lock().unwrap();
        let failed = events.iter().find(|e| e.name == RESTORE_FAILED).unwrap();
        assert!(failed.filename.is_none());
    }

    #[tokio::test]
    async fn test_missing_archive_is_missing_file() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, false);
        let id = register_archive(
            &f,
            "2025-06-01-02-00-00-manual.zip",
            &[("db-dumps/dump.sql", b"SELECT 1;")],
        );
        f.store.delete("2025-06-01-02-00-00-manual.zip").unwrap();

        let err = f.orchestrator.run(id).await.unwrap_err();
        assert!(matches!(err, Error::MissingFile { .. }));
    }

    #[tokio::test]
    async fn test_archive_without_dump_is_no_dump_found() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, false);
        let id = register_archive(
            &f,
            "2025-06-01-02-00-00-manual.zip",
            &[("readme.txt", b"no dump here")],
        );

        let err = f.orchestrator.run(id).await.unwrap_err();
        assert!(matches!(err, Error::NoDumpFound { .. }));
        assert!(!f.executor.executed.load(Ordering::SeqCst));

        // The failure still produced a reconnect attempt and an audit event.
        assert_eq!(f.connection.reconnects.load(Ordering::SeqCst), 1);
        let events = f.audit.events.lock().unwrap();
        assert!(events.iter().any(|e| e.name == RESTORE_FAILED));
    }

    #[tokio::test]
    async fn test_successful_restore_runs_all_stages() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, false);
        let id = register_archive(
            &f,
            "2025-06-01-02-00-00-scheduled.zip",
            &[("db-dumps/dump.sql", b"SELECT 1;")],
        );

        f.orchestrator.run(id).await.unwrap();

        assert!(f.executor.executed.load(Ordering::SeqCst));
        assert_eq!(f.connection.reconnects.load(Ordering::SeqCst), 1);

        let events = f.audit.events.lock().unwrap();
        assert!(events.iter().any(|e| e.name == RESTORE_COMPLETED));

        // Safety backup was catalogued alongside the restored archive.
        assert!(f
            .registry
            .find_by_filename("2025-07-01-03-00-00-manual.zip")
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_executor_failure_reconnects_and_audits_without_masking() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, true);
        let id = register_archive(
            &f,
            "2025-06-01-02-00-00-manual.zip",
            &[("db-dumps/dump.sql", b"SELECT 1;")],
        );

        let err = f.orchestrator.run(id).await.unwrap_err();
        match err {
            Error::Engine { output, .. } => assert_eq!(output, "diagnostics"),
            other => panic!("expected engine error, got {other:?}"),
        }

        assert_eq!(f.connection.reconnects.load(Ordering::SeqCst), 1);
        let events = f.audit.events.lock().unwrap();
        let failed = events.iter().find(|e| e.name == RESTORE_FAILED).unwrap();
        assert_eq!(
            failed.filename.as_deref(),
            Some("2025-06-01-02-00-00-manual.zip")
        );
    }
}
