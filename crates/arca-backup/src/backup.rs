//! Backup orchestrator.
//!
//! Invokes the external dump tool at a timestamp-derived archive path, then
//! catalogues the result. Exactly one new archive file and at most one new
//! registry row per invocation; a failed tool run registers nothing.

use crate::audit::{AuditEvent, AuditLogger, BACKUP_COMPLETED, BACKUP_FAILED};
use crate::engine::{ProcessOutput, ProcessRunner};
use crate::filename::format_backup_filename;
use crate::registry::{BackupKind, BackupRecord, NewBackupRecord, Registry};
use crate::store::FileStore;
use arca_core::error::{Error, Result};
use arca_core::Clock;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Upper bound on one dump-tool invocation. Exceeding it aborts the job.
pub const BACKUP_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// The dump-producing tool: given a target path, either writes a complete
/// archive and succeeds, or fails and writes nothing.
#[async_trait]
pub trait DumpTool: Send + Sync {
    async fn produce(&self, target: &Path) -> Result<()>;
}

/// Dump tool backed by a configured external command; the target path is
/// appended as the final argument.
pub struct CommandDumpTool {
    command: Vec<String>,
    runner: Arc<dyn ProcessRunner>,
}

impl CommandDumpTool {
    pub fn new(command: Vec<String>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { command, runner }
    }
}

#[async_trait]
impl DumpTool for CommandDumpTool {
    async fn produce(&self, target: &Path) -> Result<()> {
        let Some((program, base_args)) = self.command.split_first() else {
            return Err(Error::backup_tool("dump_command is not configured", ""));
        };

        let mut args: Vec<String> = base_args.to_vec();
        args.push(target.display().to_string());

        let output: ProcessOutput = self.runner.run(program, &args, &[]).await?;
        if !output.success() {
            return Err(Error::backup_tool(
                format!(
                    "{program} exited with code {}",
                    output
                        .status_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                ),
                output.combined(),
            ));
        }

        if !target.is_file() {
            return Err(Error::backup_tool(
                format!("{program} succeeded but wrote no archive"),
                output.combined(),
            ));
        }

        Ok(())
    }
}

pub struct BackupOrchestrator {
    registry: Arc<Registry>,
    store: Arc<dyn FileStore>,
    tool: Arc<dyn DumpTool>,
    clock: Arc<dyn Clock>,
    audit: Arc<dyn AuditLogger>,
}

impl BackupOrchestrator {
    pub fn new(
        registry: Arc<Registry>,
        store: Arc<dyn FileStore>,
        tool: Arc<dyn DumpTool>,
        clock: Arc<dyn Clock>,
        audit: Arc<dyn AuditLogger>,
    ) -> Self {
        Self {
            registry,
            store,
            tool,
            clock,
            audit,
        }
    }

    /// Produce one backup and catalogue it.
    pub async fn run(&self, trigger: BackupKind, causer: &str) -> Result<BackupRecord> {
        let now = self.clock.now();
        let filename = format_backup_filename(now, trigger);
        let target = self.store.path_of(&filename);

        info!("Starting {} backup: {}", trigger, filename);

        let produced = match tokio::time::timeout(BACKUP_TIMEOUT, self.tool.produce(&target)).await
        {
            Ok(result) => result,
            Err(_) => Err(Error::backup_tool(
                format!("dump tool timed out after {}s", BACKUP_TIMEOUT.as_secs()),
                "",
            )),
        };

        if let Err(e) = produced {
            error!("Backup failed: {}", e);
            self.audit_best_effort(AuditEvent::failed(
                BACKUP_FAILED,
                Some(filename.clone()),
                &e,
            ));
            return Err(e);
        }

        let size_bytes = self.store.size(&filename).ok();
        let record = self.registry.insert(NewBackupRecord {
            causer: causer.to_string(),
            filename: filename.clone(),
            size_bytes,
            kind: trigger,
            created_at: now,
        })?;

        info!(
            "Backup complete: {} ({} bytes)",
            filename,
            size_bytes.unwrap_or(0)
        );
        self.audit_best_effort(AuditEvent::completed(BACKUP_COMPLETED, filename));

        Ok(record)
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
    use crate::store::LocalFileStore;
    use arca_core::FixedClock;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    pub(crate) struct FakeDumpTool {
        pub fail: bool,
    }

    #[async_trait]
    impl DumpTool for FakeDumpTool {
        async fn produce(&self, target: &Path) -> Result<()> {
            if self.fail {
                return Err(Error::backup_tool("dump tool exited with code 2", "boom"));
            }
            std::fs::write(target, b"zip bytes")?;
            Ok(())
        }
    }

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2025, 4, 10)
                .unwrap()
                .and_hms_opt(14, 30, 5)
                .unwrap(),
        ))
    }

    fn orchestrator(
        temp: &TempDir,
        fail: bool,
    ) -> (BackupOrchestrator, Arc<Registry>, Arc<CollectingAuditLogger>) {
        let registry = Arc::new(Registry::new(temp.path().join("registry.json")));
        let store = Arc::new(LocalFileStore::new(temp.path().join("backups")).unwrap());
        let audit = Arc::new(CollectingAuditLogger::default());
        let orchestrator = BackupOrchestrator::new(
            registry.clone(),
            store,
            Arc::new(FakeDumpTool { fail }),
            fixed_clock(),
            audit.clone(),
        );
        (orchestrator, registry, audit)
    }

    #[tokio::test]
    async fn test_successful_backup_registers_one_record() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, registry, audit) = orchestrator(&temp, false);

        let record = orchestrator
            .run(BackupKind::Scheduled, "system")
            .await
            .unwrap();

        assert_eq!(record.filename, "2025-04-10-14-30-05-scheduled.zip");
        assert_eq!(record.kind, BackupKind::Scheduled);
        assert_eq!(record.causer, "system");
        assert_eq!(record.size_bytes, Some(9));
        assert_eq!(registry.count().unwrap(), 1);

        let events = audit.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, BACKUP_COMPLETED);
    }

    #[tokio::test]
    async fn test_failed_tool_registers_nothing() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, registry, audit) = orchestrator(&temp, true);

        let err = orchestrator.run(BackupKind::Manual, "7").await.unwrap_err();
        assert!(matches!(err, Error::BackupTool { .. }));
        assert_eq!(registry.count().unwrap(), 0);

        let events = audit.events.lock().unwrap();
        assert_eq!(events[0].name, BACKUP_FAILED);
    }

    #[tokio::test]
    async fn test_command_tool_rejects_empty_command() {
        struct NeverRunner;

        #[async_trait]
        impl ProcessRunner for NeverRunner {
            async fn run(
                &self,
                _program: &str,
                _args: &[String],
                _stdin: &[u8],
            ) -> Result<ProcessOutput> {
                panic!("should not be invoked");
            }
        }

        let tool = CommandDumpTool::new(vec![], Arc::new(NeverRunner));
        let err = tool.produce(Path::new("/tmp/out.zip")).await.unwrap_err();
        assert!(matches!(err, Error::BackupTool { .. }));
    }
}
