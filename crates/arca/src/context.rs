//! Shared wiring for command implementations.
//!
//! Everything a command needs (registry, store, orchestrators) hangs off one
//! [`AppContext`] built from the config file, so commands stay thin.

use anyhow::{Context, Result};
use arca_backup::audit::TracingAuditLogger;
use arca_backup::backup::{BackupOrchestrator, CommandDumpTool};
use arca_backup::connection::{DbConnection, NoopDbConnection, SqliteDbConnection};
use arca_backup::engine::{executor_for, TokioProcessRunner};
use arca_backup::lock::OperationLock;
use arca_backup::reconcile::Reconciler;
use arca_backup::registry::Registry;
use arca_backup::restore::RestoreOrchestrator;
use arca_backup::retention::RetentionManager;
use arca_backup::store::{FileStore, LocalFileStore};
use arca_core::config::{ArcaConfig, DatabaseConfig};
use arca_core::settings::SettingsStore;
use arca_core::{Clock, SystemClock};
use std::path::Path;
use std::sync::Arc;

pub struct AppContext {
    pub config: ArcaConfig,
    pub registry: Arc<Registry>,
    pub store: Arc<LocalFileStore>,
    pub settings: SettingsStore,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = ArcaConfig::load(config_path).context("Failed to load configuration")?;
        let registry = Arc::new(Registry::new(config.registry_path.clone()));
        let store = Arc::new(
            LocalFileStore::new(config.backup_dir.clone())
                .context("Failed to open backup directory")?,
        );
        let settings = SettingsStore::new(config.settings_path.clone());
        Ok(Self {
            config,
            registry,
            store,
            settings,
            clock: Arc::new(SystemClock),
        })
    }

    /// Take the single-flight lock guarding backup and restore.
    pub fn lock(&self) -> arca_core::error::Result<OperationLock> {
        OperationLock::try_acquire(&self.config.backup_dir)
    }

    pub fn backup_orchestrator(&self) -> Arc<BackupOrchestrator> {
        let tool = CommandDumpTool::new(
            self.config.dump_command.clone(),
            Arc::new(TokioProcessRunner),
        );
        Arc::new(BackupOrchestrator::new(
            self.registry.clone(),
            self.store.clone() as Arc<dyn FileStore>,
            Arc::new(tool),
            self.clock.clone(),
            Arc::new(TracingAuditLogger),
        ))
    }

    pub fn restore_orchestrator(&self) -> RestoreOrchestrator {
        let executor = executor_for(
            &self.config.database,
            Arc::new(TokioProcessRunner),
            self.clock.clone(),
        );
        let connection: Arc<dyn DbConnection> = match &self.config.database {
            DatabaseConfig::Sqlite(sqlite) => {
                Arc::new(SqliteDbConnection::new(sqlite.database_path.clone()))
            }
            // The MySQL client holds no persistent handle worth reopening.
            DatabaseConfig::Mysql(_) => Arc::new(NoopDbConnection),
        };
        RestoreOrchestrator::new(
            self.registry.clone(),
            self.store.clone() as Arc<dyn FileStore>,
            self.backup_orchestrator(),
            executor,
            connection,
            Arc::new(TracingAuditLogger),
        )
    }

    pub fn retention_manager(&self) -> RetentionManager {
        RetentionManager::new(
            self.registry.clone(),
            self.store.clone() as Arc<dyn FileStore>,
            self.clock.clone(),
        )
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.registry.clone(), self.store.clone() as Arc<dyn FileStore>)
    }
}
