//! Audit event emission.
//!
//! Orchestrators report the four lifecycle events to an [`AuditLogger`].
//! Recording is always best-effort at the call sites: a failing logger is
//! logged as a warning and never overturns the operation's outcome.

use arca_core::error::Result;
use serde::Serialize;
use tracing::info;

pub const BACKUP_COMPLETED: &str = "backup.completed";
pub const BACKUP_FAILED: &str = "backup.failed";
pub const RESTORE_COMPLETED: &str = "restore.completed";
pub const RESTORE_FAILED: &str = "restore.failed";

/// One structured audit event.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditEvent {
    pub fn completed(name: &'static str, filename: impl Into<String>) -> Self {
        Self {
            name,
            filename: Some(filename.into()),
            error: None,
        }
    }

    pub fn failed(name: &'static str, filename: Option<String>, error: impl ToString) -> Self {
        Self {
            name,
            filename,
            error: Some(error.to_string()),
        }
    }
}

pub trait AuditLogger: Send + Sync {
    fn record(&self, event: AuditEvent) -> Result<()>;
}

/// Default logger: events land in the tracing stream under the `audit`
/// target.
pub struct TracingAuditLogger;

impl AuditLogger for TracingAuditLogger {
    fn record(&self, event: AuditEvent) -> Result<()> {
        info!(
            target: "audit",
            event = event.name,
            filename = event.filename.as_deref().unwrap_or(""),
            error = event.error.as_deref().unwrap_or(""),
            "audit event"
        );
        Ok(())
    }
}
