//! Engine-specific restore executors.
//!
//! Both executors receive the sanitized dump; how it reaches the live
//! database differs per engine. MySQL shells out to the client binary,
//! SQLite either swaps the raw file or re-executes the script through the
//! embedded driver.

use arca_core::config::DatabaseConfig;
use arca_core::error::Result;
use arca_core::Clock;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

pub mod mysql;
pub mod sqlite;

pub use mysql::MysqlExecutor;
pub use sqlite::SqliteExecutor;

/// A dump ready for execution.
#[derive(Debug, Clone)]
pub struct RestoreDump {
    /// Sanitized SQL text
    pub sql: String,

    /// Where the dump file sits in the scratch directory
    pub dump_path: PathBuf,

    /// Raw embedded-database file from the same archive directory, if any
    pub raw_database: Option<PathBuf>,
}

#[async_trait]
pub trait RestoreExecutor: Send + Sync {
    /// Apply the dump to the live database.
    async fn restore(&self, dump: &RestoreDump) -> Result<()>;
}

/// Captured output of an external process invocation.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    /// Stdout and stderr combined for diagnostics.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.trim_end().to_string();
        if !self.stderr.trim().is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(self.stderr.trim_end());
        }
        out
    }
}

/// Seam for external-process invocation, fakeable in tests.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args`, feeding `stdin` and capturing all output.
    async fn run(&self, program: &str, args: &[String], stdin: &[u8]) -> Result<ProcessOutput>;
}

/// Production runner backed by tokio's process support.
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, program: &str, args: &[String], stdin: &[u8]) -> Result<ProcessOutput> {
        // Callers wrap invocations in a timeout that drops this future;
        // the child must die with it, not keep writing into the backup
        // directory after the operation lock is gone.
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut handle) = child.stdin.take() {
            handle.write_all(stdin).await?;
            handle.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        Ok(ProcessOutput {
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Build the executor matching the configured live database.
pub fn executor_for(
    database: &DatabaseConfig,
    runner: Arc<dyn ProcessRunner>,
    clock: Arc<dyn Clock>,
) -> Arc<dyn RestoreExecutor> {
    match database {
        DatabaseConfig::Mysql(config) => Arc::new(MysqlExecutor::new(config.clone(), runner)),
        DatabaseConfig::Sqlite(config) => {
            Arc::new(SqliteExecutor::new(config.database_path.clone(), clock))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timed_out_process_is_killed() {
        let temp = tempfile::TempDir::new().unwrap();
        let marker = temp.path().join("marker");
        let script = format!("sleep 1; touch {}", marker.display());

        let runner = TokioProcessRunner;
        let args = ["-c".to_string(), script];
        let invocation = runner.run("sh", &args, &[]);
        let result = tokio::time::timeout(std::time::Duration::from_millis(100), invocation).await;
        assert!(result.is_err());

        // The child died with the dropped future, so it never reached the
        // touch.
        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[test]
    fn test_combined_output_merges_streams() {
        let output = ProcessOutput {
            status_code: Some(1),
            stdout: "some progress\n".to_string(),
            stderr: "ERROR at line 3\n".to_string(),
        };
        assert_eq!(output.combined(), "some progress\nERROR at line 3");
        assert!(!output.success());
    }

    #[test]
    fn test_combined_output_empty_stderr() {
        let output = ProcessOutput {
            status_code: Some(0),
            stdout: "done\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.combined(), "done");
        assert!(output.success());
    }
}
