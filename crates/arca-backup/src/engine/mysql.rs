//! MySQL restore executor.
//!
//! Shells out to the `mysql` client with connection parameters passed as
//! individual arguments (no shell involved, so nothing to quote) and the
//! sanitized dump fed through stdin. A non-zero exit becomes an engine
//! error carrying everything the client printed.

use super::{ProcessRunner, RestoreDump, RestoreExecutor};
use arca_core::config::MysqlConfig;
use arca_core::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

const MYSQL_CLIENT: &str = "mysql";

pub struct MysqlExecutor {
    config: MysqlConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl MysqlExecutor {
    pub fn new(config: MysqlConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    fn client_args(&self) -> Vec<String> {
        vec![
            format!("--host={}", self.config.host),
            format!("--port={}", self.config.port),
            format!("--user={}", self.config.user),
            format!("--password={}", self.config.password),
            self.config.database.clone(),
        ]
    }
}

#[async_trait]
impl RestoreExecutor for MysqlExecutor {
    async fn restore(&self, dump: &RestoreDump) -> Result<()> {
        info!(
            "Executing dump against MySQL database '{}' on {}:{}",
            self.config.database, self.config.host, self.config.port
        );

        let output = self
            .runner
            .run(MYSQL_CLIENT, &self.client_args(), dump.sql.as_bytes())
            .await?;

        if !output.success() {
            return Err(Error::engine(
                format!(
                    "mysql exited with code {}",
                    output
                        .status_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                ),
                output.combined(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProcessOutput;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct FakeRunner {
        exit_code: i32,
        stderr: String,
        calls: Mutex<Vec<(String, Vec<String>, Vec<u8>)>>,
    }

    impl FakeRunner {
        fn new(exit_code: i32, stderr: &str) -> Self {
            Self {
                exit_code,
                stderr: stderr.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        async fn run(
            &self,
            program: &str,
            args: &[String],
            stdin: &[u8],
        ) -> Result<ProcessOutput> {
            self.calls.lock().unwrap().push((
                program.to_string(),
                args.to_vec(),
                stdin.to_vec(),
            ));
            Ok(ProcessOutput {
                status_code: Some(self.exit_code),
                stdout: String::new(),
                stderr: self.stderr.clone(),
            })
        }
    }

    fn config() -> MysqlConfig {
        MysqlConfig {
            host: "db.internal".to_string(),
            port: 3307,
            user: "app".to_string(),
            password: "s3cret".to_string(),
            database: "app_db".to_string(),
        }
    }

    fn dump() -> RestoreDump {
        RestoreDump {
            sql: "INSERT INTO t VALUES (1);".to_string(),
            dump_path: PathBuf::from("/tmp/dump.sql"),
            raw_database: None,
        }
    }

    #[tokio::test]
    async fn test_invokes_client_with_connection_args_and_stdin() {
        let runner = Arc::new(FakeRunner::new(0, ""));
        let executor = MysqlExecutor::new(config(), runner.clone());

        executor.restore(&dump()).await.unwrap();

        let calls = runner.calls.lock().unwrap();
        let (program, args, stdin) = &calls[0];
        assert_eq!(program, "mysql");
        assert_eq!(
            args,
            &vec![
                "--host=db.internal".to_string(),
                "--port=3307".to_string(),
                "--user=app".to_string(),
                "--password=s3cret".to_string(),
                "app_db".to_string(),
            ]
        );
        assert_eq!(stdin, b"INSERT INTO t VALUES (1);");
    }

    #[tokio::test]
    async fn test_nonzero_exit_becomes_engine_error_with_output() {
        let runner = Arc::new(FakeRunner::new(1, "ERROR 1064 (42000) at line 1"));
        let executor = MysqlExecutor::new(config(), runner);

        let err = executor.restore(&dump()).await.unwrap_err();
        match err {
            Error::Engine { message, output } => {
                assert!(message.contains("code 1"));
                assert!(output.contains("ERROR 1064"));
            }
            other => panic!("expected engine error, got {other:?}"),
        }
    }
}
