//! Application configuration.
//!
//! Unlike [`crate::settings`], which holds the user-tunable backup policy,
//! this file describes the deployment: where the backup directory lives,
//! which database engine the application runs on, and how to invoke the
//! dump-producing tool. Loaded once at startup from JSON.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Live database the restore executors target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum DatabaseConfig {
    Mysql(MysqlConfig),
    Sqlite(SqliteConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysqlConfig {
    #[serde(default = "default_mysql_host")]
    pub host: String,
    #[serde(default = "default_mysql_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path to the live database file
    pub database_path: PathBuf,
}

fn default_mysql_host() -> String {
    "127.0.0.1".to_string()
}

fn default_mysql_port() -> u16 {
    3306
}

/// Top-level configuration for the arca CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcaConfig {
    /// Directory holding the backup archives
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Registry catalogue file
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,

    /// Backup settings file
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,

    /// Live database the backups belong to
    pub database: DatabaseConfig,

    /// Dump tool invocation; the target archive path is appended as the
    /// final argument
    #[serde(default)]
    pub dump_command: Vec<String>,
}

fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".arca")
}

fn default_backup_dir() -> PathBuf {
    data_dir().join("backups")
}

fn default_registry_path() -> PathBuf {
    data_dir().join("registry.json")
}

fn default_settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

impl ArcaConfig {
    /// Default config file location (~/.arca/config.json).
    pub fn default_path() -> PathBuf {
        data_dir().join("config.json")
    }

    /// Load configuration from the given path, or the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        let contents = fs::read_to_string(&path).map_err(|e| {
            crate::error::Error::settings(
                path.display().to_string(),
                format!("cannot read config: {e}"),
            )
        })?;
        Ok(serde_json::from_str(&contents)?)
    }
}
