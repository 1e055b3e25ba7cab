//! Error types for arca-core

use thiserror::Error;

/// Result type alias using arca-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Arca
#[derive(Error, Debug)]
pub enum Error {
    /// No backup record with the given id
    #[error("Backup record not found: {id}")]
    NotFound { id: String },

    /// Record exists but its archive is gone from the backup directory
    #[error("Backup file missing from backup directory: {filename}")]
    MissingFile { filename: String },

    /// Archive cannot be opened or extracted
    #[error("Cannot open backup archive: {message}")]
    Archive { message: String },

    /// Archive extracted but contains no SQL dump
    #[error("No SQL dump found inside archive: {filename}")]
    NoDumpFound { filename: String },

    /// Restore-tool or embedded-engine execution failed
    #[error("Restore engine failed: {message}\n{output}")]
    Engine { message: String, output: String },

    /// Dump-producing tool failed
    #[error("Backup tool failed: {message}\n{output}")]
    BackupTool { message: String, output: String },

    /// Post-restore connection re-establishment failed
    #[error("Database reconnect failed: {message}")]
    Reconnect { message: String },

    /// Another backup or restore operation holds the single-flight lock
    #[error("Another backup or restore operation is already running")]
    Busy,

    /// Unknown or malformed settings value
    #[error("Invalid setting {key}: {message}")]
    Settings { key: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a not found error
    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Create a missing file error
    pub fn missing_file(filename: impl Into<String>) -> Self {
        Self::MissingFile {
            filename: filename.into(),
        }
    }

    /// Create an archive error
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    /// Create a no dump found error
    pub fn no_dump_found(filename: impl Into<String>) -> Self {
        Self::NoDumpFound {
            filename: filename.into(),
        }
    }

    /// Create an engine error carrying captured process/driver output
    pub fn engine(message: impl Into<String>, output: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
            output: output.into(),
        }
    }

    /// Create a backup tool error carrying captured process output
    pub fn backup_tool(message: impl Into<String>, output: impl Into<String>) -> Self {
        Self::BackupTool {
            message: message.into(),
            output: output.into(),
        }
    }

    /// Create a reconnect error
    pub fn reconnect(message: impl Into<String>) -> Self {
        Self::Reconnect {
            message: message.into(),
        }
    }

    /// Create a settings error
    pub fn settings(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Settings {
            key: key.into(),
            message: message.into(),
        }
    }
}
