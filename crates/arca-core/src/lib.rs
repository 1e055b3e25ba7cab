//! Shared foundation for the arca backup/restore subsystem.
//!
//! Holds the error taxonomy, deployment configuration, the user-tunable
//! backup settings store, the pure schedule evaluator, and the clock seam.

pub mod clock;
pub mod config;
pub mod error;
pub mod schedule;
pub mod settings;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ArcaConfig, DatabaseConfig, MysqlConfig, SqliteConfig};
pub use error::{Error, Result};
pub use schedule::{should_run, ScheduleFrequency};
pub use settings::{BackupSettings, SettingsStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
