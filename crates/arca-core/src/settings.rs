//! Backup settings with per-key defaults.
//!
//! Each key is independently defaulted: a settings file that only overrides
//! `max_backups` still gets the default schedule. Keys can be updated one at
//! a time through [`SettingsStore::set`], matching the key/value settings
//! surface exposed to external callers.

use crate::error::{Error, Result};
use crate::schedule::ScheduleFrequency;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Backup subsystem settings, one value per persisted key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSettings {
    /// Whether scheduled backups run at all
    #[serde(default)]
    pub schedule_enabled: bool,

    /// How often a scheduled backup fires
    #[serde(default)]
    pub schedule_frequency: ScheduleFrequency,

    /// Minute of the hour (all frequencies)
    #[serde(default)]
    pub schedule_minute: u32,

    /// Hour of the day (daily, weekly, monthly)
    #[serde(default = "default_hour")]
    pub schedule_hour: u32,

    /// Day of the week, 0 = Sunday (weekly)
    #[serde(default)]
    pub schedule_day_of_week: u32,

    /// Day of the month, 1-based (monthly)
    #[serde(default = "default_day_of_month")]
    pub schedule_day_of_month: u32,

    /// Count-based retention: prune oldest backups beyond this many
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,

    /// Age-based retention: prune backups older than this many days
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_hour() -> u32 {
    2
}

fn default_day_of_month() -> u32 {
    1
}

fn default_max_backups() -> usize {
    10
}

fn default_retention_days() -> u32 {
    14
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            schedule_enabled: false,
            schedule_frequency: ScheduleFrequency::default(),
            schedule_minute: 0,
            schedule_hour: default_hour(),
            schedule_day_of_week: 0,
            schedule_day_of_month: default_day_of_month(),
            max_backups: default_max_backups(),
            retention_days: default_retention_days(),
        }
    }
}

impl BackupSettings {
    /// Update a single setting by key name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "schedule_enabled" => {
                self.schedule_enabled = parse_value(key, value)?;
            }
            "schedule_frequency" => {
                self.schedule_frequency = value
                    .parse()
                    .map_err(|e: String| Error::settings(key, e))?;
            }
            "schedule_minute" => {
                self.schedule_minute = parse_bounded(key, value, 0, 59)?;
            }
            "schedule_hour" => {
                self.schedule_hour = parse_bounded(key, value, 0, 23)?;
            }
            "schedule_day_of_week" => {
                self.schedule_day_of_week = parse_bounded(key, value, 0, 6)?;
            }
            "schedule_day_of_month" => {
                self.schedule_day_of_month = parse_bounded(key, value, 1, 31)?;
            }
            "max_backups" => {
                self.max_backups = parse_value(key, value)?;
            }
            "retention_days" => {
                self.retention_days = parse_value(key, value)?;
            }
            _ => {
                return Err(Error::settings(key, "unknown setting"));
            }
        }
        Ok(())
    }

    /// Check every field against its range. Catches out-of-range values in
    /// hand-edited settings files, which `set` alone cannot.
    pub fn validate(&self) -> Result<()> {
        check_range("schedule_minute", self.schedule_minute, 0, 59)?;
        check_range("schedule_hour", self.schedule_hour, 0, 23)?;
        check_range("schedule_day_of_week", self.schedule_day_of_week, 0, 6)?;
        check_range("schedule_day_of_month", self.schedule_day_of_month, 1, 31)?;
        Ok(())
    }

    /// Returns all keys and their current values, in a stable order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("schedule_enabled", self.schedule_enabled.to_string()),
            (
                "schedule_frequency",
                self.schedule_frequency.as_str().to_string(),
            ),
            ("schedule_minute", self.schedule_minute.to_string()),
            ("schedule_hour", self.schedule_hour.to_string()),
            (
                "schedule_day_of_week",
                self.schedule_day_of_week.to_string(),
            ),
            (
                "schedule_day_of_month",
                self.schedule_day_of_month.to_string(),
            ),
            ("max_backups", self.max_backups.to_string()),
            ("retention_days", self.retention_days.to_string()),
        ]
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::settings(key, format!("cannot parse '{value}'")))
}

fn parse_bounded(key: &str, value: &str, min: u32, max: u32) -> Result<u32> {
    let parsed: u32 = parse_value(key, value)?;
    check_range(key, parsed, min, max)?;
    Ok(parsed)
}

fn check_range(key: &str, value: u32, min: u32, max: u32) -> Result<()> {
    if value < min || value > max {
        return Err(Error::settings(
            key,
            format!("{value} is outside {min}..={max}"),
        ));
    }
    Ok(())
}

/// Loads and persists [`BackupSettings`] as JSON on disk.
///
/// A missing file yields defaults; unknown files are never created until the
/// first write.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<BackupSettings> {
        if !self.path.exists() {
            return Ok(BackupSettings::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        let settings: BackupSettings = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, settings: &BackupSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Update one key and persist the result.
    pub fn set(&self, key: &str, value: &str) -> Result<BackupSettings> {
        let mut settings = self.load()?;
        settings.set(key, value)?;
        self.save(&settings)?;
        Ok(settings)
    }
}
