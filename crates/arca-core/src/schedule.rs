//! Schedule evaluation for automatic backups.
//!
//! [`should_run`] is a pure function over (wall-clock time, settings). An
//! external periodic driver calls it once per minute tick; the function keeps
//! no state and is safe to call redundantly within the same matching minute.
//! Single-flight protection belongs to the caller.

use crate::settings::BackupSettings;
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// How often a scheduled backup fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleFrequency {
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl ScheduleFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for ScheduleFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!(
                "invalid frequency: {s}. Valid frequencies: hourly, daily, weekly, monthly"
            )),
        }
    }
}

impl std::fmt::Display for ScheduleFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true iff a scheduled backup is due at `now`.
///
/// Day-of-week follows the settings convention: 0 = Sunday.
pub fn should_run(now: NaiveDateTime, settings: &BackupSettings) -> bool {
    if !settings.schedule_enabled {
        return false;
    }

    let minute_matches = now.minute() == settings.schedule_minute;
    let hour_matches = now.hour() == settings.schedule_hour;

    match settings.schedule_frequency {
        ScheduleFrequency::Hourly => minute_matches,
        ScheduleFrequency::Daily => hour_matches && minute_matches,
        ScheduleFrequency::Weekly => {
            now.weekday().num_days_from_sunday() == settings.schedule_day_of_week
                && hour_matches
                && minute_matches
        }
        ScheduleFrequency::Monthly => {
            now.day() == settings.schedule_day_of_month && hour_matches && minute_matches
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn settings(frequency: ScheduleFrequency) -> BackupSettings {
        BackupSettings {
            schedule_enabled: true,
            schedule_frequency: frequency,
            schedule_minute: 30,
            schedule_hour: 2,
            schedule_day_of_week: 1, // Monday
            schedule_day_of_month: 15,
            ..BackupSettings::default()
        }
    }

    /// Sweep a 48-hour window minute by minute and count matches.
    fn sweep(start: NaiveDateTime, settings: &BackupSettings) -> Vec<NaiveDateTime> {
        (0..48 * 60)
            .map(|i| start + Duration::minutes(i))
            .filter(|now| should_run(*now, settings))
            .collect()
    }

    fn start() -> NaiveDateTime {
        // 2025-06-15 is a Sunday
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_disabled_never_runs() {
        let mut s = settings(ScheduleFrequency::Hourly);
        s.schedule_enabled = false;
        assert!(sweep(start(), &s).is_empty());
    }

    #[test]
    fn test_hourly_matches_once_per_hour() {
        let s = settings(ScheduleFrequency::Hourly);
        let matches = sweep(start(), &s);
        assert_eq!(matches.len(), 48);
        assert!(matches.iter().all(|t| t.minute() == 30));
    }

    #[test]
    fn test_daily_matches_once_per_day() {
        let s = settings(ScheduleFrequency::Daily);
        let matches = sweep(start(), &s);
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|t| t.hour() == 2 && t.minute() == 30));
    }

    #[test]
    fn test_weekly_matches_on_configured_weekday() {
        let s = settings(ScheduleFrequency::Weekly);
        // Sweep starts on a Sunday; Monday 02:30 falls inside the window once.
        let matches = sweep(start(), &s);
        assert_eq!(matches.len(), 1);
        let t = matches[0];
        assert_eq!(t.weekday().num_days_from_sunday(), 1);
        assert_eq!((t.hour(), t.minute()), (2, 30));
    }

    #[test]
    fn test_monthly_matches_on_configured_day() {
        let s = settings(ScheduleFrequency::Monthly);
        // Window covers the 15th and 16th; only the 15th matches.
        let matches = sweep(start(), &s);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].day(), 15);
        assert_eq!((matches[0].hour(), matches[0].minute()), (2, 30));
    }

    #[test]
    fn test_redundant_calls_within_matching_minute() {
        let s = settings(ScheduleFrequency::Daily);
        let due = NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(2, 30, 42)
            .unwrap();
        // Stateless: same answer no matter how often it is asked.
        assert!(should_run(due, &s));
        assert!(should_run(due, &s));
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!(
            "hourly".parse::<ScheduleFrequency>().unwrap(),
            ScheduleFrequency::Hourly
        );
        assert_eq!(
            "MONTHLY".parse::<ScheduleFrequency>().unwrap(),
            ScheduleFrequency::Monthly
        );
        assert!("fortnightly".parse::<ScheduleFrequency>().is_err());
    }
}
