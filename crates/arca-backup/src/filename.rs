//! Backup archive naming.
//!
//! The filename is the correlation key between the registry and the backup
//! directory, and the only channel through which kind and creation time can
//! be recovered for files that were never registered (external copies, runs
//! that crashed between writing the file and inserting the record). Two
//! patterns are accepted:
//!
//! - `YYYY-MM-DD-HH-MM-SS-{manual|scheduled}.zip`
//! - `YYYY-MM-DD-HH-MM-SS.zip` (legacy, implies manual)
//!
//! External tooling depends on these patterns; do not change them.

use crate::registry::BackupKind;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

fn filename_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(\d{4})-(\d{2})-(\d{2})-(\d{2})-(\d{2})-(\d{2})(?:-(manual|scheduled))?\.zip$",
        )
        .expect("filename pattern is valid")
    })
}

/// Formats an archive filename for a backup created at `t`.
pub fn format_backup_filename(t: NaiveDateTime, kind: BackupKind) -> String {
    format!("{}-{}.zip", t.format("%Y-%m-%d-%H-%M-%S"), kind.as_str())
}

/// Parses an archive filename back into its creation time and kind.
///
/// Returns `None` for names outside the two accepted patterns, including
/// syntactically matching names with impossible dates.
pub fn parse_backup_filename(name: &str) -> Option<(NaiveDateTime, BackupKind)> {
    let captures = filename_pattern().captures(name)?;

    let field = |i: usize| captures.get(i).unwrap().as_str().parse::<u32>().unwrap();

    let date = NaiveDate::from_ymd_opt(field(1) as i32, field(2), field(3))?;
    let datetime = date.and_hms_opt(field(4), field(5), field(6))?;

    let kind = match captures.get(7).map(|m| m.as_str()) {
        Some("scheduled") => BackupKind::Scheduled,
        // Absent suffix is the legacy form and implies manual.
        _ => BackupKind::Manual,
    };

    Some((datetime, kind))
}
