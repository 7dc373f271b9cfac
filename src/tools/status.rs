//! Status and instruction tools

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::{migrations, Database};

/// Usage guide returned by the hydration_instructions tool
pub const HYDRATION_INSTRUCTIONS: &str = r#"
# Waterlog Instructions

Waterlog tracks what you drink and compares it with a personal daily water goal.

## Overview

1. **Profile** - gender, age, height, weight, activity level and country. These
   drive the recommended daily intake. Units and the start hour of a tracking
   day also live here.
2. **Intakes** - each drink you log: drink type, amount, time.
3. **Water goals** - the target for a given day. A day without its own goal
   inherits the base amount of the nearest earlier goal.

---

## Getting Started

1. Call `get_profile` to see the current profile (defaults are used until one is saved).
2. Call `set_profile` with the fields that differ, e.g. `gender`, `age`,
   `height_cm`, `weight_kg`, `physical_activity`, `country`.
3. Call `recalculate_water_goal` to estimate the daily intake from the profile and
   store it as today's goal.

`calculate_water_goal` gives the same estimate without saving anything, and
accepts any profile field as an override. Use it for "what if" questions.

## Logging Drinks

- `list_drinks` shows the 11 drink types with their hydration factors and the
  amount last logged for each.
- `log_intake` takes `drink_type` and `amount`. The amount is in the profile's
  volume units (ml or fl oz). Omit `amount` to reuse the drink's last amount.
  Omit `timestamp` to log at the current time.
- Fix mistakes with `update_intake` or `delete_intake`.

### Drink Types

| Drink | Hydrates | Dehydrates |
|-------|----------|------------|
| water | 100% | - |
| coffee | 98% | - |
| tea | 99% | - |
| soda | 89% | - |
| juice | 85% | - |
| milk | 87% | - |
| sport | 95% | - |
| energy | 90% | - |
| beer | 95% | 50% |
| wine | 85% | 150% |
| hard_liquor | 60% | 400% |

Alcohol takes water away: 50 ml of hard liquor hydrates 30 ml but costs 200 ml,
a water balance of -170 ml.

## Water Goals

- `set_water_goal` marks a day as hot (`is_hot_day`) or highly active
  (`is_high_activity`). Each flag raises that day's goal by the profile's extra
  factor (50% by default).
- `get_water_goal` shows the goal in effect for a date and where it came from.

## Statistics

- `get_day_summary` - intakes, per-drink totals, water balance and progress for one day
- `get_week_statistics` - 7 days starting at `week_start` (defaults to this Monday)
- `get_month_statistics` - every day of the month containing `date`
- `get_year_statistics` - monthly averages for a year

## Notes

- Dates use ISO format: YYYY-MM-DD
- Timestamps use YYYY-MM-DDTHH:MM:SS in local time
- With `day_offset_hours` set to 4, drinks logged before 04:00 count towards
  the previous day
- Amounts are stored in millilitres; responses include a formatted value in
  the profile's units
"#;

/// Runtime status of the waterlog service
#[derive(Debug, Clone, Serialize)]
pub struct WaterlogStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: Option<i32>,
    pub needs_migration: Option<bool>,
    pub intake_count: Option<i64>,
    pub water_goal_count: Option<i64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

struct DatabaseStats {
    schema_version: i32,
    needs_migration: bool,
    intake_count: i64,
    water_goal_count: i64,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status; database fields are `None` when it cannot be read
    pub fn get_status(&self, database: &Database) -> WaterlogStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let stats = database
            .with_conn(|conn| {
                Ok(DatabaseStats {
                    schema_version: migrations::get_schema_version(conn)?,
                    needs_migration: migrations::needs_migration(conn)?,
                    intake_count: conn.query_row("SELECT COUNT(*) FROM intakes", [], |r| r.get(0))?,
                    water_goal_count: conn.query_row("SELECT COUNT(*) FROM water_goals", [], |r| r.get(0))?,
                })
            })
            .map_err(|e| tracing::warn!(error = %e, "failed to read database stats"))
            .ok();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        WaterlogStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version: stats.as_ref().map(|s| s.schema_version),
            needs_migration: stats.as_ref().map(|s| s.needs_migration),
            intake_count: stats.as_ref().map(|s| s.intake_count),
            water_goal_count: stats.as_ref().map(|s| s.water_goal_count),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_database;

    #[test]
    fn test_status_reports_database_state() {
        let db = test_database("status");
        let path = db.path.clone();
        let status = StatusTracker::new(path.clone()).get_status(&db);

        assert_eq!(status.schema_version, Some(migrations::SCHEMA_VERSION));
        assert_eq!(status.needs_migration, Some(false));
        assert_eq!(status.intake_count, Some(0));
        assert_eq!(status.database_path, path.display().to_string());
        assert_eq!(status.process_id, std::process::id());
    }
}
