//! Waterlog tools module
//!
//! MCP tool implementations. Each tool takes the shared `Database`, validates
//! its raw arguments and returns a serializable response or an error message.

pub mod intakes;
pub mod profile;
pub mod statistics;
pub mod status;
pub mod water_goals;

use chrono::{NaiveDate, NaiveDateTime};

use crate::hydration::{format_metric_amount, units, Unit};
use crate::models::{dates, UserProfile};

/// Parse a YYYY-MM-DD argument
pub(crate) fn parse_date_str(date: &str) -> Result<NaiveDate, String> {
    dates::parse_date(date).ok_or_else(|| format!("Invalid date: '{}'. Expected YYYY-MM-DD", date))
}

/// Parse an optional YYYY-MM-DD argument, defaulting to the profile's current tracking day
pub(crate) fn parse_date_arg(date: Option<&str>, profile: &UserProfile) -> Result<NaiveDate, String> {
    match date {
        Some(s) => parse_date_str(s),
        None => Ok(current_day(profile)),
    }
}

/// Today's tracking day for the profile
pub(crate) fn current_day(profile: &UserProfile) -> NaiveDate {
    dates::tracking_day(dates::now(), profile.day_offset_hours)
}

/// Parse an optional timestamp argument; `None` stays `None`
pub(crate) fn parse_timestamp_arg(timestamp: Option<&str>) -> Result<Option<NaiveDateTime>, String> {
    timestamp
        .map(|s| {
            dates::parse_timestamp(s).ok_or_else(|| {
                format!("Invalid timestamp: '{}'. Expected YYYY-MM-DDTHH:MM:SS", s)
            })
        })
        .transpose()
}

/// Rounding precision and fraction digits used to show amounts of a unit
fn display_precision(unit: Unit) -> (f64, usize) {
    match unit {
        Unit::Milliliters | Unit::Centimeters => (1.0, 0),
        Unit::FluidOunces | Unit::Kilograms | Unit::Pounds | Unit::Feet => (0.1, 1),
    }
}

/// Human readable amount, e.g. "2,100 ml" or "71.0 fl oz"
pub(crate) fn format_amount(metric_amount: f64, unit: Unit) -> String {
    let (precision, decimals) = display_precision(unit);
    format_metric_amount(metric_amount, unit, precision, decimals, true)
        .unwrap_or_else(|| format!("{:.0} {}", metric_amount, Unit::metric(unit.unit_type()).contraction()))
}

/// Metric amount shown in `unit`, rounded for display
pub(crate) fn displayed_amount(metric_amount: f64, unit: Unit) -> f64 {
    let (precision, _) = display_precision(unit);
    units::convert_metric_amount_to_displayed(metric_amount, unit, precision).unwrap_or(metric_amount)
}

/// Amount entered in `unit`, converted to millilitres
///
/// The result is snapped so it shows back exactly at the display precision.
pub(crate) fn volume_to_metric(amount: f64, unit: Unit) -> Result<f64, String> {
    let (precision, _) = display_precision(unit);
    units::convert(amount, unit, Unit::metric(unit.unit_type()))
        .and_then(|metric| units::adjust_metric_amount_for_storing(metric, unit, precision))
        .ok_or_else(|| format!("'{}' is not a volume unit", unit.contraction()))
}

/// Percent of `goal` reached, one decimal place
pub(crate) fn percent_of(amount: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    (amount / goal * 1000.0).round() / 10.0
}

/// Migrated database in a temp file; the files are removed on drop
#[cfg(test)]
pub(crate) struct TestDatabase {
    db: Option<crate::db::Database>,
    pub path: std::path::PathBuf,
}

#[cfg(test)]
impl TestDatabase {
    fn remove_files(path: &std::path::Path) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}

#[cfg(test)]
impl std::ops::Deref for TestDatabase {
    type Target = crate::db::Database;

    fn deref(&self) -> &Self::Target {
        self.db.as_ref().expect("test database already dropped")
    }
}

#[cfg(test)]
impl Drop for TestDatabase {
    fn drop(&mut self) {
        // Close the pool before unlinking
        self.db.take();
        Self::remove_files(&self.path);
    }
}

/// Fresh migrated database in a temp file, unique per test name
#[cfg(test)]
pub(crate) fn test_database(name: &str) -> TestDatabase {
    let path = std::env::temp_dir().join(format!(
        "waterlog-test-{}-{}.db",
        name,
        std::process::id()
    ));
    TestDatabase::remove_files(&path);

    let db = crate::db::Database::new(&path).unwrap();
    db.with_conn(crate::db::migrations::run_migrations).unwrap();
    TestDatabase { db: Some(db), path }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_per_unit() {
        assert_eq!(format_amount(2100.0, Unit::Milliliters), "2,100 ml");
        assert_eq!(format_amount(2100.0, Unit::FluidOunces), "71.0 fl oz");
        assert!((displayed_amount(500.0, Unit::FluidOunces) - 16.9).abs() < 1e-9);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(1050.0, 2100.0), 50.0);
        assert_eq!(percent_of(700.0, 2100.0), 33.3);
        assert_eq!(percent_of(100.0, 0.0), 0.0);
    }

    #[test]
    fn test_parse_args() {
        let profile = UserProfile::default();
        assert!(parse_date_arg(Some("2015-01-02"), &profile).is_ok());
        assert!(parse_date_arg(Some("02.01.2015"), &profile).is_err());
        assert!(parse_date_str("2015-13-01").is_err());
        assert_eq!(parse_timestamp_arg(None), Ok(None));
        assert!(parse_timestamp_arg(Some("noon")).is_err());
    }

    #[test]
    fn test_default_date_follows_day_offset() {
        let profile = UserProfile { day_offset_hours: 23, ..Default::default() };
        let before = dates::tracking_day(dates::now(), 23);
        let parsed = parse_date_arg(None, &profile).unwrap();
        let after = dates::tracking_day(dates::now(), 23);
        assert!(parsed == before || parsed == after);
    }

    #[test]
    fn test_volume_to_metric_snaps_to_display_precision() {
        assert_eq!(volume_to_metric(249.6, Unit::Milliliters).unwrap(), 250.0);
        let eight_oz = volume_to_metric(8.0, Unit::FluidOunces).unwrap();
        assert!((eight_oz - 236.588).abs() < 0.001);
    }

    #[test]
    fn test_database_files_removed_on_drop() {
        let db = test_database("cleanup");
        let path = db.path.clone();
        assert!(path.exists());
        drop(db);
        assert!(!path.exists());
    }
}
