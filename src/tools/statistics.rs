//! Statistics tools
//!
//! Day summary plus week, month and year overviews comparing water balance
//! with the water goal. All ranges are half-open and follow the profile's
//! day offset.

use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;

use super::intakes::IntakeDetail;
use super::water_goals::GoalForDate;
use super::{current_day, format_amount, parse_date_arg, parse_date_str, percent_of};
use crate::db::{Database, DbResult};
use crate::models::{
    dates, AggregateFunction, GroupingUnit, Intake, UserProfile, WaterGoal,
};

/// Per-drink totals in a day summary
#[derive(Debug, Serialize)]
pub struct DrinkTotalSummary {
    pub drink_type: String,
    pub drink_name: String,
    pub intake_count: i64,
    pub amount: f64,
    pub amount_formatted: String,
    pub hydration: f64,
    pub dehydration: f64,
}

/// Response for get_day_summary
#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub date: String,
    /// Start of the tracking day
    pub day_begins_at: String,
    pub intakes: Vec<IntakeDetail>,
    pub drinks: Vec<DrinkTotalSummary>,
    pub total_amount: f64,
    pub hydration: f64,
    pub dehydration: f64,
    pub water_balance: f64,
    pub water_balance_formatted: String,
    pub goal: GoalForDate,
    pub remaining: f64,
    pub remaining_formatted: String,
    pub percent_of_goal: f64,
    pub goal_reached: bool,
}

#[derive(Debug, Serialize)]
pub struct DayStatistics {
    pub date: String,
    pub hydration: f64,
    pub dehydration: f64,
    pub water_balance: f64,
    pub goal: f64,
    pub percent_of_goal: f64,
    pub goal_reached: bool,
}

/// Response for get_week_statistics and get_month_statistics
#[derive(Debug, Serialize)]
pub struct PeriodStatistics {
    pub begin: String,
    /// Exclusive
    pub end: String,
    pub days: Vec<DayStatistics>,
    pub average_water_balance: f64,
    pub average_water_balance_formatted: String,
    pub average_goal: f64,
    pub days_goal_reached: usize,
}

#[derive(Debug, Serialize)]
pub struct MonthStatistics {
    /// "2015-01"
    pub month: String,
    pub average_hydration: f64,
    pub average_dehydration: f64,
    pub average_water_balance: f64,
    pub average_goal: f64,
    pub percent_of_goal: f64,
}

/// Response for get_year_statistics
#[derive(Debug, Serialize)]
pub struct YearStatistics {
    pub year: i32,
    pub months: Vec<MonthStatistics>,
    pub average_water_balance: f64,
    pub average_water_balance_formatted: String,
    pub average_goal: f64,
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn day_statistics(
    conn: &Connection,
    profile: &UserProfile,
    begin: NaiveDate,
    end: NaiveDate,
) -> DbResult<Vec<DayStatistics>> {
    let parts = Intake::fetch_amount_parts_grouped_by(
        conn,
        GroupingUnit::Day,
        begin,
        end,
        profile.day_offset_hours,
        AggregateFunction::Summary,
    )?;
    let goals = WaterGoal::amounts_for_range(
        conn,
        begin,
        end,
        &profile.goal_factors(),
        profile.daily_water_intake,
    )?;

    Ok(parts
        .iter()
        .zip(goals)
        .enumerate()
        .map(|(i, (p, goal))| {
            let balance = p.water_balance();
            DayStatistics {
                date: dates::format_date(begin + Duration::days(i as i64)),
                hydration: p.hydration,
                dehydration: p.dehydration,
                water_balance: balance,
                goal,
                percent_of_goal: percent_of(balance, goal),
                goal_reached: balance >= goal,
            }
        })
        .collect())
}

fn period_statistics(
    db: &Database,
    begin: NaiveDate,
    end: NaiveDate,
) -> Result<PeriodStatistics, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;

    let days = day_statistics(&conn, &profile, begin, end)
        .map_err(|e| format!("Failed to compute statistics: {}", e))?;

    let average_water_balance = average(days.iter().map(|d| d.water_balance));
    Ok(PeriodStatistics {
        begin: dates::format_date(begin),
        end: dates::format_date(end),
        average_water_balance,
        average_water_balance_formatted: format_amount(average_water_balance, profile.volume_units),
        average_goal: average(days.iter().map(|d| d.goal)),
        days_goal_reached: days.iter().filter(|d| d.goal_reached).count(),
        days,
    })
}

// ============================================================================
// Tool Functions
// ============================================================================

/// Everything drunk on one tracking day (default today) against its goal
pub fn get_day_summary(db: &Database, date: Option<&str>) -> Result<DaySummary, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;

    let date = parse_date_arg(date, &profile)?;

    let intakes = Intake::fetch_for_day(&conn, date, profile.day_offset_hours)
        .map_err(|e| format!("Failed to get intakes: {}", e))?;
    let totals = Intake::totals_by_drink_for_day(&conn, date, profile.day_offset_hours)
        .map_err(|e| format!("Failed to get drink totals: {}", e))?;
    let goal = WaterGoal::get_for_date(&conn, date)
        .map_err(|e| format!("Failed to get water goal: {}", e))?;
    let goal = GoalForDate::resolve(date, goal, &profile.goal_factors(), &profile);

    let hydration: f64 = intakes.iter().map(Intake::hydration_amount).sum();
    let dehydration: f64 = intakes.iter().map(Intake::dehydration_amount).sum();
    let water_balance = hydration - dehydration;
    let remaining = (goal.amount - water_balance).max(0.0);

    Ok(DaySummary {
        date: dates::format_date(date),
        day_begins_at: dates::format_timestamp(dates::day_start(date, profile.day_offset_hours)),
        intakes: intakes.iter().map(|i| IntakeDetail::new(i, &profile)).collect(),
        drinks: totals
            .iter()
            .map(|t| DrinkTotalSummary {
                drink_type: t.drink_type.as_str().to_string(),
                drink_name: t.drink_type.display_name().to_string(),
                intake_count: t.intake_count,
                amount: t.amount,
                amount_formatted: format_amount(t.amount, profile.volume_units),
                hydration: t.hydration,
                dehydration: t.dehydration,
            })
            .collect(),
        total_amount: intakes.iter().map(|i| i.amount).sum(),
        hydration,
        dehydration,
        water_balance,
        water_balance_formatted: format_amount(water_balance, profile.volume_units),
        remaining,
        remaining_formatted: format_amount(remaining, profile.volume_units),
        percent_of_goal: percent_of(water_balance, goal.amount),
        goal_reached: water_balance >= goal.amount,
        goal,
    })
}

/// Seven days from `week_start` (default: Monday of the current week)
pub fn get_week_statistics(db: &Database, week_start: Option<&str>) -> Result<PeriodStatistics, String> {
    let begin = match week_start {
        Some(s) => parse_date_str(s)?,
        None => {
            let profile = db
                .with_conn(UserProfile::get)
                .map_err(|e| format!("Failed to get profile: {}", e))?;
            let today = current_day(&profile);
            today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
        }
    };

    period_statistics(db, begin, begin + Duration::days(7))
}

/// Every day of the month containing `date` (default: current month)
pub fn get_month_statistics(db: &Database, date: Option<&str>) -> Result<PeriodStatistics, String> {
    let date = match date {
        Some(s) => parse_date_str(s)?,
        None => {
            let profile = db
                .with_conn(UserProfile::get)
                .map_err(|e| format!("Failed to get profile: {}", e))?;
            current_day(&profile)
        }
    };
    let begin = dates::first_day_of_month(date);

    period_statistics(db, begin, dates::add_months(begin, 1))
}

/// Monthly averages for a year (default: current year)
pub fn get_year_statistics(db: &Database, year: Option<i32>) -> Result<YearStatistics, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;

    let year = year.unwrap_or_else(|| current_day(&profile).year());
    let begin = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| format!("Invalid year: {}", year))?;
    let end = dates::add_months(begin, 12);

    let parts = Intake::fetch_amount_parts_grouped_by(
        &conn,
        GroupingUnit::Month,
        begin,
        end,
        profile.day_offset_hours,
        AggregateFunction::Average,
    )
    .map_err(|e| format!("Failed to compute statistics: {}", e))?;
    let goals = WaterGoal::amounts_grouped_by_months(
        &conn,
        begin,
        end,
        &profile.goal_factors(),
        profile.daily_water_intake,
    )
    .map_err(|e| format!("Failed to compute statistics: {}", e))?;

    let months: Vec<MonthStatistics> = parts
        .iter()
        .zip(goals)
        .enumerate()
        .map(|(i, (p, goal))| {
            let balance = p.water_balance();
            MonthStatistics {
                month: format!("{:04}-{:02}", year, i + 1),
                average_hydration: p.hydration,
                average_dehydration: p.dehydration,
                average_water_balance: balance,
                average_goal: goal,
                percent_of_goal: percent_of(balance, goal),
            }
        })
        .collect();

    let average_water_balance = average(months.iter().map(|m| m.average_water_balance));
    Ok(YearStatistics {
        year,
        average_water_balance,
        average_water_balance_formatted: format_amount(average_water_balance, profile.volume_units),
        average_goal: average(months.iter().map(|m| m.average_goal)),
        months,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::intakes::log_intake;
    use crate::tools::profile::{set_profile, ProfileFields};
    use crate::tools::test_database;
    use crate::tools::water_goals::{set_water_goal, GoalSource};

    #[test]
    fn test_day_summary() {
        let db = test_database("stats-day");
        set_water_goal(&db, Some("2015-01-02"), Some(2000.0), None, None).unwrap();
        log_intake(&db, "water", Some(750.0), Some("2015-01-02T08:00:00"), None).unwrap();
        log_intake(&db, "water", Some(250.0), Some("2015-01-02T12:00:00"), None).unwrap();
        log_intake(&db, "beer", Some(400.0), Some("2015-01-02T20:00:00"), None).unwrap();
        log_intake(&db, "water", Some(999.0), Some("2015-01-03T08:00:00"), None).unwrap();

        let summary = get_day_summary(&db, Some("2015-01-02")).unwrap();
        assert_eq!(summary.intakes.len(), 3);
        assert_eq!(summary.drinks.len(), 2);
        assert_eq!(summary.drinks[0].drink_type, "water");
        assert_eq!(summary.drinks[0].intake_count, 2);
        assert_eq!(summary.total_amount, 1400.0);
        assert!((summary.water_balance - 1180.0).abs() < 1e-9);
        assert_eq!(summary.goal.source, GoalSource::Exact);
        assert!((summary.remaining - 820.0).abs() < 1e-9);
        assert_eq!(summary.percent_of_goal, 59.0);
        assert!(!summary.goal_reached);
        assert_eq!(summary.day_begins_at, "2015-01-02T00:00:00");
    }

    #[test]
    fn test_day_summary_honours_offset() {
        let db = test_database("stats-day-offset");
        set_profile(&db, ProfileFields { day_offset_hours: Some(4), ..Default::default() }).unwrap();
        log_intake(&db, "water", Some(300.0), Some("2015-01-02T03:00:00"), None).unwrap();
        log_intake(&db, "water", Some(500.0), Some("2015-01-03T02:00:00"), None).unwrap();

        let summary = get_day_summary(&db, Some("2015-01-02")).unwrap();
        assert_eq!(summary.total_amount, 500.0);
        assert_eq!(summary.goal.source, GoalSource::Profile);
        assert_eq!(summary.day_begins_at, "2015-01-02T04:00:00");
    }

    #[test]
    fn test_week_statistics() {
        let db = test_database("stats-week");
        set_water_goal(&db, Some("2015-01-05"), Some(1000.0), None, None).unwrap();
        set_water_goal(&db, Some("2015-01-07"), Some(1000.0), Some(true), None).unwrap();
        log_intake(&db, "water", Some(1200.0), Some("2015-01-05T09:00:00"), None).unwrap();
        log_intake(&db, "water", Some(1200.0), Some("2015-01-07T09:00:00"), None).unwrap();
        log_intake(&db, "water", Some(5000.0), Some("2015-01-12T09:00:00"), None).unwrap();

        let week = get_week_statistics(&db, Some("2015-01-05")).unwrap();
        assert_eq!(week.begin, "2015-01-05");
        assert_eq!(week.end, "2015-01-12");
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.days[0].goal, 1000.0);
        assert!(week.days[0].goal_reached);
        assert_eq!(week.days[2].goal, 1500.0);
        assert!(!week.days[2].goal_reached);
        assert_eq!(week.days[3].goal, 1000.0);
        assert_eq!(week.days_goal_reached, 1);
        assert!((week.average_water_balance - 2400.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_month_statistics_covers_whole_month() {
        let db = test_database("stats-month");
        log_intake(&db, "tea", Some(1000.0), Some("2015-02-28T21:00:00"), None).unwrap();

        let month = get_month_statistics(&db, Some("2015-02-14")).unwrap();
        assert_eq!(month.begin, "2015-02-01");
        assert_eq!(month.end, "2015-03-01");
        assert_eq!(month.days.len(), 28);
        assert!((month.days[27].hydration - 990.0).abs() < 1e-9);
        assert_eq!(month.days[0].goal, 2000.0);
    }

    #[test]
    fn test_year_statistics() {
        let db = test_database("stats-year");
        set_water_goal(&db, Some("2015-01-01"), Some(2000.0), None, None).unwrap();
        log_intake(&db, "water", Some(3100.0), Some("2015-01-15T09:00:00"), None).unwrap();
        log_intake(&db, "water", Some(2800.0), Some("2015-02-15T09:00:00"), None).unwrap();

        let year = get_year_statistics(&db, Some(2015)).unwrap();
        assert_eq!(year.months.len(), 12);
        assert_eq!(year.months[0].month, "2015-01");
        assert!((year.months[0].average_water_balance - 100.0).abs() < 1e-9);
        assert!((year.months[1].average_water_balance - 100.0).abs() < 1e-9);
        assert_eq!(year.months[11].average_water_balance, 0.0);
        assert!((year.months[5].average_goal - 2000.0).abs() < 1e-9);
        assert_eq!(year.months[0].percent_of_goal, 5.0);
    }
}
