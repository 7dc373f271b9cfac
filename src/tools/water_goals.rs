//! Water goal tools

use serde::Serialize;

use super::{format_amount, parse_date_arg, parse_date_str, volume_to_metric};
use crate::db::Database;
use crate::models::{dates, GoalFactors, UserProfile, WaterGoal};

/// Where the goal for a date came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalSource {
    /// A goal stored for exactly that day
    Exact,
    /// Base amount of the nearest earlier (or later) goal
    Inherited,
    /// No goals stored; the profile's daily intake
    Profile,
}

/// Goal in effect for a day
#[derive(Debug, Serialize)]
pub struct GoalForDate {
    pub date: String,
    pub source: GoalSource,
    /// Date of the stored goal this was derived from
    pub goal_date: Option<String>,
    pub base_amount: f64,
    pub is_hot_day: bool,
    pub is_high_activity: bool,
    /// Final goal in ml, bonuses only apply to exact goals
    pub amount: f64,
    pub amount_formatted: String,
}

impl GoalForDate {
    pub(crate) fn resolve(
        date: chrono::NaiveDate,
        goal: Option<WaterGoal>,
        factors: &GoalFactors,
        profile: &UserProfile,
    ) -> Self {
        let date_str = dates::format_date(date);
        let (source, base_amount, is_hot_day, is_high_activity, amount, goal_date) = match goal {
            Some(g) if g.date == date_str => {
                let amount = g.amount(factors);
                (GoalSource::Exact, g.base_amount, g.is_hot_day, g.is_high_activity, amount, Some(g.date))
            }
            Some(g) => (GoalSource::Inherited, g.base_amount, false, false, g.base_amount, Some(g.date)),
            None => (
                GoalSource::Profile,
                profile.daily_water_intake,
                false,
                false,
                profile.daily_water_intake,
                None,
            ),
        };

        Self {
            date: date_str,
            source,
            goal_date,
            base_amount,
            is_hot_day,
            is_high_activity,
            amount,
            amount_formatted: format_amount(amount, profile.volume_units),
        }
    }
}

/// Response for delete_water_goal
#[derive(Debug, Serialize)]
pub struct DeleteGoalResponse {
    pub success: bool,
    pub deleted_date: String,
}

/// Set the goal for a day (default today)
///
/// `base_amount` is in the profile's volume units. Omitted values keep the
/// day's current goal, falling back to the goal in effect for the day and
/// then the profile's daily intake.
pub fn set_water_goal(
    db: &Database,
    date: Option<&str>,
    base_amount: Option<f64>,
    is_hot_day: Option<bool>,
    is_high_activity: Option<bool>,
) -> Result<GoalForDate, String> {
    if let Some(a) = base_amount {
        if a <= 0.0 || !a.is_finite() {
            return Err("Base amount must be greater than 0".to_string());
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;
    let date = parse_date_arg(date, &profile)?;

    let existing = WaterGoal::get_for_date(&conn, date)
        .map_err(|e| format!("Failed to get water goal: {}", e))?;
    let exact = existing.as_ref().filter(|g| g.date == dates::format_date(date));

    let base_amount = match base_amount {
        Some(a) => volume_to_metric(a, profile.volume_units)?,
        None => existing
            .as_ref()
            .map(|g| g.base_amount)
            .unwrap_or(profile.daily_water_intake),
    };
    let is_hot_day = is_hot_day.unwrap_or_else(|| exact.is_some_and(|g| g.is_hot_day));
    let is_high_activity = is_high_activity.unwrap_or_else(|| exact.is_some_and(|g| g.is_high_activity));

    let goal = WaterGoal::upsert(&conn, date, base_amount, is_hot_day, is_high_activity)
        .map_err(|e| format!("Failed to set water goal: {}", e))?;

    tracing::debug!(date = %date, base_amount, is_hot_day, is_high_activity, "water goal set");

    Ok(GoalForDate::resolve(date, Some(goal), &profile.goal_factors(), &profile))
}

pub fn get_water_goal(db: &Database, date: Option<&str>) -> Result<GoalForDate, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;
    let date = parse_date_arg(date, &profile)?;

    let goal = WaterGoal::get_for_date(&conn, date)
        .map_err(|e| format!("Failed to get water goal: {}", e))?;

    Ok(GoalForDate::resolve(date, goal, &profile.goal_factors(), &profile))
}

pub fn delete_water_goal(db: &Database, date: &str) -> Result<DeleteGoalResponse, String> {
    let date = parse_date_str(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = WaterGoal::delete(&conn, date)
        .map_err(|e| format!("Failed to delete water goal: {}", e))?;
    if !deleted {
        return Err(format!("Water goal not found for date: {}", dates::format_date(date)));
    }

    Ok(DeleteGoalResponse {
        success: true,
        deleted_date: dates::format_date(date),
    })
}
