//! Profile and water goal estimation tools

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{displayed_amount, format_amount, parse_date_arg};
use crate::db::{Database, DbError};
use crate::hydration::{
    calc_daily_water_intake, calc_lost_water, calc_supply_water, Country, Gender,
    PhysicalActivity, Unit, UnitType, WaterGoalData,
};
use crate::models::{dates, ProfileUpdate, UserProfile, WaterGoal};

/// Raw profile fields as received from a client; every field optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFields {
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub physical_activity: Option<String>,
    pub country: Option<String>,
    pub daily_water_intake: Option<f64>,
    pub hot_day_extra_factor: Option<f64>,
    pub high_activity_extra_factor: Option<f64>,
    pub day_offset_hours: Option<u32>,
    pub volume_units: Option<String>,
    pub weight_units: Option<String>,
    pub length_units: Option<String>,
}

impl ProfileFields {
    /// Parse and validate into a model update
    pub fn into_update(self) -> Result<ProfileUpdate, String> {
        let gender = self
            .gender
            .map(|s| {
                Gender::from_str(&s).ok_or_else(|| {
                    format!(
                        "Invalid gender: '{}'. Valid values: man, woman, pregnant_female, breastfeeding_female",
                        s
                    )
                })
            })
            .transpose()?;

        let physical_activity = self
            .physical_activity
            .map(|s| {
                PhysicalActivity::from_str(&s).ok_or_else(|| {
                    format!(
                        "Invalid physical activity: '{}'. Valid values: rare, occasional, weekly, daily",
                        s
                    )
                })
            })
            .transpose()?;

        let country = self
            .country
            .map(|s| {
                Country::from_str(&s).ok_or_else(|| {
                    let valid: Vec<&str> = Country::ALL.iter().map(|c| c.as_str()).collect();
                    format!("Invalid country: '{}'. Valid values: {}", s, valid.join(", "))
                })
            })
            .transpose()?;

        let volume_units = parse_unit(self.volume_units, UnitType::Volume, "volume units", "ml, fl oz")?;
        let weight_units = parse_unit(self.weight_units, UnitType::Weight, "weight units", "kg, lbs")?;
        let length_units = parse_unit(self.length_units, UnitType::Length, "length units", "cm, ft")?;

        if let Some(age) = self.age {
            if age <= 0 {
                return Err("Age must be greater than 0".to_string());
            }
        }
        positive(self.height_cm, "Height")?;
        positive(self.weight_kg, "Weight")?;
        positive(self.daily_water_intake, "Daily water intake")?;

        for (factor, name) in [
            (self.hot_day_extra_factor, "Hot day extra factor"),
            (self.high_activity_extra_factor, "High activity extra factor"),
        ] {
            if let Some(f) = factor {
                if !(0.0..=1.0).contains(&f) {
                    return Err(format!("{} must be between 0 and 1", name));
                }
            }
        }

        if let Some(hours) = self.day_offset_hours {
            if hours > 23 {
                return Err("Day offset must be between 0 and 23 hours".to_string());
            }
        }

        Ok(ProfileUpdate {
            gender,
            age: self.age,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            physical_activity,
            country,
            daily_water_intake: self.daily_water_intake,
            hot_day_extra_factor: self.hot_day_extra_factor,
            high_activity_extra_factor: self.high_activity_extra_factor,
            day_offset_hours: self.day_offset_hours,
            volume_units,
            weight_units,
            length_units,
        })
    }
}

fn parse_unit(
    value: Option<String>,
    unit_type: UnitType,
    what: &str,
    valid: &str,
) -> Result<Option<Unit>, String> {
    value
        .map(|s| {
            Unit::from_str_of_type(&s, unit_type)
                .ok_or_else(|| format!("Invalid {}: '{}'. Valid values: {}", what, s, valid))
        })
        .transpose()
}

fn positive(value: Option<f64>, name: &str) -> Result<(), String> {
    match value {
        Some(v) if v <= 0.0 || !v.is_finite() => Err(format!("{} must be greater than 0", name)),
        _ => Ok(()),
    }
}

/// Calculator inputs must be physically meaningful
fn validate_goal_data(data: &WaterGoalData) -> Result<(), String> {
    if data.age <= 0 {
        return Err("Age must be greater than 0".to_string());
    }
    positive(Some(data.height), "Height")?;
    positive(Some(data.weight), "Weight")?;
    Ok(())
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub gender: String,
    pub age: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// Height and weight in the profile's display units
    pub height_formatted: String,
    pub weight_formatted: String,
    pub physical_activity: String,
    pub country: String,
    pub daily_water_intake: f64,
    pub daily_water_intake_formatted: String,
    pub hot_day_extra_factor: f64,
    pub high_activity_extra_factor: f64,
    pub day_offset_hours: u32,
    pub volume_units: String,
    pub weight_units: String,
    pub length_units: String,
    /// False while the defaults are in use
    pub is_saved: bool,
}

impl ProfileResponse {
    fn new(profile: &UserProfile, is_saved: bool) -> Self {
        Self {
            gender: profile.gender.as_str().to_string(),
            age: profile.age,
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            height_formatted: format_amount(profile.height_cm, profile.length_units),
            weight_formatted: format_amount(profile.weight_kg, profile.weight_units),
            physical_activity: profile.physical_activity.as_str().to_string(),
            country: profile.country.as_str().to_string(),
            daily_water_intake: profile.daily_water_intake,
            daily_water_intake_formatted: format_amount(profile.daily_water_intake, profile.volume_units),
            hot_day_extra_factor: profile.hot_day_extra_factor,
            high_activity_extra_factor: profile.high_activity_extra_factor,
            day_offset_hours: profile.day_offset_hours,
            volume_units: profile.volume_units.contraction().to_string(),
            weight_units: profile.weight_units.contraction().to_string(),
            length_units: profile.length_units.contraction().to_string(),
            is_saved,
        }
    }
}

/// Estimate breakdown, all values in ml
#[derive(Debug, Serialize)]
pub struct WaterGoalCalculation {
    pub gender: String,
    pub age: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub physical_activity: String,
    pub country: String,
    pub daily_water_intake: f64,
    pub lost_water: f64,
    pub supply_water: f64,
    pub daily_water_intake_displayed: f64,
    pub daily_water_intake_formatted: String,
    pub units: String,
}

impl WaterGoalCalculation {
    fn new(data: &WaterGoalData, volume_units: Unit) -> Self {
        let daily = calc_daily_water_intake(data);
        Self {
            gender: data.gender.as_str().to_string(),
            age: data.age,
            height_cm: data.height,
            weight_kg: data.weight,
            physical_activity: data.physical_activity.as_str().to_string(),
            country: data.country.as_str().to_string(),
            daily_water_intake: daily,
            lost_water: calc_lost_water(data),
            supply_water: calc_supply_water(data),
            daily_water_intake_displayed: displayed_amount(daily, volume_units),
            daily_water_intake_formatted: format_amount(daily, volume_units),
            units: volume_units.contraction().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecalculateResponse {
    pub date: String,
    pub previous_daily_water_intake: f64,
    pub calculation: WaterGoalCalculation,
    pub water_goal_id: i64,
    pub is_hot_day: bool,
    pub is_high_activity: bool,
    /// Goal for the date including hot day and high activity bonuses
    pub goal_amount: f64,
    pub goal_amount_formatted: String,
}

// ============================================================================
// Tool Functions
// ============================================================================

pub fn get_profile(db: &Database) -> Result<ProfileResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let stored = UserProfile::get_stored(&conn)
        .map_err(|e| format!("Failed to get profile: {}", e))?;

    Ok(match stored {
        Some(profile) => ProfileResponse::new(&profile, true),
        None => ProfileResponse::new(&UserProfile::default(), false),
    })
}

/// Update the given profile fields, keeping the rest
pub fn set_profile(db: &Database, fields: ProfileFields) -> Result<ProfileResponse, String> {
    let update = fields.into_update()?;

    let profile = db
        .with_transaction(|tx| UserProfile::set(tx, &update))
        .map_err(|e| format!("Failed to save profile: {}", e))?;

    tracing::debug!(gender = profile.gender.as_str(), age = profile.age, "profile saved");

    Ok(ProfileResponse::new(&profile, true))
}

/// Estimate the daily intake without saving; given fields override the stored profile
pub fn calculate_water_goal(db: &Database, overrides: ProfileFields) -> Result<WaterGoalCalculation, String> {
    let update = overrides.into_update()?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let mut profile = UserProfile::get(&conn)
        .map_err(|e| format!("Failed to get profile: {}", e))?;
    profile.apply(&update);

    let data = profile.water_goal_data();
    validate_goal_data(&data)?;

    Ok(WaterGoalCalculation::new(&data, profile.volume_units))
}

/// Re-estimate from the stored profile and store it as the goal for `date` (default today)
pub fn recalculate_water_goal(db: &Database, date: Option<&str>) -> Result<RecalculateResponse, String> {
    let profile = db
        .with_conn(UserProfile::get)
        .map_err(|e| format!("Failed to get profile: {}", e))?;
    let date = parse_date_arg(date, &profile)?;
    recalculate_water_goal_for(db, date)
}

pub(crate) fn recalculate_water_goal_for(db: &Database, date: NaiveDate) -> Result<RecalculateResponse, String> {
    let result = db.with_transaction(|tx| {
        let mut profile = UserProfile::get(tx)?;
        let data = profile.water_goal_data();
        validate_goal_data(&data).map_err(DbError::InvalidData)?;

        let previous = profile.daily_water_intake;
        let calculation = WaterGoalCalculation::new(&data, profile.volume_units);

        profile.daily_water_intake = calculation.daily_water_intake;
        profile.save(tx)?;

        let (is_hot_day, is_high_activity) = WaterGoal::get_strictly_for_date(tx, date)?
            .map(|g| (g.is_hot_day, g.is_high_activity))
            .unwrap_or((false, false));
        let goal = WaterGoal::upsert(tx, date, calculation.daily_water_intake, is_hot_day, is_high_activity)?;

        Ok((profile, previous, calculation, goal))
    });

    let (profile, previous, calculation, goal) = match result {
        Ok(r) => r,
        Err(DbError::InvalidData(msg)) => return Err(msg),
        Err(e) => return Err(format!("Failed to recalculate water goal: {}", e)),
    };

    tracing::info!(
        date = %date,
        previous,
        daily_water_intake = calculation.daily_water_intake,
        "water goal recalculated"
    );

    let goal_amount = goal.amount(&profile.goal_factors());
    Ok(RecalculateResponse {
        date: dates::format_date(date),
        previous_daily_water_intake: previous,
        water_goal_id: goal.id,
        is_hot_day: goal.is_hot_day,
        is_high_activity: goal.is_high_activity,
        goal_amount,
        goal_amount_formatted: format_amount(goal_amount, profile.volume_units),
        calculation,
    })
}
