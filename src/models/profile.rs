//! User profile model
//!
//! Single-row table holding the physiological inputs for the water goal
//! estimator plus per-user settings (display units, goal bonuses, day offset).

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::GoalFactors;
use crate::db::{DbError, DbResult};
use crate::hydration::{Country, Gender, PhysicalActivity, Unit, UnitType, WaterGoalData};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub gender: Gender,
    pub age: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub physical_activity: PhysicalActivity,
    pub country: Country,
    /// Last calculated or user-set goal, ml
    pub daily_water_intake: f64,
    pub hot_day_extra_factor: f64,
    pub high_activity_extra_factor: f64,
    /// Hour at which a tracking day begins
    pub day_offset_hours: u32,
    pub volume_units: Unit,
    pub weight_units: Unit,
    pub length_units: Unit,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            gender: Gender::Man,
            age: 30,
            height_cm: 170.0,
            weight_kg: 70.0,
            physical_activity: PhysicalActivity::Occasional,
            country: Country::Average,
            daily_water_intake: 2000.0,
            hot_day_extra_factor: 0.5,
            high_activity_extra_factor: 0.5,
            day_offset_hours: 0,
            volume_units: Unit::Milliliters,
            weight_units: Unit::Kilograms,
            length_units: Unit::Centimeters,
        }
    }
}

/// Partial profile change; `None` keeps the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub gender: Option<Gender>,
    pub age: Option<i32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub physical_activity: Option<PhysicalActivity>,
    pub country: Option<Country>,
    pub daily_water_intake: Option<f64>,
    pub hot_day_extra_factor: Option<f64>,
    pub high_activity_extra_factor: Option<f64>,
    pub day_offset_hours: Option<u32>,
    pub volume_units: Option<Unit>,
    pub weight_units: Option<Unit>,
    pub length_units: Option<Unit>,
}

fn conversion_error(column: usize, what: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        format!("unknown {} '{}'", what, value).into(),
    )
}

fn unit_column(row: &Row, column: &str, unit_type: UnitType) -> rusqlite::Result<Unit> {
    let value: String = row.get(column)?;
    Ok(Unit::from_str_of_type(&value, unit_type).unwrap_or_else(|| {
        tracing::warn!(column, value = %value, "unknown stored unit, using metric");
        Unit::metric(unit_type)
    }))
}

impl UserProfile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let gender: String = row.get("gender")?;
        let activity: String = row.get("physical_activity")?;
        let country: String = row.get("country")?;

        Ok(Self {
            gender: Gender::from_str(&gender)
                .ok_or_else(|| conversion_error(0, "gender", &gender))?,
            age: row.get("age")?,
            height_cm: row.get("height_cm")?,
            weight_kg: row.get("weight_kg")?,
            physical_activity: PhysicalActivity::from_str(&activity)
                .ok_or_else(|| conversion_error(0, "physical activity", &activity))?,
            country: Country::from_str(&country).unwrap_or_else(|| {
                tracing::warn!(country = %country, "unknown stored country, using average");
                Country::Average
            }),
            daily_water_intake: row.get("daily_water_intake")?,
            hot_day_extra_factor: row.get("hot_day_extra_factor")?,
            high_activity_extra_factor: row.get("high_activity_extra_factor")?,
            day_offset_hours: row.get("day_offset_hours")?,
            volume_units: unit_column(row, "volume_units", UnitType::Volume)?,
            weight_units: unit_column(row, "weight_units", UnitType::Weight)?,
            length_units: unit_column(row, "length_units", UnitType::Length)?,
        })
    }

    /// Stored profile, if one was ever saved
    pub fn get_stored(conn: &Connection) -> DbResult<Option<Self>> {
        let profile = conn
            .query_row("SELECT * FROM user_profile WHERE id = 1", [], Self::from_row)
            .optional()?;
        Ok(profile)
    }

    /// Stored profile or the defaults
    pub fn get(conn: &Connection) -> DbResult<Self> {
        Ok(Self::get_stored(conn)?.unwrap_or_default())
    }

    /// Write the whole profile (upsert)
    pub fn save(&self, conn: &Connection) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO user_profile (
                id, gender, age, height_cm, weight_kg, physical_activity, country,
                daily_water_intake, hot_day_extra_factor, high_activity_extra_factor,
                day_offset_hours, volume_units, weight_units, length_units
            )
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(id) DO UPDATE SET
                gender = excluded.gender,
                age = excluded.age,
                height_cm = excluded.height_cm,
                weight_kg = excluded.weight_kg,
                physical_activity = excluded.physical_activity,
                country = excluded.country,
                daily_water_intake = excluded.daily_water_intake,
                hot_day_extra_factor = excluded.hot_day_extra_factor,
                high_activity_extra_factor = excluded.high_activity_extra_factor,
                day_offset_hours = excluded.day_offset_hours,
                volume_units = excluded.volume_units,
                weight_units = excluded.weight_units,
                length_units = excluded.length_units,
                updated_at = datetime('now')
            "#,
            params![
                self.gender.as_str(),
                self.age,
                self.height_cm,
                self.weight_kg,
                self.physical_activity.as_str(),
                self.country.as_str(),
                self.daily_water_intake,
                self.hot_day_extra_factor,
                self.high_activity_extra_factor,
                self.day_offset_hours,
                self.volume_units.contraction(),
                self.weight_units.contraction(),
                self.length_units.contraction(),
            ],
        )?;
        Ok(())
    }

    /// Apply a partial update to the stored (or default) profile
    ///
    /// Reads then rewrites the row; run it inside a transaction when other
    /// writers may touch the profile.
    pub fn set(conn: &Connection, update: &ProfileUpdate) -> DbResult<Self> {
        let mut profile = Self::get(conn)?;
        profile.apply(update);
        profile.save(conn)?;

        Self::get_stored(conn)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(v) = update.gender {
            self.gender = v;
        }
        if let Some(v) = update.age {
            self.age = v;
        }
        if let Some(v) = update.height_cm {
            self.height_cm = v;
        }
        if let Some(v) = update.weight_kg {
            self.weight_kg = v;
        }
        if let Some(v) = update.physical_activity {
            self.physical_activity = v;
        }
        if let Some(v) = update.country {
            self.country = v;
        }
        if let Some(v) = update.daily_water_intake {
            self.daily_water_intake = v;
        }
        if let Some(v) = update.hot_day_extra_factor {
            self.hot_day_extra_factor = v;
        }
        if let Some(v) = update.high_activity_extra_factor {
            self.high_activity_extra_factor = v;
        }
        if let Some(v) = update.day_offset_hours {
            self.day_offset_hours = v;
        }
        if let Some(v) = update.volume_units {
            self.volume_units = v;
        }
        if let Some(v) = update.weight_units {
            self.weight_units = v;
        }
        if let Some(v) = update.length_units {
            self.length_units = v;
        }
    }

    pub fn water_goal_data(&self) -> WaterGoalData {
        WaterGoalData {
            physical_activity: self.physical_activity,
            gender: self.gender,
            age: self.age,
            height: self.height_cm,
            weight: self.weight_kg,
            country: self.country,
        }
    }

    pub fn goal_factors(&self) -> GoalFactors {
        GoalFactors {
            hot_day: self.hot_day_extra_factor,
            high_activity: self.high_activity_extra_factor,
        }
    }
}
