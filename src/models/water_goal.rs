//! Water goal model
//!
//! At most one goal per calendar day. Days without their own goal inherit the
//! base amount of the nearest earlier goal (or, failing that, the nearest
//! later one) without the hot-day/high-activity bonuses.

use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::dates;
use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterGoal {
    pub id: i64,
    /// Calendar day: "2025-01-09"
    pub date: String,
    /// Millilitres before bonuses
    pub base_amount: f64,
    pub is_hot_day: bool,
    pub is_high_activity: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Relative bonuses applied on hot or highly active days
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalFactors {
    pub hot_day: f64,
    pub high_activity: f64,
}

impl Default for GoalFactors {
    fn default() -> Self {
        Self {
            hot_day: 0.5,
            high_activity: 0.5,
        }
    }
}

impl WaterGoal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            base_amount: row.get("base_amount")?,
            is_hot_day: row.get::<_, i32>("is_hot_day")? != 0,
            is_high_activity: row.get::<_, i32>("is_high_activity")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Goal including bonuses
    pub fn amount(&self, factors: &GoalFactors) -> f64 {
        let hot = if self.is_hot_day { factors.hot_day } else { 0.0 };
        let active = if self.is_high_activity { factors.high_activity } else { 0.0 };
        self.base_amount * (1.0 + hot + active)
    }

    /// Set the goal for a day, replacing any existing one
    pub fn upsert(
        conn: &Connection,
        date: NaiveDate,
        base_amount: f64,
        is_hot_day: bool,
        is_high_activity: bool,
    ) -> DbResult<Self> {
        let date_str = dates::format_date(date);
        conn.execute(
            r#"
            INSERT INTO water_goals (date, base_amount, is_hot_day, is_high_activity)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(date) DO UPDATE SET
                base_amount = excluded.base_amount,
                is_hot_day = excluded.is_hot_day,
                is_high_activity = excluded.is_high_activity,
                updated_at = datetime('now')
            "#,
            params![date_str, base_amount, is_hot_day as i32, is_high_activity as i32],
        )?;

        Self::get_strictly_for_date(conn, date)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_strictly_for_date(conn: &Connection, date: NaiveDate) -> DbResult<Option<Self>> {
        let goal = conn
            .query_row(
                "SELECT * FROM water_goals WHERE date = ?1",
                [dates::format_date(date)],
                Self::from_row,
            )
            .optional()?;
        Ok(goal)
    }

    /// Goal in effect for a day: its own, else the nearest earlier, else the nearest later
    pub fn get_for_date(conn: &Connection, date: NaiveDate) -> DbResult<Option<Self>> {
        if let Some(goal) = Self::get_strictly_for_date(conn, date)? {
            return Ok(Some(goal));
        }
        if let Some(goal) = Self::nearest_earlier_than(conn, date)? {
            return Ok(Some(goal));
        }
        if let Some(goal) = Self::nearest_not_earlier_than(conn, date)? {
            return Ok(Some(goal));
        }

        tracing::warn!(date = %date, "no water goal stored");
        Ok(None)
    }

    fn nearest_earlier_than(conn: &Connection, date: NaiveDate) -> DbResult<Option<Self>> {
        let goal = conn
            .query_row(
                "SELECT * FROM water_goals WHERE date < ?1 ORDER BY date DESC LIMIT 1",
                [dates::format_date(date)],
                Self::from_row,
            )
            .optional()?;
        Ok(goal)
    }

    fn nearest_not_earlier_than(conn: &Connection, date: NaiveDate) -> DbResult<Option<Self>> {
        let goal = conn
            .query_row(
                "SELECT * FROM water_goals WHERE date >= ?1 ORDER BY date ASC LIMIT 1",
                [dates::format_date(date)],
                Self::from_row,
            )
            .optional()?;
        Ok(goal)
    }

    /// Goals with `begin <= date < end`, oldest first
    pub fn list(conn: &Connection, begin: NaiveDate, end: NaiveDate) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM water_goals WHERE date >= ?1 AND date < ?2 ORDER BY date ASC",
        )?;
        let goals = stmt
            .query_map(
                params![dates::format_date(begin), dates::format_date(end)],
                Self::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    pub fn delete(conn: &Connection, date: NaiveDate) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM water_goals WHERE date = ?1",
            [dates::format_date(date)],
        )?;
        Ok(rows > 0)
    }

    /// One goal amount per day in `[begin, end)`
    pub fn amounts_for_range(
        conn: &Connection,
        begin: NaiveDate,
        end: NaiveDate,
        factors: &GoalFactors,
        fallback: f64,
    ) -> DbResult<Vec<f64>> {
        let mut amounts = Vec::new();
        Self::for_each_day_amount(conn, begin, end, factors, fallback, |_, amount| {
            amounts.push(amount)
        })?;
        Ok(amounts)
    }

    /// Daily goal amounts in `[begin, end)` averaged per calendar month
    ///
    /// Each month is averaged over the days actually visited, so partial
    /// months at either end of the range are not diluted.
    pub fn amounts_grouped_by_months(
        conn: &Connection,
        begin: NaiveDate,
        end: NaiveDate,
        factors: &GoalFactors,
        fallback: f64,
    ) -> DbResult<Vec<f64>> {
        let mut averages = Vec::new();
        let mut current_month: Option<(i32, u32)> = None;
        let mut total = 0.0;
        let mut days = 0u32;

        Self::for_each_day_amount(conn, begin, end, factors, fallback, |day, amount| {
            let month = (day.year(), day.month());
            if current_month.is_some_and(|m| m != month) && days > 0 {
                averages.push(total / f64::from(days));
                total = 0.0;
                days = 0;
            }
            current_month = Some(month);
            total += amount;
            days += 1;
        })?;

        if days > 0 {
            averages.push(total / f64::from(days));
        }

        Ok(averages)
    }

    fn for_each_day_amount<F>(
        conn: &Connection,
        begin: NaiveDate,
        end: NaiveDate,
        factors: &GoalFactors,
        fallback: f64,
        mut visit: F,
    ) -> DbResult<()>
    where
        F: FnMut(NaiveDate, f64),
    {
        if end <= begin {
            return Ok(());
        }

        let goals = Self::list(conn, begin, end)?;
        let mut earlier = Self::nearest_earlier_than(conn, begin)?;
        let later_outside = Self::nearest_not_earlier_than(conn, end)?;

        let mut pending = goals.iter().peekable();
        let mut day = begin;
        while day < end {
            let day_str = dates::format_date(day);

            let amount = match pending.next_if(|g| g.date == day_str) {
                Some(own) => {
                    earlier = Some(own.clone());
                    own.amount(factors)
                }
                None => {
                    let inherited = earlier
                        .as_ref()
                        .or_else(|| pending.peek().copied())
                        .or(later_outside.as_ref());
                    match inherited {
                        Some(goal) => goal.base_amount,
                        None => fallback,
                    }
                }
            };

            visit(day, amount);
            day += Duration::days(1);
        }

        tracing::debug!(begin = %begin, end = %end, goals = goals.len(), "resolved daily water goals");
        Ok(())
    }
}
