//! Intake model
//!
//! A single logged drink: what, how much, when. Hydration effects are derived
//! from the drink type on read; only the raw amount is stored.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::dates;
use super::Drink;
use crate::db::DbResult;
use crate::hydration::DrinkType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intake {
    pub id: i64,
    pub drink_type: DrinkType,
    /// Millilitres drunk
    pub amount: f64,
    /// Local time: "2025-01-09T14:30:00"
    pub timestamp: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeCreate {
    pub drink_type: DrinkType,
    pub amount: f64,
    /// Defaults to now
    pub timestamp: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeUpdate {
    pub drink_type: Option<DrinkType>,
    pub amount: Option<f64>,
    pub timestamp: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

/// Hydrating and dehydrating volume of a group of intakes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AmountParts {
    pub hydration: f64,
    pub dehydration: f64,
}

impl AmountParts {
    pub fn water_balance(&self) -> f64 {
        self.hydration - self.dehydration
    }

    fn add(&mut self, intake: &Intake) {
        self.hydration += intake.hydration_amount();
        self.dehydration += intake.dehydration_amount();
    }
}

/// Per-drink totals for one day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkTotal {
    pub drink_type: DrinkType,
    pub intake_count: i64,
    pub amount: f64,
    pub hydration: f64,
    pub dehydration: f64,
}

/// Calendar unit for grouped statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingUnit {
    Day,
    Month,
}

/// How a group's total is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    /// Plain sum over the group
    Summary,
    /// Sum divided by the number of days in the calendar unit
    Average,
}

impl Intake {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let drink_type_str: String = row.get("drink_type")?;
        let drink_type = DrinkType::from_str(&drink_type_str).unwrap_or_else(|| {
            tracing::warn!(drink_type = %drink_type_str, "unknown stored drink type, treating as water");
            DrinkType::Water
        });

        Ok(Self {
            id: row.get("id")?,
            drink_type,
            amount: row.get("amount")?,
            timestamp: row.get("timestamp")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn hydration_amount(&self) -> f64 {
        self.amount * self.drink_type.hydration_factor()
    }

    pub fn dehydration_amount(&self) -> f64 {
        self.amount * self.drink_type.dehydration_factor()
    }

    /// Hydration minus dehydration
    pub fn water_balance(&self) -> f64 {
        self.hydration_amount() - self.dehydration_amount()
    }

    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        dates::parse_timestamp(&self.timestamp)
    }

    /// Log an intake and remember its amount as the drink's recent amount
    ///
    /// Two writes; callers wanting both or neither pass a transaction.
    pub fn create(conn: &Connection, data: &IntakeCreate) -> DbResult<Self> {
        let timestamp = dates::format_timestamp(data.timestamp.unwrap_or_else(dates::now));

        conn.execute(
            r#"
            INSERT INTO intakes (drink_type, amount, timestamp, notes)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![data.drink_type.as_str(), data.amount, timestamp, data.notes],
        )?;
        let id = conn.last_insert_rowid();

        Drink::update_recent_amount(conn, data.drink_type, data.amount)?;

        tracing::debug!(id, drink = data.drink_type.as_str(), amount = data.amount, "intake logged");

        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM intakes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(intake) => Ok(Some(intake)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Intakes with `begin <= timestamp < end`, oldest first
    pub fn fetch_range(conn: &Connection, begin: NaiveDateTime, end: NaiveDateTime) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM intakes WHERE timestamp >= ?1 AND timestamp < ?2 ORDER BY timestamp ASC, id ASC",
        )?;
        let intakes = stmt
            .query_map(
                params![dates::format_timestamp(begin), dates::format_timestamp(end)],
                Self::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(intakes)
    }

    /// Intakes of the tracking day starting at `date` + `day_offset_hours`
    pub fn fetch_for_day(conn: &Connection, date: NaiveDate, day_offset_hours: u32) -> DbResult<Vec<Self>> {
        let begin = dates::day_start(date, day_offset_hours);
        Self::fetch_range(conn, begin, begin + Duration::days(1))
    }

    /// Paged listing, newest first, optionally limited to a date range (inclusive days) and drink
    pub fn list(
        conn: &Connection,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        drink_type: Option<DrinkType>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM intakes WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(start) = start_date {
            params_vec.push(Box::new(dates::format_timestamp(dates::day_start(start, 0))));
            sql.push_str(&format!(" AND timestamp >= ?{}", params_vec.len()));
        }

        if let Some(end) = end_date {
            let end_exclusive = dates::day_start(end, 0) + Duration::days(1);
            params_vec.push(Box::new(dates::format_timestamp(end_exclusive)));
            sql.push_str(&format!(" AND timestamp < ?{}", params_vec.len()));
        }

        if let Some(dt) = drink_type {
            params_vec.push(Box::new(dt.as_str()));
            sql.push_str(&format!(" AND drink_type = ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY timestamp DESC, id DESC");

        params_vec.push(Box::new(limit));
        sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));

        params_vec.push(Box::new(offset));
        sql.push_str(&format!(" OFFSET ?{}", params_vec.len()));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let intakes = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(intakes)
    }

    pub fn update(conn: &Connection, id: i64, data: &IntakeUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(dt) = data.drink_type {
            updates.push(format!("drink_type = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(dt.as_str()));
        }
        if let Some(amount) = data.amount {
            updates.push(format!("amount = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(amount));
        }
        if let Some(ts) = data.timestamp {
            updates.push(format!("timestamp = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(dates::format_timestamp(ts)));
        }
        if let Some(ref notes) = data.notes {
            updates.push(format!("notes = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(notes.clone()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE intakes SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM intakes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Per-drink sums for one tracking day, in catalogue order
    pub fn totals_by_drink_for_day(
        conn: &Connection,
        date: NaiveDate,
        day_offset_hours: u32,
    ) -> DbResult<Vec<DrinkTotal>> {
        let begin = dates::day_start(date, day_offset_hours);
        let end = begin + Duration::days(1);

        let mut stmt = conn.prepare(
            r#"
            SELECT drink_type, COUNT(*) AS intake_count, SUM(amount) AS total_amount
            FROM intakes
            WHERE timestamp >= ?1 AND timestamp < ?2
            GROUP BY drink_type
            "#,
        )?;

        let rows = stmt
            .query_map(
                params![dates::format_timestamp(begin), dates::format_timestamp(end)],
                |row| {
                    Ok((
                        row.get::<_, String>("drink_type")?,
                        row.get::<_, i64>("intake_count")?,
                        row.get::<_, f64>("total_amount")?,
                    ))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut totals: Vec<DrinkTotal> = rows
            .into_iter()
            .filter_map(|(drink_type, intake_count, amount)| {
                let drink_type = DrinkType::from_str(&drink_type)?;
                Some(DrinkTotal {
                    drink_type,
                    intake_count,
                    amount,
                    hydration: amount * drink_type.hydration_factor(),
                    dehydration: amount * drink_type.dehydration_factor(),
                })
            })
            .collect();
        totals.sort_by_key(|t| t.drink_type.index());

        Ok(totals)
    }

    /// Hydration/dehydration per day or month between two dates
    ///
    /// Both bounds are snapped to the start of their tracking day. Groups are
    /// laid out consecutively from `begin`; a group is emitted only when it
    /// ends on or before `end`. Day grouping always sums.
    pub fn fetch_amount_parts_grouped_by(
        conn: &Connection,
        grouping_unit: GroupingUnit,
        begin: NaiveDate,
        end: NaiveDate,
        day_offset_hours: u32,
        aggregate_function: AggregateFunction,
    ) -> DbResult<Vec<AmountParts>> {
        let begin_ts = dates::day_start(begin, day_offset_hours);
        let end_ts = dates::day_start(end, day_offset_hours);

        if end_ts < begin_ts {
            return Ok(Vec::new());
        }

        let intakes = Self::fetch_range(conn, begin_ts, end_ts)?;

        let aggregate_function = match grouping_unit {
            GroupingUnit::Day => AggregateFunction::Summary,
            GroupingUnit::Month => aggregate_function,
        };

        let mut grouped = Vec::new();
        let mut remaining = intakes.iter().peekable();
        let mut current = begin;

        loop {
            let next = match grouping_unit {
                GroupingUnit::Day => current + Duration::days(1),
                GroupingUnit::Month => dates::add_months(current, 1),
            };
            let next_ts = dates::day_start(next, day_offset_hours);
            if next_ts > end_ts || next == current {
                break;
            }

            let mut parts = AmountParts::default();
            let next_ts_str = dates::format_timestamp(next_ts);
            while let Some(intake) = remaining.next_if(|i| i.timestamp < next_ts_str) {
                parts.add(intake);
            }

            if aggregate_function == AggregateFunction::Average {
                let days = f64::from(dates::days_in_month(current));
                parts.hydration /= days;
                parts.dehydration /= days;
            }

            grouped.push(parts);
            current = next;
        }

        tracing::debug!(
            groups = grouped.len(),
            intakes = intakes.len(),
            ?grouping_unit,
            "grouped intake amounts"
        );

        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn ts(s: &str) -> NaiveDateTime {
        dates::parse_timestamp(s).unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        dates::parse_date(s).unwrap()
    }

    fn add(conn: &Connection, when: &str, drink_type: DrinkType, amount: f64) -> Intake {
        Intake::create(
            conn,
            &IntakeCreate {
                drink_type,
                amount,
                timestamp: Some(ts(when)),
                notes: None,
            },
        )
        .unwrap()
    }

    fn assert_close(expected: &[f64], actual: &[f64]) {
        assert_eq!(expected.len(), actual.len(), "{:?} vs {:?}", expected, actual);
        for (e, a) in expected.iter().zip(actual) {
            assert!((e - a).abs() < 1e-9, "{:?} vs {:?}", expected, actual);
        }
    }

    #[test]
    fn test_water_balance_uses_drink_factors() {
        let conn = setup();
        let beer = add(&conn, "2015-01-02T20:00:00", DrinkType::Beer, 500.0);
        assert!((beer.hydration_amount() - 475.0).abs() < 1e-9);
        assert!((beer.dehydration_amount() - 250.0).abs() < 1e-9);
        assert!((beer.water_balance() - 225.0).abs() < 1e-9);

        let liquor = add(&conn, "2015-01-02T21:00:00", DrinkType::HardLiquor, 50.0);
        assert!(liquor.water_balance() < 0.0);
    }

    #[test]
    fn test_create_updates_recent_amount() {
        let conn = setup();
        add(&conn, "2015-01-02T08:00:00", DrinkType::Coffee, 180.0);
        assert_eq!(Drink::get_by_type(&conn, DrinkType::Coffee).unwrap().recent_amount, 180.0);
    }

    #[test]
    fn test_fetch_range_is_half_open() {
        let conn = setup();
        let a = add(&conn, "2015-01-02T00:00:00", DrinkType::Water, 100.0);
        let b = add(&conn, "2015-01-02T12:00:00", DrinkType::Water, 200.0);
        add(&conn, "2015-01-03T00:00:00", DrinkType::Water, 300.0);

        let fetched = Intake::fetch_range(&conn, ts("2015-01-02T00:00:00"), ts("2015-01-03T00:00:00")).unwrap();
        let ids: Vec<i64> = fetched.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_fetch_for_day_with_offset() {
        let conn = setup();
        add(&conn, "2015-01-02T03:59:59", DrinkType::Water, 100.0);
        let morning = add(&conn, "2015-01-02T04:00:00", DrinkType::Water, 200.0);
        let late = add(&conn, "2015-01-03T02:00:00", DrinkType::Tea, 300.0);
        add(&conn, "2015-01-03T04:00:00", DrinkType::Water, 400.0);

        let fetched = Intake::fetch_for_day(&conn, day("2015-01-02"), 4).unwrap();
        let ids: Vec<i64> = fetched.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![morning.id, late.id]);

        assert_eq!(Intake::fetch_for_day(&conn, day("2015-01-02"), 0).unwrap().len(), 2);
    }

    #[test]
    fn test_update_and_delete() {
        let conn = setup();
        let intake = add(&conn, "2015-01-02T10:00:00", DrinkType::Water, 250.0);

        let updated = Intake::update(
            &conn,
            intake.id,
            &IntakeUpdate {
                drink_type: Some(DrinkType::Juice),
                amount: Some(300.0),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.drink_type, DrinkType::Juice);
        assert_eq!(updated.amount, 300.0);
        assert_eq!(updated.timestamp, "2015-01-02T10:00:00");

        assert!(Intake::delete(&conn, intake.id).unwrap());
        assert!(!Intake::delete(&conn, intake.id).unwrap());
        assert!(Intake::get_by_id(&conn, intake.id).unwrap().is_none());
    }

    #[test]
    fn test_list_filters_and_orders() {
        let conn = setup();
        add(&conn, "2015-01-01T10:00:00", DrinkType::Water, 100.0);
        let b = add(&conn, "2015-01-02T10:00:00", DrinkType::Water, 200.0);
        let c = add(&conn, "2015-01-02T23:59:59", DrinkType::Water, 300.0);
        add(&conn, "2015-01-02T11:00:00", DrinkType::Milk, 300.0);
        add(&conn, "2015-01-03T00:00:00", DrinkType::Water, 400.0);

        let listed = Intake::list(
            &conn,
            Some(day("2015-01-02")),
            Some(day("2015-01-02")),
            Some(DrinkType::Water),
            50,
            0,
        )
        .unwrap();
        let ids: Vec<i64> = listed.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![c.id, b.id]);

        assert_eq!(Intake::list(&conn, None, None, None, 2, 0).unwrap().len(), 2);
        assert_eq!(Intake::list(&conn, None, None, None, 50, 4).unwrap().len(), 1);
    }

    #[test]
    fn test_totals_by_drink_for_day() {
        let conn = setup();
        add(&conn, "2015-01-02T08:00:00", DrinkType::Water, 250.0);
        add(&conn, "2015-01-02T12:00:00", DrinkType::Water, 500.0);
        add(&conn, "2015-01-02T18:00:00", DrinkType::Wine, 200.0);
        add(&conn, "2015-01-03T08:00:00", DrinkType::Coffee, 200.0);

        let totals = Intake::totals_by_drink_for_day(&conn, day("2015-01-02"), 0).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].drink_type, DrinkType::Water);
        assert_eq!(totals[0].intake_count, 2);
        assert_eq!(totals[0].amount, 750.0);
        assert_eq!(totals[1].drink_type, DrinkType::Wine);
        assert!((totals[1].hydration - 170.0).abs() < 1e-9);
        assert!((totals[1].dehydration - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_water_balances_grouped_by_days() {
        let conn = setup();
        let mut expected = Vec::new();

        // out of range
        add(&conn, "2014-01-01T10:00:00", DrinkType::Water, 1000.0);
        add(&conn, "2015-01-01T20:59:59", DrinkType::Juice, 2000.0);
        add(&conn, "2015-01-01T23:59:59", DrinkType::Coffee, 500.0);

        let mut group = |items: &[(&str, DrinkType, f64)]| {
            let balance: f64 = items
                .iter()
                .map(|(when, drink, amount)| add(&conn, when, *drink, *amount).water_balance())
                .sum();
            expected.push(balance);
        };

        group(&[
            ("2015-01-02T00:00:00", DrinkType::Beer, 1000.0),
            ("2015-01-02T16:59:59", DrinkType::Milk, 1000.0),
            ("2015-01-02T23:59:59", DrinkType::Tea, 200.0),
        ]);
        group(&[]);
        group(&[
            ("2015-01-04T00:00:00", DrinkType::Soda, 1000.0),
            ("2015-01-04T12:00:00", DrinkType::Water, 1000.0),
            ("2015-01-04T23:59:58", DrinkType::Milk, 200.0),
        ]);
        group(&[
            ("2015-01-05T01:00:01", DrinkType::Beer, 1000.0),
            ("2015-01-05T15:15:14", DrinkType::Wine, 1000.0),
            ("2015-01-05T20:00:10", DrinkType::HardLiquor, 2000.0),
        ]);

        // out of range
        add(&conn, "2015-01-06T00:00:00", DrinkType::Water, 1000.0);
        add(&conn, "2016-01-05T00:00:00", DrinkType::Juice, 2000.0);

        let parts = Intake::fetch_amount_parts_grouped_by(
            &conn,
            GroupingUnit::Day,
            day("2015-01-02"),
            day("2015-01-06"),
            0,
            AggregateFunction::Average,
        )
        .unwrap();
        let balances: Vec<f64> = parts.iter().map(AmountParts::water_balance).collect();
        assert_close(&expected, &balances);
    }

    #[test]
    fn test_water_balances_grouped_by_months() {
        let conn = setup();
        let mut sums = Vec::new();
        let mut averages = Vec::new();

        add(&conn, "2015-01-01", DrinkType::Water, 1000.0);
        add(&conn, "2015-01-05", DrinkType::Coffee, 500.0);

        let mut group = |days_in_month: f64, items: &[(&str, DrinkType, f64)]| {
            let balance: f64 = items
                .iter()
                .map(|(when, drink, amount)| add(&conn, when, *drink, *amount).water_balance())
                .sum();
            sums.push(balance);
            averages.push(balance / days_in_month);
        };

        group(28.0, &[
            ("2015-02-01", DrinkType::Water, 1000.0),
            ("2015-02-01", DrinkType::Water, 1000.0),
            ("2015-02-03", DrinkType::Juice, 2000.0),
            ("2015-02-28", DrinkType::Tea, 200.0),
        ]);
        group(31.0, &[]);
        group(30.0, &[
            ("2015-04-01", DrinkType::Water, 1000.0),
            ("2015-04-15", DrinkType::Sport, 500.0),
            ("2015-04-30", DrinkType::Milk, 200.0),
        ]);
        group(31.0, &[
            ("2015-05-10", DrinkType::Beer, 1000.0),
            ("2015-05-01", DrinkType::Wine, 1000.0),
            ("2015-05-03", DrinkType::HardLiquor, 2000.0),
            ("2015-05-30", DrinkType::Soda, 200.0),
        ]);

        add(&conn, "2015-06-01", DrinkType::Water, 1000.0);
        add(&conn, "2013-08-05", DrinkType::Coffee, 500.0);

        let fetch = |aggregate| {
            Intake::fetch_amount_parts_grouped_by(
                &conn,
                GroupingUnit::Month,
                day("2015-02-01"),
                day("2015-06-01"),
                0,
                aggregate,
            )
            .unwrap()
            .iter()
            .map(AmountParts::water_balance)
            .collect::<Vec<f64>>()
        };

        assert_close(&sums, &fetch(AggregateFunction::Summary));
        assert_close(&averages, &fetch(AggregateFunction::Average));
    }

    #[test]
    fn test_grouping_with_reversed_range_is_empty() {
        let conn = setup();
        add(&conn, "2015-01-02T10:00:00", DrinkType::Water, 100.0);
        let parts = Intake::fetch_amount_parts_grouped_by(
            &conn,
            GroupingUnit::Day,
            day("2015-01-05"),
            day("2015-01-02"),
            0,
            AggregateFunction::Summary,
        )
        .unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_grouping_drops_incomplete_trailing_group() {
        let conn = setup();
        add(&conn, "2015-03-10", DrinkType::Water, 100.0);
        let parts = Intake::fetch_amount_parts_grouped_by(
            &conn,
            GroupingUnit::Month,
            day("2015-02-01"),
            day("2015-03-15"),
            0,
            AggregateFunction::Summary,
        )
        .unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].hydration, 0.0);
    }
}
