//! Drink model
//!
//! Seeded catalogue rows, one per drink type, remembering the last amount
//! logged for each drink.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::hydration::DrinkType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drink {
    pub drink_type: DrinkType,
    pub name: String,
    /// Last logged amount in ml, offered as the default for the next intake
    pub recent_amount: f64,
    pub updated_at: String,
}

impl Drink {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let drink_type_str: String = row.get("drink_type")?;
        let drink_type = DrinkType::from_str(&drink_type_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown drink type '{}'", drink_type_str).into(),
            )
        })?;

        Ok(Self {
            drink_type,
            name: row.get("name")?,
            recent_amount: row.get("recent_amount")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// All drinks in catalogue order
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM drinks ORDER BY drink_index")?;
        let drinks = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(drinks)
    }

    pub fn get_by_type(conn: &Connection, drink_type: DrinkType) -> DbResult<Self> {
        let mut stmt = conn.prepare("SELECT * FROM drinks WHERE drink_type = ?1")?;
        match stmt.query_row([drink_type.as_str()], Self::from_row) {
            Ok(drink) => Ok(drink),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(DbError::InvalidData(format!(
                "drink '{}' missing from catalogue",
                drink_type.as_str()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub fn update_recent_amount(conn: &Connection, drink_type: DrinkType, amount: f64) -> DbResult<()> {
        conn.execute(
            "UPDATE drinks SET recent_amount = ?1, updated_at = datetime('now') WHERE drink_type = ?2",
            params![amount, drink_type.as_str()],
        )?;
        Ok(())
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

    #[test]
    fn test_list_in_catalogue_order() {
        let conn = setup();
        let drinks = Drink::list(&conn).unwrap();
        let types: Vec<DrinkType> = drinks.iter().map(|d| d.drink_type).collect();
        assert_eq!(types, DrinkType::all().to_vec());
        assert_eq!(drinks[10].name, "Hard Liquor");
    }

    #[test]
    fn test_update_recent_amount() {
        let conn = setup();
        Drink::update_recent_amount(&conn, DrinkType::Tea, 330.0).unwrap();
        assert_eq!(Drink::get_by_type(&conn, DrinkType::Tea).unwrap().recent_amount, 330.0);
        assert_eq!(Drink::get_by_type(&conn, DrinkType::Coffee).unwrap().recent_amount, 250.0);
    }
}
