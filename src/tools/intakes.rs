//! Intake MCP Tools
//!
//! Tools for logging drinks and browsing the drink catalogue.

use serde::Serialize;

use super::{format_amount, parse_date_str, parse_timestamp_arg, volume_to_metric};
use crate::db::Database;
use crate::hydration::DrinkType;
use crate::models::{dates, Drink, Intake, IntakeCreate, IntakeUpdate, UserProfile};

/// Drink catalogue entry
#[derive(Debug, Serialize)]
pub struct DrinkSummary {
    pub drink_type: String,
    pub name: String,
    pub index: i64,
    pub hydration_factor: f64,
    pub dehydration_factor: f64,
    pub is_alcoholic: bool,
    pub recent_amount: f64,
    pub recent_amount_formatted: String,
}

/// Response for list_drinks
#[derive(Debug, Serialize)]
pub struct ListDrinksResponse {
    pub drinks: Vec<DrinkSummary>,
}

/// Full intake detail
#[derive(Debug, Serialize)]
pub struct IntakeDetail {
    pub id: i64,
    pub drink_type: String,
    pub drink_name: String,
    /// Millilitres
    pub amount: f64,
    pub amount_formatted: String,
    pub hydration: f64,
    pub dehydration: f64,
    pub water_balance: f64,
    pub timestamp: String,
    /// Day the intake counts towards, honouring the day offset
    pub tracking_day: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl IntakeDetail {
    pub(crate) fn new(intake: &Intake, profile: &UserProfile) -> Self {
        Self {
            id: intake.id,
            drink_type: intake.drink_type.as_str().to_string(),
            drink_name: intake.drink_type.display_name().to_string(),
            amount: intake.amount,
            amount_formatted: format_amount(intake.amount, profile.volume_units),
            hydration: intake.hydration_amount(),
            dehydration: intake.dehydration_amount(),
            water_balance: intake.water_balance(),
            timestamp: intake.timestamp.clone(),
            tracking_day: intake
                .parsed_timestamp()
                .map(|ts| dates::format_date(dates::tracking_day(ts, profile.day_offset_hours))),
            notes: intake.notes.clone(),
            created_at: intake.created_at.clone(),
            updated_at: intake.updated_at.clone(),
        }
    }
}

/// Response for list_intakes
#[derive(Debug, Serialize)]
pub struct ListIntakesResponse {
    pub intakes: Vec<IntakeDetail>,
    pub total: usize,
    pub total_amount: f64,
    pub total_water_balance: f64,
}

/// Response for delete_intake
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn parse_drink_type(drink_type: &str) -> Result<DrinkType, String> {
    DrinkType::from_str(drink_type).ok_or_else(|| {
        let valid: Vec<&str> = DrinkType::all().iter().map(|d| d.as_str()).collect();
        format!("Invalid drink type: '{}'. Valid types: {}", drink_type, valid.join(", "))
    })
}

fn validate_amount(amount: f64) -> Result<(), String> {
    if amount <= 0.0 || !amount.is_finite() {
        return Err("Amount must be greater than 0".to_string());
    }
    Ok(())
}

// ============================================================================
// Drink Tool Functions
// ============================================================================

pub fn list_drinks(db: &Database) -> Result<ListDrinksResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;
    let drinks = Drink::list(&conn).map_err(|e| format!("Failed to list drinks: {}", e))?;

    Ok(ListDrinksResponse {
        drinks: drinks
            .iter()
            .map(|d| DrinkSummary {
                drink_type: d.drink_type.as_str().to_string(),
                name: d.name.clone(),
                index: d.drink_type.index(),
                hydration_factor: d.drink_type.hydration_factor(),
                dehydration_factor: d.drink_type.dehydration_factor(),
                is_alcoholic: d.drink_type.is_alcoholic(),
                recent_amount: d.recent_amount,
                recent_amount_formatted: format_amount(d.recent_amount, profile.volume_units),
            })
            .collect(),
    })
}

// ============================================================================
// Intake Tool Functions
// ============================================================================

/// Log a drink; `amount` is in the profile's volume units and defaults to the drink's recent amount
pub fn log_intake(
    db: &Database,
    drink_type: &str,
    amount: Option<f64>,
    timestamp: Option<&str>,
    notes: Option<&str>,
) -> Result<IntakeDetail, String> {
    let drink_type = parse_drink_type(drink_type)?;
    let timestamp = parse_timestamp_arg(timestamp)?;
    if let Some(a) = amount {
        validate_amount(a)?;
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;

    let amount_ml = match amount {
        Some(a) => volume_to_metric(a, profile.volume_units)?,
        None => {
            Drink::get_by_type(&conn, drink_type)
                .map_err(|e| format!("Failed to get drink: {}", e))?
                .recent_amount
        }
    };

    let data = IntakeCreate {
        drink_type,
        amount: amount_ml,
        timestamp,
        notes: notes.map(String::from),
    };

    let intake = db
        .with_transaction(|tx| Intake::create(tx, &data))
        .map_err(|e| format!("Failed to log intake: {}", e))?;

    Ok(IntakeDetail::new(&intake, &profile))
}

pub fn get_intake(db: &Database, id: i64) -> Result<Option<IntakeDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let intake = Intake::get_by_id(&conn, id).map_err(|e| format!("Failed to get intake: {}", e))?;
    let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;

    Ok(intake.map(|i| IntakeDetail::new(&i, &profile)))
}

pub fn update_intake(
    db: &Database,
    id: i64,
    drink_type: Option<&str>,
    amount: Option<f64>,
    timestamp: Option<&str>,
    notes: Option<&str>,
) -> Result<Option<IntakeDetail>, String> {
    let drink_type = drink_type.map(parse_drink_type).transpose()?;
    let timestamp = parse_timestamp_arg(timestamp)?;
    if let Some(a) = amount {
        validate_amount(a)?;
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;

    let data = IntakeUpdate {
        drink_type,
        amount: amount
            .map(|a| volume_to_metric(a, profile.volume_units))
            .transpose()?,
        timestamp,
        notes: notes.map(String::from),
    };

    let updated = Intake::update(&conn, id, &data).map_err(|e| format!("Failed to update intake: {}", e))?;

    Ok(updated.map(|i| IntakeDetail::new(&i, &profile)))
}

pub fn delete_intake(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Intake::delete(&conn, id).map_err(|e| format!("Failed to delete intake: {}", e))?;
    if !deleted {
        return Err(format!("Intake not found with id: {}", id));
    }

    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

/// List intakes, newest first; the date range is inclusive
pub fn list_intakes(
    db: &Database,
    start_date: Option<&str>,
    end_date: Option<&str>,
    drink_type: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<ListIntakesResponse, String> {
    let start = start_date.map(parse_date_str).transpose()?;
    let end = end_date.map(parse_date_str).transpose()?;
    let drink_type = drink_type.map(parse_drink_type).transpose()?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;

    let intakes = Intake::list(&conn, start, end, drink_type, limit, offset)
        .map_err(|e| format!("Failed to list intakes: {}", e))?;

    let details: Vec<IntakeDetail> = intakes.iter().map(|i| IntakeDetail::new(i, &profile)).collect();
    let total = details.len();

    Ok(ListIntakesResponse {
        total_amount: intakes.iter().map(|i| i.amount).sum(),
        total_water_balance: intakes.iter().map(Intake::water_balance).sum(),
        intakes: details,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::profile::{set_profile, ProfileFields};
    use crate::tools::test_database;

    #[test]
    fn test_log_intake_with_recent_amount() {
        let db = test_database("intakes-recent");

        let first = log_intake(&db, "coffee", None, Some("2015-01-02T08:00:00"), None).unwrap();
        assert_eq!(first.amount, 250.0);
        assert_eq!(first.drink_name, "Coffee");
        assert!((first.hydration - 245.0).abs() < 1e-9);

        log_intake(&db, "coffee", Some(180.0), Some("2015-01-02T10:00:00"), Some("flat white")).unwrap();
        let third = log_intake(&db, "coffee", None, Some("2015-01-02T14:00:00"), None).unwrap();
        assert_eq!(third.amount, 180.0);

        let drinks = list_drinks(&db).unwrap();
        let coffee = drinks.drinks.iter().find(|d| d.drink_type == "coffee").unwrap();
        assert_eq!(coffee.recent_amount, 180.0);
        assert_eq!(coffee.recent_amount_formatted, "180 ml");
        assert!(!coffee.is_alcoholic);
        let alcoholic: Vec<_> = drinks.drinks.iter().filter(|d| d.is_alcoholic).map(|d| d.drink_type.as_str()).collect();
        assert_eq!(alcoholic.len(), 3);
        assert!(alcoholic.contains(&"wine"));

        let rounded = log_intake(&db, "juice", Some(249.6), Some("2015-01-02T15:00:00"), None).unwrap();
        assert_eq!(rounded.amount, 250.0);
    }

    #[test]
    fn test_log_intake_is_atomic() {
        let db = test_database("intakes-atomic");
        db.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_recent BEFORE UPDATE ON drinks
                 BEGIN SELECT RAISE(ABORT, 'recent amount locked'); END;",
            )?;
            Ok(())
        })
        .unwrap();

        let err = log_intake(&db, "water", Some(300.0), Some("2015-01-02T08:00:00"), None).unwrap_err();
        assert!(err.contains("recent amount locked"));
        assert_eq!(list_intakes(&db, None, None, None, 50, 0).unwrap().total, 0);
    }

    #[test]
    fn test_log_intake_validation() {
        let db = test_database("intakes-validation");
        assert!(log_intake(&db, "water", Some(0.0), None, None).unwrap_err().contains("Amount"));
        assert!(log_intake(&db, "lemonade", Some(100.0), None, None).unwrap_err().contains("Invalid drink type"));
        assert!(log_intake(&db, "water", Some(100.0), Some("noon"), None).unwrap_err().contains("timestamp"));
    }

    #[test]
    fn test_log_intake_in_fluid_ounces() {
        let db = test_database("intakes-floz");
        set_profile(&db, ProfileFields { volume_units: Some("fl oz".into()), ..Default::default() }).unwrap();

        let intake = log_intake(&db, "water", Some(8.0), Some("2015-01-02T08:00:00"), None).unwrap();
        assert!((intake.amount - 236.588).abs() < 0.001);
        assert_eq!(intake.amount_formatted, "8.0 fl oz");
    }

    #[test]
    fn test_tracking_day_uses_offset() {
        let db = test_database("intakes-offset");
        set_profile(&db, ProfileFields { day_offset_hours: Some(4), ..Default::default() }).unwrap();

        let late = log_intake(&db, "beer", Some(500.0), Some("2015-01-03T01:30:00"), None).unwrap();
        assert_eq!(late.tracking_day.as_deref(), Some("2015-01-02"));
        assert!((late.water_balance - 225.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_get_delete() {
        let db = test_database("intakes-crud");
        let intake = log_intake(&db, "water", Some(300.0), Some("2015-01-02T08:00:00"), None).unwrap();

        let updated = update_intake(&db, intake.id, Some("tea"), None, None, Some("green")).unwrap().unwrap();
        assert_eq!(updated.drink_type, "tea");
        assert_eq!(updated.amount, 300.0);
        assert_eq!(updated.notes.as_deref(), Some("green"));

        assert!(update_intake(&db, 9999, None, Some(100.0), None, None).unwrap().is_none());

        assert!(delete_intake(&db, intake.id).unwrap().success);
        assert!(get_intake(&db, intake.id).unwrap().is_none());
        assert!(delete_intake(&db, intake.id).is_err());
    }

    #[test]
    fn test_list_intakes_totals() {
        let db = test_database("intakes-list");
        log_intake(&db, "water", Some(500.0), Some("2015-01-02T08:00:00"), None).unwrap();
        log_intake(&db, "wine", Some(200.0), Some("2015-01-02T20:00:00"), None).unwrap();
        log_intake(&db, "water", Some(500.0), Some("2015-01-03T08:00:00"), None).unwrap();

        let listed = list_intakes(&db, Some("2015-01-02"), Some("2015-01-02"), None, 50, 0).unwrap();
        assert_eq!(listed.total, 2);
        assert_eq!(listed.intakes[0].drink_type, "wine");
        assert_eq!(listed.total_amount, 700.0);
        assert!((listed.total_water_balance - 370.0).abs() < 1e-9);

        let water = list_intakes(&db, None, None, Some("water"), 50, 0).unwrap();
        assert_eq!(water.total, 2);
    }
}
