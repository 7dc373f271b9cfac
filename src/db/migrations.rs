//! Database migrations
//!
//! Schema creation, migration logic and drink catalogue seeding.

use rusqlite::{params, Connection};

use super::connection::DbResult;
use crate::hydration::DrinkType;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Recent amount every drink starts with, in millilitres
const INITIAL_RECENT_AMOUNT_ML: f64 = 250.0;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        seed_drinks(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- DRINKS
        -- One row per drink type, seeded on creation
        -- ============================================
        CREATE TABLE drinks (
            drink_index INTEGER PRIMARY KEY,     -- stable drink type index 0..10
            drink_type TEXT NOT NULL UNIQUE,     -- "water", "coffee", ...
            name TEXT NOT NULL,
            recent_amount REAL NOT NULL,         -- ml, last logged amount
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- INTAKES
        -- Logged drink events
        -- ============================================
        CREATE TABLE intakes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            drink_type TEXT NOT NULL REFERENCES drinks(drink_type) ON DELETE RESTRICT,
            amount REAL NOT NULL CHECK(amount > 0),   -- ml
            timestamp TEXT NOT NULL,                  -- local time: "2025-01-09T14:30:00"

            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_intakes_timestamp ON intakes(timestamp);
        CREATE INDEX idx_intakes_drink ON intakes(drink_type);

        -- ============================================
        -- WATER GOALS
        -- Daily targets; days without a row inherit the nearest goal
        -- ============================================
        CREATE TABLE water_goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL UNIQUE,           -- ISO date: "2025-01-09"
            base_amount REAL NOT NULL,           -- ml
            is_hot_day INTEGER NOT NULL DEFAULT 0,
            is_high_activity INTEGER NOT NULL DEFAULT 0,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- USER PROFILE
        -- Single row (id = 1): body metrics and tracking preferences
        -- ============================================
        CREATE TABLE user_profile (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            gender TEXT NOT NULL CHECK(gender IN ('man', 'woman', 'pregnant_female', 'breastfeeding_female')),
            age INTEGER NOT NULL,
            height_cm REAL NOT NULL,
            weight_kg REAL NOT NULL,
            physical_activity TEXT NOT NULL CHECK(physical_activity IN ('rare', 'occasional', 'weekly', 'daily')),
            country TEXT NOT NULL,
            daily_water_intake REAL NOT NULL,    -- ml, last calculated or user-set
            hot_day_extra_factor REAL NOT NULL,
            high_activity_extra_factor REAL NOT NULL,
            day_offset_hours INTEGER NOT NULL DEFAULT 0,
            volume_units TEXT NOT NULL DEFAULT 'ml',
            weight_units TEXT NOT NULL DEFAULT 'kg',
            length_units TEXT NOT NULL DEFAULT 'cm',

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Insert one row per drink type
fn seed_drinks(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO drinks (drink_index, drink_type, name, recent_amount) VALUES (?1, ?2, ?3, ?4)",
    )?;

    for drink_type in DrinkType::all() {
        stmt.execute(params![
            drink_type.index(),
            drink_type.as_str(),
            drink_type.display_name(),
            INITIAL_RECENT_AMOUNT_ML,
        ])?;
    }

    tracing::debug!(count = DrinkType::all().len(), "seeded drink catalogue");
    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
