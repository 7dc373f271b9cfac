//! Database module
//!
//! SQLite connection pool, schema migrations and drink catalogue seeding.

pub mod connection;
pub mod migrations;

use std::path::PathBuf;

pub use connection::{Database, DbError, DbResult};

/// Environment variable overriding the database location
pub const DATABASE_PATH_ENV: &str = "WATERLOG_DATABASE_PATH";

/// Get the database path from environment or use `<project>/data/waterlog.db`
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("waterlog.db");
            path
        })
}

/// Create the parent directory, open the pool and bring the schema up to date
pub fn open(path: &std::path::Path) -> Result<Database, Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(path)?;
    database.with_conn(migrations::run_migrations)?;

    Ok(database)
}
