//! Database module
//!
//! Handles SQLite connection, migrations, and database location.

pub mod connection;
pub mod migrations;

use std::path::PathBuf;

pub use connection::{Database, DbError, DbResult};

/// Environment variable overriding the database file location
pub const DATABASE_PATH_ENV: &str = "LARDER_DATABASE_PATH";

/// Database path from `LARDER_DATABASE_PATH`, or `<project>/data/larder.db`
/// next to the executable (skipping `target/debug` or `target/release`)
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(project_root) = path.parent().and_then(|target| target.parent()) {
                    path = project_root.to_path_buf();
                }
            }

            path.push("data");
            path.push("larder.db");
            path
        })
}

/// Open the database at [`database_path`], creating its directory and
/// applying migrations
pub fn open_default() -> Result<(PathBuf, Database), Box<dyn std::error::Error>> {
    let path = database_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&path)?;
    database.with_conn(migrations::run_migrations)?;
    Ok((path, database))
}
