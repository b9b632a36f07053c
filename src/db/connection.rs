//! Database connection management
//!
//! One pooled SQLite file holds recipes, the meal plan, and grocery checks.
//! Tool calls may run concurrently, so every connection shares the same
//! pragmas and waits on a locked database instead of failing at once.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;

/// Connections kept open by the pool
pub const POOL_SIZE: u32 = 8;

/// How long a writer waits on another connection's lock
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Failure reaching or querying the Larder database
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A JSON list column (ingredients, instructions, tags) failed to encode
    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

type SqlitePool = Pool<SqliteConnectionManager>;

/// Cheaply cloneable handle shared by the MCP service and the CLIs
#[derive(Clone)]
pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    /// Open `path` (a file path or a `file:` URI), creating the file if
    /// missing. Schema migrations are not applied here.
    pub fn new<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .with_init(|conn| {
                conn.busy_timeout(BUSY_TIMEOUT)?;
                // Meal plan rows cascade off recipes
                conn.execute_batch(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;",
                )
            });

        let pool = Pool::builder().max_size(POOL_SIZE).build(manager)?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn get_conn(&self) -> DbResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T>,
    {
        f(&*self.get_conn()?)
    }

    /// Like [`Database::with_conn`], for work that opens a transaction
    pub fn with_conn_mut<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> DbResult<T>,
    {
        f(&mut *self.get_conn()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_memory(name: &str) -> Database {
        Database::new(format!("file:larder_conn_{}?mode=memory&cache=shared", name)).unwrap()
    }

    #[test]
    fn test_connections_enforce_foreign_keys() {
        let db = shared_memory("foreign_keys");
        let enabled: i64 = db
            .with_conn(|conn| Ok(conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_pooled_connections_share_one_database() {
        let db = shared_memory("shared");
        db.with_conn(|conn| Ok(conn.execute_batch("CREATE TABLE t (x INTEGER)")?))
            .unwrap();

        let held = db.get_conn().unwrap();
        held.execute("INSERT INTO t (x) VALUES (1)", []).unwrap();

        let count: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(count, 1);
    }
}
