//! Grocery checklist model
//!
//! Checked-off state for grocery items. Rows are keyed by the same
//! lowercased name the aggregator groups on, so the state survives the list
//! being rebuilt from a different set of planned recipes.

use std::collections::HashSet;

use rusqlite::{params, Connection};

use crate::db::DbResult;
use crate::grocery::grouping_key;

pub struct GroceryCheck;

impl GroceryCheck {
    /// Keys of every item currently checked
    pub fn checked_keys(conn: &Connection) -> DbResult<HashSet<String>> {
        let mut stmt = conn.prepare("SELECT item_key FROM grocery_checks WHERE checked = 1")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(keys)
    }

    /// Check or uncheck one item by name (any case/whitespace)
    pub fn set(conn: &Connection, name: &str, checked: bool) -> DbResult<String> {
        let key = grouping_key(name);
        conn.execute(
            r#"
            INSERT INTO grocery_checks (item_key, checked) VALUES (?1, ?2)
            ON CONFLICT(item_key) DO UPDATE SET checked = excluded.checked, updated_at = datetime('now')
            "#,
            params![key, checked as i32],
        )?;
        Ok(key)
    }

    /// Check every name in one transaction; returns how many were written
    pub fn check_all<S: AsRef<str>>(conn: &mut Connection, names: &[S]) -> DbResult<usize> {
        let tx = conn.transaction()?;
        for name in names {
            Self::set(&tx, name.as_ref(), true)?;
        }
        tx.commit()?;
        Ok(names.len())
    }

    /// Forget all checklist state
    pub fn clear(conn: &Connection) -> DbResult<usize> {
        Ok(conn.execute("DELETE FROM grocery_checks", [])?)
    }
}
